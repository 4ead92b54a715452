//! Two-step registration.
//!
//! Step one collects the identity fields, step two the profile fields. Each
//! step is checked against its slice of the user schema before moving on;
//! only step two talks to the server.

use core::fmt;

use serde::Serialize;
use thiserror::Error;

use shopfront_core::ValidationErrors;
use shopfront_core::models::{AuthResponse, Registration};
use shopfront_core::validation::{USER_IDENTITY_FIELDS, USER_PROFILE_FIELDS, USER_SCHEMA};

use crate::api::AuthApi;
use crate::error::ClientError;
use crate::navigation::{HOME, Navigator};
use crate::notify::Notify;
use crate::services::AuthService;

/// Shown once the account exists.
pub const REGISTERED: &str = "You have been registered";

/// Step one form.
#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id_number: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id_number", &self.id_number)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Step two form. The city is the raw selection, checked by the schema.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub street: String,
}

/// Where the wizard is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    StepOne,
    StepTwo,
    Submitted,
}

/// Errors from a wizard step.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The step was submitted out of order.
    #[error("step submitted out of order (wizard is at {0:?})")]
    WrongStep(Step),

    /// The step's fields failed the schema.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// The server rejected the registration.
    #[error("{0}")]
    Registration(#[source] ClientError),
}

/// State of one registration attempt.
#[derive(Debug, Default)]
pub struct RegistrationWizard {
    step: Step,
    identity: Option<Identity>,
}

impl RegistrationWizard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Check the identity fields and advance to step two.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Validation` with every failing field, or
    /// `WizardError::WrongStep` if the wizard is not at step one.
    pub fn submit_step_one(&mut self, identity: Identity) -> Result<(), WizardError> {
        if self.step != Step::StepOne {
            return Err(WizardError::WrongStep(self.step));
        }

        validate(&identity, &USER_IDENTITY_FIELDS)?;
        self.identity = Some(identity);
        self.step = Step::StepTwo;
        Ok(())
    }

    /// Return to step one, keeping what was entered.
    pub fn back(&mut self) {
        if self.step == Step::StepTwo {
            self.step = Step::StepOne;
        }
    }

    /// The identity entered in step one, for refilling the form.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Check the profile fields and register.
    ///
    /// On success the user is told and sent home. On bad fields or a failed
    /// registration the user is told why and the wizard stays at step two.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Validation` for bad profile fields,
    /// `WizardError::Registration` if the server call fails, or
    /// `WizardError::WrongStep` if the wizard is not at step two.
    pub async fn submit_step_two<A: AuthApi + ?Sized>(
        &mut self,
        profile: Profile,
        auth: &AuthService<A>,
        notify: &dyn Notify,
        navigator: &dyn Navigator,
    ) -> Result<AuthResponse, WizardError> {
        let (Step::StepTwo, Some(identity)) = (self.step, &self.identity) else {
            return Err(WizardError::WrongStep(self.step));
        };

        if let Err(errors) = validate(&profile, &USER_PROFILE_FIELDS) {
            notify.error(&errors.to_string());
            return Err(WizardError::Validation(errors));
        }

        let registration = Registration {
            id_number: identity.id_number.clone(),
            username: identity.username.clone(),
            password: identity.password.clone(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            city: profile.city.trim().parse().ok(),
            street: profile.street,
        };

        match auth.register(&registration).await {
            Ok(response) => {
                notify.success(REGISTERED);
                navigator.navigate(HOME);
                self.step = Step::Submitted;
                Ok(response)
            }
            Err(e) => {
                notify.error(&e.to_string());
                Err(WizardError::Registration(e))
            }
        }
    }
}

fn validate(form: &impl Serialize, fields: &[&str]) -> Result<(), ValidationErrors> {
    let payload = serde_json::to_value(form)
        .map_err(|e| ValidationErrors::single(USER_SCHEMA.name(), e.to_string()))?;
    USER_SCHEMA.only(fields).validate(&payload)
}
