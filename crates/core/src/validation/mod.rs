//! Data-driven document validation.
//!
//! A [`Schema`] is an ordered table of field name to a list of independent
//! [`Constraint`]s, each carrying its own human-readable message. Payloads are
//! checked as raw JSON before they are deserialized into typed documents, so
//! a missing or malformed field produces a field-level message rather than a
//! serde error.
//!
//! Numbers are accepted either as JSON numbers or numeric strings, and text
//! fields accept JSON numbers (read as their decimal digits). This matches
//! how the document store casts form-encoded and multipart input.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use shopfront_core::validation::{FieldRule, Schema};
//!
//! let schema = Schema::new("greeting").field(
//!     FieldRule::text("name")
//!         .required("Missing name")
//!         .min_length(2, "Name too short"),
//! );
//!
//! assert!(schema.validate(&json!({ "name": "Ada" })).is_ok());
//! let err = schema.validate(&json!({ "name": "A" })).unwrap_err();
//! assert_eq!(err.message_for("name"), Some("Name too short"));
//! ```

mod schemas;

pub use schemas::{
    CART_ITEM_SCHEMA, ORDER_SCHEMA, PRODUCT_SCHEMA, USER_IDENTITY_FIELDS, USER_PROFILE_FIELDS,
    USER_SCHEMA,
};

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single field violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as it appears in the payload.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// One or more field violations, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, thiserror::Error)]
#[error("{}", join_messages(.errors))]
pub struct ValidationErrors {
    /// The violations.
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// A single violation.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// Whether there are no violations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message for `field`, if that field failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_owned(),
            message: message.to_owned(),
        });
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "validation failed".to_string();
    }
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// How a field's raw JSON value is read before constraints apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A string; `trim` strips surrounding whitespace first.
    Text {
        /// Trim before checking.
        trim: bool,
    },
    /// A decimal number.
    Number,
    /// An ISO date (`2026-03-01`) or RFC 3339 timestamp.
    Date,
    /// A document reference (UUID string).
    Reference,
}

/// A field value after reading it according to its [`FieldKind`].
#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(String),
    Number(Decimal),
    Date,
    Reference,
}

/// A predicate on a field, with the message reported when it fails.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Field must be present and non-empty.
    Required(&'static str),
    /// Text must have at least this many characters.
    MinLength(usize, &'static str),
    /// Text must have at most this many characters.
    MaxLength(usize, &'static str),
    /// Number must be at least this value.
    Min(Decimal, &'static str),
    /// Number must be at most this value.
    Max(Decimal, &'static str),
    /// Text must be one of the listed values.
    OneOf(Vec<&'static str>, &'static str),
    /// Text must match the pattern.
    Pattern(Regex, &'static str),
}

impl Constraint {
    const fn message(&self) -> &'static str {
        match self {
            Self::Required(m)
            | Self::MinLength(_, m)
            | Self::MaxLength(_, m)
            | Self::Min(_, m)
            | Self::Max(_, m)
            | Self::OneOf(_, m)
            | Self::Pattern(_, m) => m,
        }
    }

    /// Whether `value` satisfies this constraint. Constraints that do not
    /// apply to the value's kind are satisfied trivially.
    fn check(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Self::MinLength(min, _), FieldValue::Text(s)) => s.chars().count() >= *min,
            (Self::MaxLength(max, _), FieldValue::Text(s)) => s.chars().count() <= *max,
            (Self::Min(min, _), FieldValue::Number(n)) => n >= min,
            (Self::Max(max, _), FieldValue::Number(n)) => n <= max,
            (Self::OneOf(values, _), FieldValue::Text(s)) => values.contains(&s.as_str()),
            (Self::Pattern(re, _), FieldValue::Text(s)) => re.is_match(s),
            _ => true,
        }
    }
}

/// A field and its constraints.
#[derive(Debug, Clone)]
pub struct FieldRule {
    name: &'static str,
    kind: FieldKind,
    constraints: Vec<Constraint>,
    invalid_message: Option<&'static str>,
}

impl FieldRule {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            constraints: Vec::new(),
            invalid_message: None,
        }
    }

    /// A text field, used as supplied.
    #[must_use]
    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text { trim: false })
    }

    /// A text field, trimmed before checking.
    #[must_use]
    pub fn trimmed(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text { trim: true })
    }

    /// A numeric field.
    #[must_use]
    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    /// A date field.
    #[must_use]
    pub fn date(name: &'static str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    /// A reference to another document.
    #[must_use]
    pub fn reference(name: &'static str) -> Self {
        Self::new(name, FieldKind::Reference)
    }

    /// Field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Field kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Reject when missing.
    #[must_use]
    pub fn required(mut self, message: &'static str) -> Self {
        self.constraints.push(Constraint::Required(message));
        self
    }

    /// Minimum character count.
    #[must_use]
    pub fn min_length(mut self, min: usize, message: &'static str) -> Self {
        self.constraints.push(Constraint::MinLength(min, message));
        self
    }

    /// Maximum character count.
    #[must_use]
    pub fn max_length(mut self, max: usize, message: &'static str) -> Self {
        self.constraints.push(Constraint::MaxLength(max, message));
        self
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn min(mut self, min: i64, message: &'static str) -> Self {
        self.constraints.push(Constraint::Min(Decimal::from(min), message));
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn max(mut self, max: i64, message: &'static str) -> Self {
        self.constraints.push(Constraint::Max(Decimal::from(max), message));
        self
    }

    /// Enum membership.
    #[must_use]
    pub fn one_of(mut self, values: Vec<&'static str>, message: &'static str) -> Self {
        self.constraints.push(Constraint::OneOf(values, message));
        self
    }

    /// Full-string pattern match.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression. Schema tables
    /// are static, so this surfaces on first use.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn pattern(mut self, pattern: &str, message: &'static str) -> Self {
        let regex = Regex::new(pattern).expect("schema pattern must be a valid regex");
        self.constraints.push(Constraint::Pattern(regex, message));
        self
    }

    /// Message used when the value cannot be read as this field's kind.
    #[must_use]
    pub const fn invalid(mut self, message: &'static str) -> Self {
        self.invalid_message = Some(message);
        self
    }

    fn is_required(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::Required(_)))
    }

    fn required_message(&self) -> Option<&'static str> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Required(m) => Some(*m),
            _ => None,
        })
    }

    /// Check this field in `payload`, returning the first failing message.
    fn check(&self, payload: &Value) -> Option<String> {
        let raw = payload.get(self.name).filter(|v| !v.is_null());

        let Some(raw) = raw else {
            return self.required_message().map(str::to_owned);
        };

        let value = match self.read(raw) {
            Ok(Some(value)) => value,
            // Present but empty: only an error when required
            Ok(None) => return self.required_message().map(str::to_owned),
            Err(()) => {
                return Some(
                    self.invalid_message
                        .map_or_else(|| format!("{} is not valid", self.name), str::to_owned),
                );
            }
        };

        self.constraints
            .iter()
            .find(|c| !c.check(&value))
            .map(|c| c.message().to_owned())
    }

    /// Read a raw JSON value. `Ok(None)` means "present but empty".
    fn read(&self, raw: &Value) -> Result<Option<FieldValue>, ()> {
        match self.kind {
            FieldKind::Text { trim } => {
                let text = match raw {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return Err(()),
                };
                let text = if trim { text.trim().to_owned() } else { text };
                if text.is_empty() {
                    return Ok(None);
                }
                Ok(Some(FieldValue::Text(text)))
            }
            FieldKind::Number => {
                let number = match raw {
                    Value::Number(n) => Decimal::from_str(&n.to_string())
                        .or_else(|_| Decimal::from_scientific(&n.to_string()))
                        .map_err(|_| ())?,
                    Value::String(s) if s.trim().is_empty() => return Ok(None),
                    Value::String(s) => Decimal::from_str(s.trim()).map_err(|_| ())?,
                    _ => return Err(()),
                };
                Ok(Some(FieldValue::Number(number)))
            }
            FieldKind::Date => {
                let Value::String(s) = raw else {
                    return Err(());
                };
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                parse_date(s).map(|_| Some(FieldValue::Date)).ok_or(())
            }
            FieldKind::Reference => {
                let Value::String(s) = raw else {
                    return Err(());
                };
                if s.trim().is_empty() {
                    return Ok(None);
                }
                uuid::Uuid::parse_str(s.trim())
                    .map(|_| Some(FieldValue::Reference))
                    .map_err(|_| ())
            }
        }
    }
}

/// Parse an ISO date or an RFC 3339 timestamp (date part kept).
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// An ordered table of field rules.
#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldRule>,
}

impl Schema {
    /// An empty schema.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Append a field rule.
    #[must_use]
    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    /// Schema name (the collection it guards).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Field rules, in order.
    #[must_use]
    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    /// Names of the fields that must be present.
    #[must_use]
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.is_required())
            .map(FieldRule::name)
            .collect()
    }

    /// A schema restricted to the named fields, keeping this schema's order.
    #[must_use]
    pub fn only(&self, names: &[&str]) -> Self {
        Self {
            name: self.name,
            fields: self
                .fields
                .iter()
                .filter(|f| names.contains(&f.name))
                .cloned()
                .collect(),
        }
    }

    /// Check every field and report every violation.
    ///
    /// Within one field, checking stops at the first failing constraint.
    ///
    /// # Errors
    ///
    /// Returns all field violations if any field fails.
    pub fn validate(&self, payload: &Value) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for rule in &self.fields {
            if let Some(message) = rule.check(payload) {
                errors.push(rule.name, &message);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Check fields in order and stop at the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate_first(&self, payload: &Value) -> Result<(), ValidationErrors> {
        for rule in &self.fields {
            if let Some(message) = rule.check(payload) {
                return Err(ValidationErrors::single(rule.name, message));
            }
        }
        Ok(())
    }

    /// Rewrite schema fields into the shape typed documents deserialize from:
    /// trimmed text, numbers in text fields as strings, whole numbers as JSON
    /// integers, dates as `YYYY-MM-DD`. Fields that cannot be read are left
    /// untouched.
    #[must_use]
    pub fn normalize(&self, payload: &Value) -> Value {
        let mut out = payload.clone();
        let Some(object) = out.as_object_mut() else {
            return out;
        };
        for rule in &self.fields {
            let Some(raw) = object.get_mut(rule.name) else {
                continue;
            };
            match (rule.kind, &*raw) {
                (FieldKind::Text { trim }, Value::String(s)) if trim => {
                    *raw = Value::String(s.trim().to_owned());
                }
                (FieldKind::Text { .. }, Value::Number(n)) => {
                    *raw = Value::String(n.to_string());
                }
                (FieldKind::Number, Value::String(s)) => {
                    if let Ok(number) = Decimal::from_str(s.trim()) {
                        *raw = decimal_value(number);
                    }
                }
                (FieldKind::Date, Value::String(s)) => {
                    if let Some(date) = parse_date(s.trim()) {
                        *raw = Value::String(date.format("%Y-%m-%d").to_string());
                    }
                }
                (FieldKind::Reference, Value::String(s)) => {
                    *raw = Value::String(s.trim().to_owned());
                }
                _ => {}
            }
        }
        out
    }

    /// Validate, normalize, then deserialize into a typed document.
    ///
    /// # Errors
    ///
    /// Returns the schema violations, or a single violation naming the
    /// schema if the normalized payload still does not fit `T`.
    pub fn parse<T: DeserializeOwned>(&self, payload: &Value) -> Result<T, ValidationErrors> {
        self.validate(payload)?;
        serde_json::from_value(self.normalize(payload))
            .map_err(|e| ValidationErrors::single(self.name, e.to_string()))
    }
}

fn decimal_value(number: Decimal) -> Value {
    if number.fract().is_zero()
        && let Ok(whole) = i64::try_from(number)
    {
        return Value::from(whole);
    }
    Value::String(number.normalize().to_string())
}
