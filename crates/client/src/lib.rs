//! Shopfront Client - typed access to the Shopfront API.
//!
//! Views read from [`Store`]s and call services; services call the API and
//! dispatch what comes back. Nothing else writes to a store.
//!
//! # Modules
//!
//! - [`store`] - Single-writer state containers with ordered listeners
//! - [`state`] - Products, categories and auth stores with their actions
//! - [`api`] - API traits and the `reqwest` implementation
//! - [`services`] - Catalog and account services over the stores
//! - [`wizard`] - Two-step registration
//! - [`guard`] - Admin route guard
//! - [`notify`], [`navigation`] - Sinks for user messages and route changes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod notify;
pub mod services;
pub mod state;
pub mod store;
pub mod wizard;

use std::sync::Arc;

use tracing::instrument;

use shopfront_core::models::{AuthResponse, Credentials};

pub use api::{AuthApi, CatalogApi, HttpApi, ImageUpload, ProductDraft};
pub use config::ClientConfig;
pub use error::ClientError;
pub use guard::{AdminGuard, GuardOutcome, admin_guard};
pub use navigation::{HOME, History, Navigator};
pub use notify::{Notify, TracingNotify};
pub use services::{AuthService, ProductsService};
pub use store::{Reducer, Store, Subscription};
pub use wizard::{Identity, Profile, RegistrationWizard, Step, WizardError};

use state::{AuthState, CategoriesState, ProductsState};

/// Everything a front end needs, wired together.
pub struct ShopClient<A: ?Sized = HttpApi> {
    api: Arc<A>,
    auth_store: Arc<Store<AuthState>>,
    products_store: Arc<Store<ProductsState>>,
    categories_store: Arc<Store<CategoriesState>>,
    auth: AuthService<A>,
    catalog: ProductsService<A>,
    notify: Arc<dyn Notify>,
    navigator: Arc<dyn Navigator>,
}

impl ShopClient<HttpApi> {
    /// A client for the API at `config.api_url`, logging notifications and
    /// keeping navigation in memory.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_sinks(
            config,
            Arc::new(TracingNotify),
            Arc::new(History::new()),
        )
    }

    /// A client for the API at `config.api_url` with the given sinks.
    #[must_use]
    pub fn with_sinks(
        config: &ClientConfig,
        notify: Arc<dyn Notify>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let auth_store = Arc::new(Store::new());
        let api = Arc::new(HttpApi::new(config, Arc::clone(&auth_store)));
        Self::from_parts(api, auth_store, notify, navigator)
    }
}

impl<A: CatalogApi + AuthApi + ?Sized> ShopClient<A> {
    /// Wire a client around an existing API and auth store.
    #[must_use]
    pub fn from_parts(
        api: Arc<A>,
        auth_store: Arc<Store<AuthState>>,
        notify: Arc<dyn Notify>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let products_store = Arc::new(Store::new());
        let categories_store = Arc::new(Store::new());
        Self {
            auth: AuthService::new(Arc::clone(&api), Arc::clone(&auth_store)),
            catalog: ProductsService::new(
                Arc::clone(&api),
                Arc::clone(&products_store),
                Arc::clone(&categories_store),
            ),
            api,
            auth_store,
            products_store,
            categories_store,
            notify,
            navigator,
        }
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthService<A> {
        &self.auth
    }

    #[must_use]
    pub const fn catalog(&self) -> &ProductsService<A> {
        &self.catalog
    }

    #[must_use]
    pub const fn auth_store(&self) -> &Arc<Store<AuthState>> {
        &self.auth_store
    }

    #[must_use]
    pub const fn products_store(&self) -> &Arc<Store<ProductsState>> {
        &self.products_store
    }

    #[must_use]
    pub const fn categories_store(&self) -> &Arc<Store<CategoriesState>> {
        &self.categories_store
    }

    /// A guard for admin views.
    #[must_use]
    pub fn admin_guard(&self) -> AdminGuard {
        AdminGuard::new(
            Arc::clone(&self.auth_store),
            Arc::clone(&self.notify),
            Arc::clone(&self.navigator),
        )
    }

    /// Log in, go home and load the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the login is rejected. The user is notified
    /// either way.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError> {
        match self.auth.login(credentials).await {
            Ok(response) => {
                self.navigator.navigate(HOME);
                self.open_home().await;
                Ok(response)
            }
            Err(e) => {
                self.notify.error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Finish a registration started with [`RegistrationWizard`], then load
    /// the catalog for the new user.
    ///
    /// # Errors
    ///
    /// Returns `WizardError` as [`RegistrationWizard::submit_step_two`] does.
    pub async fn finish_registration(
        &self,
        wizard: &mut RegistrationWizard,
        profile: Profile,
    ) -> Result<AuthResponse, WizardError> {
        let response = wizard
            .submit_step_two(profile, &self.auth, &*self.notify, &*self.navigator)
            .await?;
        self.open_home().await;
        Ok(response)
    }

    /// Prefetch products then categories for a logged-in user. Failures are
    /// reported through the notification sink.
    pub async fn open_home(&self) {
        if !self.auth_store.state().is_logged_in() {
            return;
        }
        if let Err(e) = self.catalog.get_all_products().await {
            self.notify.error(&e.to_string());
        }
        if let Err(e) = self.catalog.get_all_categories().await {
            self.notify.error(&e.to_string());
        }
    }

    /// Log out and drop the cached catalog.
    ///
    /// # Errors
    ///
    /// Returns the server call's error. Local state is cleared regardless.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.auth.logout().await;
        self.catalog.invalidate();
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use shopfront_core::models::{Category, Product, Registration, User};
    use shopfront_core::{City, ProductId, Role, UserId};

    use super::*;
    use crate::notify::tests::{Note, Recorder};

    /// API fake that records call order.
    #[derive(Default)]
    struct FakeShop {
        calls: Mutex<Vec<&'static str>>,
        product_lists: AtomicUsize,
        reject_login: bool,
    }

    impl FakeShop {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn response(username: &str) -> AuthResponse {
            AuthResponse {
                token: "t".to_string(),
                user: User {
                    id: UserId::generate(),
                    id_number: "123456789".to_string(),
                    username: username.to_string(),
                    first_name: "Dana".to_string(),
                    last_name: "Levi".to_string(),
                    city: City::Haifa,
                    street: "Herzl 5".to_string(),
                    role: Role::User,
                },
            }
        }
    }

    #[async_trait]
    impl CatalogApi for FakeShop {
        async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
            self.record("products");
            self.product_lists.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn count_products(&self) -> Result<u64, ClientError> {
            Ok(0)
        }

        async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
            self.record("categories");
            Ok(Vec::new())
        }

        async fn create_product(&self, _draft: &ProductDraft) -> Result<Product, ClientError> {
            unreachable!("not used")
        }

        async fn update_product(
            &self,
            _id: ProductId,
            _draft: &ProductDraft,
        ) -> Result<Product, ClientError> {
            unreachable!("not used")
        }
    }

    #[async_trait]
    impl AuthApi for FakeShop {
        async fn register(&self, registration: &Registration) -> Result<AuthResponse, ClientError> {
            self.record("register");
            Ok(Self::response(&registration.username))
        }

        async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError> {
            self.record("login");
            if self.reject_login {
                return Err(ClientError::Status {
                    status: 401,
                    message: "Incorrect username or password".to_string(),
                });
            }
            Ok(Self::response(&credentials.username))
        }

        async fn logout(&self) -> Result<(), ClientError> {
            self.record("logout");
            Ok(())
        }
    }

    fn client(api: FakeShop) -> (Arc<FakeShop>, Arc<Recorder>, Arc<History>, ShopClient<FakeShop>) {
        let api = Arc::new(api);
        let notify = Arc::new(Recorder::default());
        let history = Arc::new(History::new());
        let client = ShopClient::from_parts(
            Arc::clone(&api),
            Arc::new(Store::new()),
            Arc::clone(&notify) as Arc<dyn Notify>,
            Arc::clone(&history) as Arc<dyn Navigator>,
        );
        (api, notify, history, client)
    }

    fn credentials() -> Credentials {
        Credentials {
            username: "dana".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_prefetches_products_then_categories() {
        let (api, _, history, client) = client(FakeShop::default());
        client.login(&credentials()).await.unwrap();

        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["login", "products", "categories"]
        );
        assert_eq!(history.current().as_deref(), Some(HOME));
        assert!(client.products_store().state().loaded);
        assert!(client.categories_store().state().loaded);
    }

    #[tokio::test]
    async fn test_rejected_login_notifies() {
        let (api, notify, history, client) = client(FakeShop {
            reject_login: true,
            ..FakeShop::default()
        });
        client.login(&credentials()).await.unwrap_err();

        assert_eq!(*api.calls.lock().unwrap(), vec!["login"]);
        assert_eq!(
            notify.notes(),
            vec![Note::Error(
                "Incorrect username or password (status 401)".to_string()
            )]
        );
        assert_eq!(history.current(), None);
    }

    #[tokio::test]
    async fn test_logout_drops_catalog() {
        let (api, _, _, client) = client(FakeShop::default());
        client.login(&credentials()).await.unwrap();
        client.logout().await.unwrap();

        assert!(!client.products_store().state().loaded);
        assert!(!client.auth_store().state().is_logged_in());

        client.login(&credentials()).await.unwrap();
        assert_eq!(api.product_lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_open_home_skipped_when_logged_out() {
        let (api, _, _, client) = client(FakeShop::default());
        client.open_home().await;
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_registration_loads_catalog() {
        let (api, _, history, client) = client(FakeShop::default());
        let mut wizard = RegistrationWizard::new();
        wizard
            .submit_step_one(Identity {
                id_number: "123456789".to_string(),
                username: "dana".to_string(),
                password: "secret".to_string(),
            })
            .unwrap();

        client
            .finish_registration(
                &mut wizard,
                Profile {
                    first_name: "Dana".to_string(),
                    last_name: "Levi".to_string(),
                    city: "Haifa".to_string(),
                    street: "Herzl 5".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(wizard.step(), Step::Submitted);
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["register", "products", "categories"]
        );
        assert_eq!(history.current().as_deref(), Some(HOME));
    }

    #[tokio::test]
    async fn test_guard_from_client() {
        let (_, notify, history, client) = client(FakeShop::default());
        client.login(&credentials()).await.unwrap();

        assert!(!client.admin_guard().can_activate());
        assert_eq!(
            notify.notes(),
            vec![Note::Error(guard::NOT_ADMIN.to_string())]
        );
        assert_eq!(history.routes(), vec![HOME, HOME]);
    }
}
