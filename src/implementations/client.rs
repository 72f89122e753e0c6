use std::sync::Arc;

use log::{ debug, info };

use crate::config::ClientConfig;
use crate::errors::{ FieldErrors, RegistryError, RegistryResult };
use crate::implementations::http_backend::HttpBackend;
use crate::implementations::listing::PropertyList;
use crate::implementations::registration_flow::RegistrationFlow;
use crate::implementations::route_guard::RouteGuard;
use crate::implementations::search::{ PropertySearch, UserLookup };
use crate::implementations::session_store::SessionStore;
use crate::implementations::storage::FileStore;
use crate::implementations::transfer_flow::TransferFlow;
use crate::implementations::verification_flow::VerificationFlow;
use crate::implementations::wizard::Wizard;
use crate::models::dashboard::Dashboard;
use crate::models::property::Property;
use crate::models::transfer::TransferRecord;
use crate::models::user::{ AccountForm, Credentials, PasswordChange, ProfileUpdate, User };
use crate::models::verification::VerificationRecord;
use crate::traits::backend::BackendApi;
use crate::validation;

/// Entry point of the library: one session, one backend, and factories for
/// the views built on them
#[derive(Clone)]
pub struct RegistryClient {
    config: ClientConfig,
    session: SessionStore,
    backend: Arc<dyn BackendApi>,
    guard: RouteGuard,
}

impl RegistryClient {
    /// HTTP backend with the session persisted at the configured path
    pub fn from_config(config: ClientConfig) -> RegistryResult<Self> {
        let session_path = config.session_path()?;
        debug!("Session file: {}", session_path.display());
        let session = SessionStore::open(Arc::new(FileStore::new(session_path)));
        let backend = HttpBackend::new(config.clone(), session.clone())?;
        Ok(Self::with_backend(config, session, Arc::new(backend)))
    }

    pub fn with_backend(config: ClientConfig, session: SessionStore, backend: Arc<dyn BackendApi>) -> Self {
        let guard = RouteGuard::new(session.clone());
        Self { config, session, backend, guard }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn backend(&self) -> Arc<dyn BackendApi> {
        Arc::clone(&self.backend)
    }

    pub async fn login(&self, credentials: &Credentials) -> RegistryResult<User> {
        self.session.login(self.backend.as_ref(), credentials).await
    }

    pub async fn register(&self, form: &AccountForm) -> RegistryResult<User> {
        self.session.register(self.backend.as_ref(), form).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Fetch the profile and refresh the stored user with it
    pub async fn profile(&self) -> RegistryResult<User> {
        let user = self.backend.profile().await?;
        self.session.replace_user(user.clone())?;
        Ok(user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> RegistryResult<User> {
        let update = update.validate().map_err(RegistryError::Validation)?;
        let user = self.backend.update_profile(&update).await?;
        self.session.replace_user(user.clone())?;
        info!("Profile updated for {}", user.email);
        Ok(user)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> RegistryResult<String> {
        change.validate().map_err(RegistryError::Validation)?;
        let response = self.backend.change_password(change).await?;
        info!("Password changed");
        Ok(response.message)
    }

    pub async fn forgot_password(&self, email: &str) -> RegistryResult<String> {
        let mut errors = FieldErrors::new();
        let email = validation::email(&mut errors, "email", email);
        let email = match email {
            Some(email) if errors.is_empty() => email,
            _ => {
                return Err(RegistryError::Validation(errors));
            }
        };
        let response = self.backend.forgot_password(&email).await?;
        Ok(response.message)
    }

    /// Stats, trends and recent activity, requested concurrently
    pub async fn dashboard(&self) -> RegistryResult<Dashboard> {
        let (stats, trends, activities) = tokio::try_join!(
            self.backend.dashboard_stats(),
            self.backend.dashboard_trends(),
            self.backend.dashboard_activities()
        )?;
        Ok(Dashboard { stats, trends, activities })
    }

    pub async fn properties(&self) -> RegistryResult<PropertyList> {
        PropertyList::load(self.backend.as_ref()).await
    }

    pub async fn property(&self, id: &str) -> RegistryResult<Property> {
        self.backend.get_property(id).await
    }

    pub fn property_search(&self) -> PropertySearch {
        PropertySearch::new(self.backend(), self.config.property_search_debounce())
    }

    pub fn user_lookup(&self, exclude: Vec<String>) -> UserLookup {
        UserLookup::new(self.backend(), exclude, self.config.user_search_debounce())
    }

    pub fn registration_wizard(&self) -> Wizard<RegistrationFlow> {
        Wizard::new(RegistrationFlow::new(self.backend()))
    }

    /// Load the property and start a transfer wizard for it
    pub async fn transfer_wizard(&self, property_id: &str) -> RegistryResult<Wizard<TransferFlow>> {
        let property = self.backend.get_property(property_id).await?;
        Ok(Wizard::new(TransferFlow::new(self.backend(), property)))
    }

    pub fn verification_wizard(&self, property_id: &str) -> Wizard<VerificationFlow> {
        Wizard::new(VerificationFlow::new(self.backend(), property_id))
    }

    pub async fn verification_details(&self, property_id: &str) -> RegistryResult<VerificationRecord> {
        self.backend.verification_details(property_id).await
    }

    pub async fn transfers(&self) -> RegistryResult<Vec<TransferRecord>> {
        self.backend.list_transfers().await
    }

    pub async fn transfer(&self, transfer_id: &str) -> RegistryResult<TransferRecord> {
        self.backend.get_transfer(transfer_id).await
    }
}
