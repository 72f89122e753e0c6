use async_trait::async_trait;

use crate::errors::RegistryResult;
use crate::models::dashboard::DashboardStats;
use crate::models::property::{ Property, PropertyPage, SearchQuery };
use crate::models::registration::NewProperty;
use crate::models::transfer::{ PaymentUpdate, TransferDocument, TransferInitiation, TransferRecord };
use crate::models::upload::{ Blob, UploadFile };
use crate::models::user::{
    AuthResponse,
    Credentials,
    MessageResponse,
    NewAccount,
    PasswordChange,
    ProfileUpdate,
    User,
};
use crate::models::verification::{ VerificationRecord, VerificationRequest };

/// The remote registry API, as consumed by the client.
///
/// Implementations attach the bearer token to authenticated calls and turn
/// error payloads into [`RegistryError`](crate::errors::RegistryError)s. A
/// `401` on an authenticated call must clear the session before returning
/// `RegistryError::Unauthorized`.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> RegistryResult<AuthResponse>;

    /// `POST /auth/register`
    async fn register(&self, account: &NewAccount) -> RegistryResult<AuthResponse>;

    /// `GET /auth/profile`
    async fn profile(&self) -> RegistryResult<User>;

    /// `PUT /auth/profile`
    async fn update_profile(&self, update: &ProfileUpdate) -> RegistryResult<User>;

    /// `POST /auth/change-password`
    async fn change_password(&self, change: &PasswordChange) -> RegistryResult<MessageResponse>;

    /// `POST /auth/forgot-password`
    async fn forgot_password(&self, email: &str) -> RegistryResult<MessageResponse>;

    /// `GET /properties`
    async fn list_properties(&self) -> RegistryResult<PropertyPage>;

    /// `GET /properties/:id`
    async fn get_property(&self, id: &str) -> RegistryResult<Property>;

    /// `GET /properties/search`
    async fn search_properties(&self, query: &SearchQuery) -> RegistryResult<Vec<Property>>;

    /// `POST /properties`, one multi-part request with every tagged file
    async fn create_property(
        &self,
        property: &NewProperty,
        files: &[UploadFile]
    ) -> RegistryResult<Property>;

    /// `POST /properties/transfer/initiate`
    async fn initiate_transfer(
        &self,
        initiation: &TransferInitiation
    ) -> RegistryResult<TransferRecord>;

    /// `POST /properties/transfer/:id/documents`
    async fn upload_transfer_documents(
        &self,
        transfer_id: &str,
        files: &[UploadFile]
    ) -> RegistryResult<Vec<TransferDocument>>;

    /// `PUT /properties/transfer/:id`
    async fn update_transfer(&self, transfer_id: &str, update: &PaymentUpdate) -> RegistryResult<()>;

    /// `POST /properties/transfer/:id/complete`
    async fn complete_transfer(
        &self,
        transfer_id: &str,
        snapshot: &TransferRecord,
        signature: &Blob
    ) -> RegistryResult<TransferRecord>;

    /// `GET /properties/transfer/:id`
    async fn get_transfer(&self, transfer_id: &str) -> RegistryResult<TransferRecord>;

    /// `GET /properties/transfer/list`
    async fn list_transfers(&self) -> RegistryResult<Vec<TransferRecord>>;

    /// `GET /users/search`, never returning the excluded ids
    async fn search_users(&self, term: &str, exclude: &[String]) -> RegistryResult<Vec<User>>;

    /// `POST /verification/submit`
    async fn submit_verification(&self, request: &VerificationRequest) -> RegistryResult<()>;

    /// `POST /verification/:propertyId/approve`
    async fn approve_verification(
        &self,
        property_id: &str,
        request: &VerificationRequest,
        signature: &Blob
    ) -> RegistryResult<()>;

    /// `GET /verification/property/:propertyId`
    async fn verification_details(&self, property_id: &str) -> RegistryResult<VerificationRecord>;

    /// `GET /dashboard/stats`
    async fn dashboard_stats(&self) -> RegistryResult<DashboardStats>;

    /// `GET /dashboard/trends`
    async fn dashboard_trends(&self) -> RegistryResult<Vec<serde_json::Value>>;

    /// `GET /dashboard/activities`
    async fn dashboard_activities(&self) -> RegistryResult<Vec<serde_json::Value>>;
}
