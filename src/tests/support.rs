//! Fixtures and a scripted backend that records every call it receives.

use std::collections::HashMap;
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use async_trait::async_trait;
use dotenv::dotenv;
use log::{ debug, info };
use serde_json::Value;

use crate::errors::{ FieldErrors, RegistryError, RegistryResult };
use crate::implementations::session_store::SessionStore;
use crate::implementations::storage::MemoryStore;
use crate::models::common::{ PropertyType, VerificationStatus };
use crate::models::dashboard::DashboardStats;
use crate::models::property::{ Location, OwnerRef, Property, PropertyPage, SearchQuery };
use crate::models::registration::NewProperty;
use crate::models::transfer::{
    PaymentUpdate,
    TransferDocument,
    TransferInitiation,
    TransferRecord,
};
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
use crate::traits::backend::BackendApi;
use crate::traits::capture::{ SignatureEvent, SignaturePad };

pub const VALID_PASSWORD: &str = "secret1";
pub const TRANSFER_ID: &str = "t-100";

// Setup function to initialize logging and environment
pub fn setup() {
    // Initialize logger if not already initialized
    if env_logger::builder().is_test(true).try_init().is_ok() {
        info!("Logger initialized");
    }
    if dotenv().is_ok() {
        debug!("Loaded environment variables from .env file");
    }
}

pub fn user(id: &str, first_name: &str) -> User {
    User {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: "Kamara".to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        role: "user".to_string(),
    }
}

pub fn owner() -> User {
    user("u-owner", "Ada")
}

pub fn buyer() -> User {
    user("u-buyer", "Sia")
}

pub fn property(id: &str, property_type: PropertyType, status: VerificationStatus) -> Property {
    Property {
        id: id.to_string(),
        title: format!("Plot {}", id),
        description: "Level plot with road access".to_string(),
        property_type,
        size: 500.0,
        price: 120_000.0,
        location: Location {
            address: "12 Hill Rd".to_string(),
            area: "Western Urban".to_string(),
            city: "Freetown".to_string(),
            coordinates: None,
        },
        owner: Some(OwnerRef::Id(owner().id)),
        documents: Vec::new(),
        images: Vec::new(),
        verification_status: status,
        registration_date: None,
    }
}

pub fn session() -> SessionStore {
    SessionStore::open(Arc::new(MemoryStore::new()))
}

/// In-memory registry. Failures can be queued per call name; a queued
/// `Unauthorized` clears the attached session the way the HTTP backend does.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, RegistryError>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    session: Mutex<Option<SessionStore>>,
    properties: Mutex<Vec<Property>>,
    users: Vec<User>,
    pub completions: Mutex<Vec<(TransferRecord, Blob)>>,
    pub created: Mutex<Vec<(NewProperty, Vec<UploadFile>)>>,
    pub approvals: Mutex<Vec<(VerificationRequest, Blob)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            users: vec![owner(), buyer(), user("u-abc", "Abu")],
            properties: Mutex::new(
                vec![
                    property("p1", PropertyType::Residential, VerificationStatus::Verified),
                    property("p2", PropertyType::Commercial, VerificationStatus::Pending),
                    property("p3", PropertyType::Residential, VerificationStatus::Unverified)
                ]
            ),
            ..Self::default()
        }
    }

    pub fn shared() -> Arc<FakeBackend> {
        Arc::new(Self::new())
    }

    pub fn attach_session(&self, session: SessionStore) {
        *self.session.lock().unwrap() = Some(session);
    }

    pub fn fail_next(&self, call: &'static str, err: RegistryError) {
        self.failures.lock().unwrap().insert(call, err);
    }

    pub fn delay_search(&self, term: &str, delay: Duration) {
        self.search_delays.lock().unwrap().insert(term.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose name (the part before `:`) matches
    pub fn count(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(':').next() == Some(name))
            .count()
    }

    fn record(&self, name: &'static str, detail: &str) -> RegistryResult<()> {
        let entry = if detail.is_empty() { name.to_string() } else { format!("{}:{}", name, detail) };
        self.calls.lock().unwrap().push(entry);
        match self.failures.lock().unwrap().remove(name) {
            Some(RegistryError::Unauthorized) => {
                if let Some(session) = self.session.lock().unwrap().as_ref() {
                    session.invalidate();
                }
                Err(RegistryError::Unauthorized)
            }
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> RegistryResult<AuthResponse> {
        self.record("login", &credentials.email)?;
        if credentials.password != VALID_PASSWORD {
            return Err(RegistryError::Rejected {
                status: 401,
                message: "Invalid credentials".to_string(),
                field_errors: FieldErrors::new(),
            });
        }
        let mut user = owner();
        user.email = credentials.email.clone();
        Ok(AuthResponse { token: "token-123".to_string(), user })
    }

    async fn register(&self, account: &NewAccount) -> RegistryResult<AuthResponse> {
        self.record("register", &account.email)?;
        let mut user = user("u-new", &account.first_name);
        user.last_name = account.last_name.clone();
        user.email = account.email.clone();
        Ok(AuthResponse { token: "token-new".to_string(), user })
    }

    async fn profile(&self) -> RegistryResult<User> {
        self.record("profile", "")?;
        Ok(owner())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> RegistryResult<User> {
        self.record("update_profile", &update.email)?;
        let mut user = owner();
        user.first_name = update.first_name.clone();
        user.last_name = update.last_name.clone();
        user.email = update.email.clone();
        Ok(user)
    }

    async fn change_password(&self, _change: &PasswordChange) -> RegistryResult<MessageResponse> {
        self.record("change_password", "")?;
        Ok(MessageResponse { message: "Password updated".to_string() })
    }

    async fn forgot_password(&self, email: &str) -> RegistryResult<MessageResponse> {
        self.record("forgot_password", email)?;
        Ok(MessageResponse::default())
    }

    async fn list_properties(&self) -> RegistryResult<PropertyPage> {
        self.record("list_properties", "")?;
        let properties = self.properties.lock().unwrap().clone();
        Ok(PropertyPage {
            total: properties.len() as u64,
            properties,
            current_page: 1,
            total_pages: 1,
        })
    }

    async fn get_property(&self, id: &str) -> RegistryResult<Property> {
        self.record("get_property", id)?;
        self.properties
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| RegistryError::Rejected {
                status: 404,
                message: "Property not found".to_string(),
                field_errors: FieldErrors::new(),
            })
    }

    async fn search_properties(&self, query: &SearchQuery) -> RegistryResult<Vec<Property>> {
        self.record("search_properties", &query.text)?;
        let delay = self.search_delays.lock().unwrap().get(&query.text).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(
            self.properties
                .lock()
                .unwrap()
                .iter()
                .filter(|p| query.property_type.map_or(true, |t| p.property_type == t))
                .cloned()
                .collect()
        )
    }

    async fn create_property(&self, property: &NewProperty, files: &[UploadFile]) -> RegistryResult<Property> {
        self.record("create_property", &files.len().to_string())?;
        self.created.lock().unwrap().push((property.clone(), files.to_vec()));
        let mut created = crate::tests::support::property(
            "p-new",
            property.details.property_type,
            VerificationStatus::Unverified
        );
        created.title = property.details.title.clone();
        Ok(created)
    }

    async fn initiate_transfer(&self, initiation: &TransferInitiation) -> RegistryResult<TransferRecord> {
        self.record("initiate_transfer", &initiation.to_owner_id)?;
        Ok(TransferRecord {
            id: TRANSFER_ID.to_string(),
            to_owner_id: Some(initiation.to_owner_id.clone()),
            transfer_reason: Some(initiation.transfer_reason.clone()),
            agreement_date: Some(initiation.agreement_date.clone()),
            status: Some("initiated".to_string()),
            ..TransferRecord::default()
        })
    }

    async fn upload_transfer_documents(
        &self,
        transfer_id: &str,
        files: &[UploadFile]
    ) -> RegistryResult<Vec<TransferDocument>> {
        self.record("upload_transfer_documents", &format!("{}:{}", transfer_id, files.len()))?;
        Ok(
            files
                .iter()
                .map(|file| TransferDocument {
                    id: None,
                    name: file.name.clone(),
                    url: format!("/uploads/{}", file.name),
                    doc_type: (if file.is_pdf() { "deed" } else { "supporting" }).to_string(),
                })
                .collect()
        )
    }

    async fn update_transfer(&self, transfer_id: &str, update: &PaymentUpdate) -> RegistryResult<()> {
        self.record("update_transfer", &format!("{}:{}", transfer_id, update.transfer_amount))
    }

    async fn complete_transfer(
        &self,
        transfer_id: &str,
        snapshot: &TransferRecord,
        signature: &Blob
    ) -> RegistryResult<TransferRecord> {
        self.record("complete_transfer", transfer_id)?;
        self.completions.lock().unwrap().push((snapshot.clone(), signature.clone()));
        let mut completed = snapshot.clone();
        completed.status = Some("completed".to_string());
        Ok(completed)
    }

    async fn get_transfer(&self, transfer_id: &str) -> RegistryResult<TransferRecord> {
        self.record("get_transfer", transfer_id)?;
        Ok(TransferRecord { id: transfer_id.to_string(), ..TransferRecord::default() })
    }

    async fn list_transfers(&self) -> RegistryResult<Vec<TransferRecord>> {
        self.record("list_transfers", "")?;
        Ok(Vec::new())
    }

    async fn search_users(&self, term: &str, exclude: &[String]) -> RegistryResult<Vec<User>> {
        self.record("search_users", term)?;
        let delay = self.search_delays.lock().unwrap().get(term).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let needle = term.to_lowercase();
        Ok(
            self.users
                .iter()
                .filter(|u| !exclude.contains(&u.id))
                .filter(|u| u.full_name().to_lowercase().contains(&needle))
                .cloned()
                .collect()
        )
    }

    async fn submit_verification(&self, request: &VerificationRequest) -> RegistryResult<()> {
        self.record("submit_verification", &request.ls_number)
    }

    async fn approve_verification(
        &self,
        property_id: &str,
        request: &VerificationRequest,
        signature: &Blob
    ) -> RegistryResult<()> {
        self.record("approve_verification", property_id)?;
        self.approvals.lock().unwrap().push((request.clone(), signature.clone()));
        Ok(())
    }

    async fn verification_details(&self, property_id: &str) -> RegistryResult<VerificationRecord> {
        self.record("verification_details", property_id)?;
        Err(RegistryError::Rejected {
            status: 404,
            message: "No verification found".to_string(),
            field_errors: FieldErrors::new(),
        })
    }

    async fn dashboard_stats(&self) -> RegistryResult<DashboardStats> {
        self.record("dashboard_stats", "")?;
        Ok(DashboardStats { total_properties: 3, verified_properties: 1, ..DashboardStats::default() })
    }

    async fn dashboard_trends(&self) -> RegistryResult<Vec<Value>> {
        self.record("dashboard_trends", "")?;
        Ok(vec![serde_json::json!({ "month": "2024-01", "count": 2 })])
    }

    async fn dashboard_activities(&self) -> RegistryResult<Vec<Value>> {
        self.record("dashboard_activities", "")?;
        Ok(Vec::new())
    }
}

/// Signature pad that replays a fixed script of events
pub struct ScriptedPad {
    events: Mutex<Vec<SignatureEvent>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedPad {
    pub fn new(mut events: Vec<SignatureEvent>) -> Self {
        events.reverse();
        Self { events: Mutex::new(events), prompts: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl SignaturePad for ScriptedPad {
    async fn request_signature(&self) -> RegistryResult<SignatureEvent> {
        Ok(self.events.lock().unwrap().pop().unwrap_or(SignatureEvent::Cancelled))
    }

    fn prompt(&self, message: &str) {
        self.prompts.lock().unwrap().push(message.to_string());
    }
}

/// A small PNG-ish signature blob
pub fn signature() -> Blob {
    Blob::new("image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3])
}
