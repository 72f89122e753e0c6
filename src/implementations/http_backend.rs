use async_trait::async_trait;
use log::{ debug, info, warn };
use reqwest::multipart::{ Form, Part };
use reqwest::header::AUTHORIZATION;
use reqwest::{ Method, Request, RequestBuilder };
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::errors::{ FieldErrors, RegistryError, RegistryResult, GENERIC_FAILURE };
use crate::implementations::session_store::SessionStore;
use crate::models::dashboard::DashboardStats;
use crate::models::property::{ Property, PropertyPage, PropertySearchResults, SearchQuery };
use crate::models::registration::NewProperty;
use crate::models::transfer::{
    PaymentUpdate,
    TransferDocument,
    TransferDocumentsResponse,
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

/// Whether a request carries the session's bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Anonymous,
}

/// Error payload the registry sends with non-2xx responses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    Wrapped {
        user: User,
    },
    Bare(User),
}

impl From<UserEnvelope> for User {
    fn from(envelope: UserEnvelope) -> Self {
        match envelope {
            UserEnvelope::Wrapped { user } => user,
            UserEnvelope::Bare(user) => user,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserSearchResults {
    #[serde(default)]
    users: Vec<User>,
}

/// Map a non-2xx response into an error.
///
/// A `401` only means "session expired" for requests that sent a token; on
/// login it is an ordinary rejection and the server's message is kept.
fn error_from_response(status: u16, body: &str, authenticated: bool) -> RegistryError {
    if status == 401 && authenticated {
        return RegistryError::Unauthorized;
    }

    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());

    if (400..500).contains(&status) {
        RegistryError::Rejected {
            status,
            message,
            field_errors: parsed.errors.map(field_errors_from).unwrap_or_default(),
        }
    } else {
        RegistryError::Server { status, message }
    }
}

/// Accepts `{field: message}` maps and `[{field|path|param, message|msg}]` lists
fn field_errors_from(value: Value) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match value {
        Value::Object(map) => {
            for (field, message) in map {
                match message {
                    Value::String(message) => errors.add(field, message),
                    Value::Object(inner) => {
                        if let Some(Value::String(message)) = inner.get("message") {
                            errors.add(field, message.clone());
                        }
                    }
                    _ => {}
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let field = ["field", "path", "param"]
                    .iter()
                    .find_map(|key| item.get(*key).and_then(Value::as_str));
                let message = ["message", "msg"]
                    .iter()
                    .find_map(|key| item.get(*key).and_then(Value::as_str));
                if let (Some(field), Some(message)) = (field, message) {
                    errors.add(field, message);
                }
            }
        }
        _ => {}
    }
    errors
}

fn parse_body<T: DeserializeOwned>(body: &str) -> RegistryResult<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| {
        warn!("JSON parsing error: {}", e);
        RegistryError::Parse(e.to_string())
    })
}

/// A bare array, or the first array found in an object envelope
fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) =>
            map
                .into_iter()
                .find_map(|(_, v)| {
                    match v {
                        Value::Array(items) => Some(items),
                        _ => None,
                    }
                })
                .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// The bearer credential a built request carries
fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn file_part(file: &UploadFile) -> RegistryResult<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.mime)
        .map_err(|e| RegistryError::InvalidInput(format!("{}: {}", file.name, e)))
}

fn blob_part(blob: &Blob, stem: &str) -> RegistryResult<Part> {
    Part::bytes(blob.bytes.clone())
        .file_name(format!("{}.{}", stem, blob.extension()))
        .mime_str(&blob.mime)
        .map_err(|e| RegistryError::InvalidInput(e.to_string()))
}

/// Registry API over HTTP.
///
/// Holds a clone of the session store: the token is read per request, and
/// a `401` on an authenticated request clears the session before the error
/// reaches the caller.
#[derive(Clone)]
pub struct HttpBackend {
    config: ClientConfig,
    http_client: reqwest::Client,
    session: SessionStore,
}

impl HttpBackend {
    pub fn new(config: ClientConfig, session: SessionStore) -> RegistryResult<Self> {
        let http_client = reqwest::Client
            ::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RegistryError::Network(format!("Failed to create HTTP client: {}", e)))?;

        info!("Registry API at {}", config.api_base_url);
        Ok(Self { config, http_client, session })
    }

    fn request(&self, method: Method, path: &str, auth: Auth) -> RequestBuilder {
        let url = self.config.endpoint(path);
        debug!("{} {}", method, url);
        let builder = self.http_client.request(method, &url);
        match (auth, self.session.token()) {
            (Auth::Bearer, Some(token)) => builder.bearer_auth(token),
            _ => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, auth: Auth) -> RegistryResult<T> {
        let request = builder
            .build()
            .map_err(|e| RegistryError::InvalidInput(format!("Failed to build request: {}", e)))?;
        let sent_token = bearer_token(&request);

        let response = self.http_client.execute(request).await.map_err(|e| {
            let error_msg = format!("Request failed: {}", e);
            warn!("{}", error_msg);
            if e.is_timeout() {
                warn!("Request timed out");
            }
            if e.is_connect() {
                warn!("Connection error - check that the registry API is reachable");
            }
            RegistryError::Network(error_msg)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to get response text: {}", e);
            RegistryError::Network(e.to_string())
        })?;

        if !(200..300).contains(&status) {
            warn!("API error: HTTP {} - {}", status, body);
            let err = error_from_response(status, &body, auth == Auth::Bearer);
            if err.is_unauthorized() {
                if let Some(token) = sent_token {
                    self.session.invalidate_token(&token);
                }
            }
            return Err(err);
        }

        debug!("Response length: {} characters", body.len());
        parse_body(&body)
    }

    async fn send_unit(&self, builder: RequestBuilder, auth: Auth) -> RegistryResult<()> {
        self.send::<Value>(builder, auth).await.map(|_| ())
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> RegistryResult<AuthResponse> {
        let request = self.request(Method::POST, "/auth/login", Auth::Anonymous).json(credentials);
        self.send(request, Auth::Anonymous).await
    }

    async fn register(&self, account: &NewAccount) -> RegistryResult<AuthResponse> {
        let request = self.request(Method::POST, "/auth/register", Auth::Anonymous).json(account);
        self.send(request, Auth::Anonymous).await
    }

    async fn profile(&self) -> RegistryResult<User> {
        let request = self.request(Method::GET, "/auth/profile", Auth::Bearer);
        self.send::<UserEnvelope>(request, Auth::Bearer).await.map(User::from)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> RegistryResult<User> {
        let request = self.request(Method::PUT, "/auth/profile", Auth::Bearer).json(update);
        self.send::<UserEnvelope>(request, Auth::Bearer).await.map(User::from)
    }

    async fn change_password(&self, change: &PasswordChange) -> RegistryResult<MessageResponse> {
        let request = self
            .request(Method::POST, "/auth/change-password", Auth::Bearer)
            .json(
                &serde_json::json!({
                "currentPassword": change.current_password,
                "newPassword": change.new_password,
            })
            );
        self.send(request, Auth::Bearer).await
    }

    async fn forgot_password(&self, email: &str) -> RegistryResult<MessageResponse> {
        let request = self
            .request(Method::POST, "/auth/forgot-password", Auth::Anonymous)
            .json(&serde_json::json!({ "email": email }));
        self.send(request, Auth::Anonymous).await
    }

    async fn list_properties(&self) -> RegistryResult<PropertyPage> {
        let request = self.request(Method::GET, "/properties", Auth::Bearer);
        self.send(request, Auth::Bearer).await
    }

    async fn get_property(&self, id: &str) -> RegistryResult<Property> {
        let request = self.request(Method::GET, &format!("/properties/{}", id), Auth::Bearer);
        self.send(request, Auth::Bearer).await
    }

    async fn search_properties(&self, query: &SearchQuery) -> RegistryResult<Vec<Property>> {
        let request = self
            .request(Method::GET, "/properties/search", Auth::Bearer)
            .query(&query.to_params());
        self.send::<PropertySearchResults>(request, Auth::Bearer).await.map(|r| r.properties)
    }

    async fn create_property(
        &self,
        property: &NewProperty,
        files: &[UploadFile]
    ) -> RegistryResult<Property> {
        let mut form = Form::new();
        for (key, value) in property.form_fields() {
            form = form.text(key, value);
        }
        for file in files {
            form = form.part(file.role.field_name(), file_part(file)?);
        }
        info!("Submitting property '{}' with {} files", property.details.title, files.len());

        let request = self.request(Method::POST, "/properties", Auth::Bearer).multipart(form);
        self.send(request, Auth::Bearer).await
    }

    async fn initiate_transfer(
        &self,
        initiation: &TransferInitiation
    ) -> RegistryResult<TransferRecord> {
        let request = self
            .request(Method::POST, "/properties/transfer/initiate", Auth::Bearer)
            .json(initiation);
        self.send(request, Auth::Bearer).await
    }

    async fn upload_transfer_documents(
        &self,
        transfer_id: &str,
        files: &[UploadFile]
    ) -> RegistryResult<Vec<TransferDocument>> {
        let mut form = Form::new();
        for file in files {
            let doc_type = if file.is_pdf() { "deed" } else { "supporting" };
            form = form.part("documents", file_part(file)?).text("documentTypes", doc_type);
        }
        form = form.text("transferId", transfer_id.to_string());

        let request = self
            .request(Method::POST, &format!("/properties/transfer/{}/documents", transfer_id), Auth::Bearer)
            .multipart(form);
        self.send::<TransferDocumentsResponse>(request, Auth::Bearer).await.map(|r| r.documents)
    }

    async fn update_transfer(&self, transfer_id: &str, update: &PaymentUpdate) -> RegistryResult<()> {
        let request = self
            .request(Method::PUT, &format!("/properties/transfer/{}", transfer_id), Auth::Bearer)
            .json(update);
        self.send_unit(request, Auth::Bearer).await
    }

    async fn complete_transfer(
        &self,
        transfer_id: &str,
        snapshot: &TransferRecord,
        signature: &Blob
    ) -> RegistryResult<TransferRecord> {
        let mut form = Form::new().part("signature", blob_part(signature, "signature")?);
        for (key, value) in snapshot.form_fields() {
            form = form.text(key, value);
        }

        let request = self
            .request(Method::POST, &format!("/properties/transfer/{}/complete", transfer_id), Auth::Bearer)
            .multipart(form);
        self.send(request, Auth::Bearer).await
    }

    async fn get_transfer(&self, transfer_id: &str) -> RegistryResult<TransferRecord> {
        let request = self.request(
            Method::GET,
            &format!("/properties/transfer/{}", transfer_id),
            Auth::Bearer
        );
        self.send(request, Auth::Bearer).await
    }

    async fn list_transfers(&self) -> RegistryResult<Vec<TransferRecord>> {
        let request = self.request(Method::GET, "/properties/transfer/list", Auth::Bearer);
        let value: Value = self.send(request, Auth::Bearer).await?;
        into_list(value)
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(|e| RegistryError::Parse(e.to_string())))
            .collect()
    }

    async fn search_users(&self, term: &str, exclude: &[String]) -> RegistryResult<Vec<User>> {
        let request = self
            .request(Method::GET, "/users/search", Auth::Bearer)
            .query(&[("search", term.to_string()), ("exclude", exclude.join(","))]);
        let results: UserSearchResults = self.send(request, Auth::Bearer).await?;
        Ok(
            results.users
                .into_iter()
                .filter(|user| !exclude.contains(&user.id))
                .collect()
        )
    }

    async fn submit_verification(&self, request: &VerificationRequest) -> RegistryResult<()> {
        let builder = self
            .request(Method::POST, "/verification/submit", Auth::Bearer)
            .json(request);
        self.send_unit(builder, Auth::Bearer).await
    }

    async fn approve_verification(
        &self,
        property_id: &str,
        request: &VerificationRequest,
        signature: &Blob
    ) -> RegistryResult<()> {
        let verification_data = serde_json
            ::to_string(request)
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
        let form = Form::new()
            .part("signature", blob_part(signature, "signature")?)
            .text("verificationData", verification_data);

        let builder = self
            .request(Method::POST, &format!("/verification/{}/approve", property_id), Auth::Bearer)
            .multipart(form);
        self.send_unit(builder, Auth::Bearer).await
    }

    async fn verification_details(&self, property_id: &str) -> RegistryResult<VerificationRecord> {
        let request = self.request(
            Method::GET,
            &format!("/verification/property/{}", property_id),
            Auth::Bearer
        );
        self.send(request, Auth::Bearer).await
    }

    async fn dashboard_stats(&self) -> RegistryResult<DashboardStats> {
        let request = self.request(Method::GET, "/dashboard/stats", Auth::Bearer);
        self.send(request, Auth::Bearer).await
    }

    async fn dashboard_trends(&self) -> RegistryResult<Vec<Value>> {
        let request = self.request(Method::GET, "/dashboard/trends", Auth::Bearer);
        self.send(request, Auth::Bearer).await.map(into_list)
    }

    async fn dashboard_activities(&self) -> RegistryResult<Vec<Value>> {
        let request = self.request(Method::GET, "/dashboard/activities", Auth::Bearer);
        self.send(request, Auth::Bearer).await.map(into_list)
    }
}
