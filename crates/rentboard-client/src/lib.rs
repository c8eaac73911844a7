//! REST client for the rental API plus the backend seam the web layer talks to.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use rentboard_core::{
    CreateServiceConfigInput, CreateServiceScheduleInput, Listing, Room, RoomFormData,
    ServiceConfig, ServiceSchedule,
};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

mod fixture;

pub use fixture::{FixtureBackend, FixtureError, FixtureFile, UPCOMING_WINDOW_DAYS};

pub const CRATE_NAME: &str = "rentboard-client";

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(20),
            user_agent: None,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("RENTBOARD_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("RENTBOARD_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(20),
            ),
            user_agent: std::env::var("RENTBOARD_USER_AGENT").ok(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },
    #[error("decoding response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} not found")]
    NotFound(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::NotFound(_) => true,
            ApiError::Status { status, .. } => *status == StatusCode::NOT_FOUND.as_u16(),
            _ => false,
        }
    }
}

/// Everything the site and dashboard need from the rental backend.
#[async_trait]
pub trait RentalApi: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn list_rooms(&self) -> Result<Vec<Room>, ApiError>;
    async fn create_room(&self, data: &RoomFormData) -> Result<Room, ApiError>;
    async fn update_room(&self, id: &str, data: &RoomFormData) -> Result<Room, ApiError>;
    async fn delete_room(&self, id: &str) -> Result<(), ApiError>;

    async fn list_service_configs(&self) -> Result<Vec<ServiceConfig>, ApiError>;
    async fn create_service_config(
        &self,
        input: &CreateServiceConfigInput,
    ) -> Result<ServiceConfig, ApiError>;

    async fn list_service_schedules(&self) -> Result<Vec<ServiceSchedule>, ApiError>;
    async fn create_service_schedule(
        &self,
        input: &CreateServiceScheduleInput,
    ) -> Result<ServiceSchedule, ApiError>;
    async fn complete_service_schedule(&self, id: i64) -> Result<ServiceSchedule, ApiError>;
    async fn upcoming_services(&self) -> Result<Vec<ServiceSchedule>, ApiError>;
}

/// Listing source for the public grid: every room, projected in API order.
pub async fn load_listings(api: &dyn RentalApi) -> Result<Vec<Listing>, ApiError> {
    let rooms = api.list_rooms().await?;
    Ok(rooms.iter().map(Room::to_listing).collect())
}

/// Fixture file when one is given, otherwise the remote API configured from the environment.
pub async fn open_backend(fixtures: Option<&Path>) -> anyhow::Result<Arc<dyn RentalApi>> {
    match fixtures {
        Some(path) => {
            let backend = FixtureBackend::from_path(path)
                .await
                .context("opening fixture backend")?;
            Ok(Arc::new(backend))
        }
        None => {
            let config = ApiConfig::from_env();
            info!(base_url = %config.base_url, "using rental api backend");
            Ok(Arc::new(ApiClient::new(config)?))
        }
    }
}

#[derive(Serialize)]
struct RoomUpdate<'a> {
    id: &'a str,
    #[serde(flatten)]
    data: &'a RoomFormData,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build().context("building reqwest client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> (RequestBuilder, String) {
        let url = self.url(path);
        (self.client.request(method, &url), url)
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> Result<Vec<u8>, ApiError> {
        let resp = builder.send().await.map_err(|err| {
            warn!(url, error = %err, "api request failed");
            ApiError::Request(err)
        })?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|err| {
                warn!(url, status = status.as_u16(), error = %err, "reading api response body failed");
                ApiError::Request(err)
            })?
            .to_vec();

        if status.is_success() {
            debug!(url, status = status.as_u16(), bytes = body.len(), "api response");
            return Ok(body);
        }

        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        warn!(url, status = status.as_u16(), %message, "api returned error status");
        Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            message,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<T, ApiError> {
        let (builder, url) = self.request(method.clone(), path);
        self.decode(builder, method, url).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, url) = self.request(method.clone(), path);
        self.decode(builder.json(body), method, url).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: Method,
        url: String,
    ) -> Result<T, ApiError> {
        let span = info_span!("api_request", %method, url = %url);
        let bytes = self.send(builder, &url).instrument(span).await?;
        serde_json::from_slice(&bytes).map_err(|source| {
            warn!(url = %url, error = %source, "api response did not decode");
            ApiError::Decode { url, source }
        })
    }

    async fn empty(&self, method: Method, path: &str) -> Result<(), ApiError> {
        let (builder, url) = self.request(method.clone(), path);
        let span = info_span!("api_request", %method, url = %url);
        self.send(builder, &url).instrument(span).await.map(|_| ())
    }

    pub async fn get_rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.fetch_json(Method::GET, "room").await
    }

    pub async fn create_room(&self, data: &RoomFormData) -> Result<Room, ApiError> {
        self.send_json(Method::POST, "room/create", data).await
    }

    pub async fn update_room(&self, id: &str, data: &RoomFormData) -> Result<Room, ApiError> {
        self.send_json(Method::PATCH, "room/update", &RoomUpdate { id, data })
            .await
    }

    pub async fn delete_room(&self, id: &str) -> Result<(), ApiError> {
        self.empty(Method::DELETE, &format!("room/{id}")).await
    }

    pub async fn get_service_configs(&self) -> Result<Vec<ServiceConfig>, ApiError> {
        self.fetch_json(Method::GET, "services/configs").await
    }

    pub async fn create_service_config(
        &self,
        input: &CreateServiceConfigInput,
    ) -> Result<ServiceConfig, ApiError> {
        self.send_json(Method::POST, "services/configs", input).await
    }

    pub async fn update_service_config(
        &self,
        id: i64,
        input: &CreateServiceConfigInput,
    ) -> Result<ServiceConfig, ApiError> {
        self.send_json(Method::PATCH, &format!("services/configs/{id}"), input)
            .await
    }

    pub async fn delete_service_config(&self, id: i64) -> Result<(), ApiError> {
        self.empty(Method::DELETE, &format!("services/configs/{id}")).await
    }

    pub async fn get_service_schedules(&self) -> Result<Vec<ServiceSchedule>, ApiError> {
        self.fetch_json(Method::GET, "services/schedules").await
    }

    pub async fn create_service_schedule(
        &self,
        input: &CreateServiceScheduleInput,
    ) -> Result<ServiceSchedule, ApiError> {
        self.send_json(Method::POST, "services/schedules", input).await
    }

    pub async fn update_service_schedule(
        &self,
        id: i64,
        input: &CreateServiceScheduleInput,
    ) -> Result<ServiceSchedule, ApiError> {
        self.send_json(Method::PATCH, &format!("services/schedules/{id}"), input)
            .await
    }

    pub async fn delete_service_schedule(&self, id: i64) -> Result<(), ApiError> {
        self.empty(Method::DELETE, &format!("services/schedules/{id}"))
            .await
    }

    pub async fn get_upcoming_services(&self) -> Result<Vec<ServiceSchedule>, ApiError> {
        self.fetch_json(Method::GET, "services/upcoming").await
    }

    pub async fn mark_service_completed(&self, id: i64) -> Result<ServiceSchedule, ApiError> {
        self.fetch_json(Method::POST, &format!("services/schedules/{id}/complete"))
            .await
    }
}

#[async_trait]
impl RentalApi for ApiClient {
    fn backend_name(&self) -> &'static str {
        "api"
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.get_rooms().await
    }

    async fn create_room(&self, data: &RoomFormData) -> Result<Room, ApiError> {
        ApiClient::create_room(self, data).await
    }

    async fn update_room(&self, id: &str, data: &RoomFormData) -> Result<Room, ApiError> {
        ApiClient::update_room(self, id, data).await
    }

    async fn delete_room(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::delete_room(self, id).await
    }

    async fn list_service_configs(&self) -> Result<Vec<ServiceConfig>, ApiError> {
        self.get_service_configs().await
    }

    async fn create_service_config(
        &self,
        input: &CreateServiceConfigInput,
    ) -> Result<ServiceConfig, ApiError> {
        ApiClient::create_service_config(self, input).await
    }

    async fn list_service_schedules(&self) -> Result<Vec<ServiceSchedule>, ApiError> {
        self.get_service_schedules().await
    }

    async fn create_service_schedule(
        &self,
        input: &CreateServiceScheduleInput,
    ) -> Result<ServiceSchedule, ApiError> {
        ApiClient::create_service_schedule(self, input).await
    }

    async fn complete_service_schedule(&self, id: i64) -> Result<ServiceSchedule, ApiError> {
        self.mark_service_completed(id).await
    }

    async fn upcoming_services(&self) -> Result<Vec<ServiceSchedule>, ApiError> {
        self.get_upcoming_services().await
    }
}

/// Pulls the server's `message` out of an error body; validation errors may
/// send a list of messages.
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts = items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}
