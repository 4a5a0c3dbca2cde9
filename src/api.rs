//! Remote account API client
//!
//! Thin typed client for the account service: login, registration, pushing
//! a health record, and the server-side ask endpoint. The service itself is
//! an external collaborator; this module only shapes requests and maps
//! failures into the error taxonomy.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::Observation;

/// Account requests are interactive; keep the timeout short
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Account API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service did not respond in time or the transport failed
    #[error("account service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service answered with a non-success status
    #[error("account service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Result type for account API calls
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Registration fields for a new account
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
}

/// Registration outcome
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    query: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the remote account service
pub struct AccountClient {
    http: reqwest::Client,
    base_url: String,
}

impl AccountClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<R> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))
    }

    /// Authenticate and return the account identity
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        debug!(username, "logging in");
        self.post("/api/login", &Credentials { username, password })
            .await
    }

    /// Create a new account
    pub async fn register(&self, registration: &Registration) -> ApiResult<RegisterResponse> {
        self.post("/api/register", registration).await
    }

    /// Push one observation to the remote record
    pub async fn add_health_record(&self, observation: &Observation) -> ApiResult<()> {
        let url = format!("{}/api/health/add", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(observation)
            .send()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }
        Ok(())
    }

    /// Forward a question with its assembled context to the server-side
    /// assistant endpoint
    pub async fn ask(&self, query: &str, context: &str) -> ApiResult<String> {
        let body: AskResponse = self.post("/api/ask", &AskRequest { query, context }).await?;
        Ok(body.response)
    }
}
