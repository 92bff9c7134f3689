// HTTP client for the movie night REST API.
//
// All calls go through one `reqwest::Client`. A non-success status is
// converted into `ApiError::Api` carrying the human-readable message from
// the response body's `error` (or `message`) field, which handlers surface
// to the user verbatim. The `MovieNightApi` trait is the seam that lets the
// app orchestrator be tested against a recording mock.

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::api::types::{
    EligibleSet, Roll, RollOutcome, RollPatch, RollRequest, RosterResponse, Season, SeasonDraft,
    SeasonPatch,
};
use crate::config::Config;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Failures of a single API call. Every variant renders to a message
/// suitable for a user-facing notice.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status. `message` comes from
    /// the response body when it carries one.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never completed (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// MovieNightApi trait
// ---------------------------------------------------------------------------

/// The operations the page controllers need from the server.
///
/// Implemented by `ApiClient` for the real server and by recording mocks in
/// tests.
#[async_trait]
pub trait MovieNightApi: Send + Sync {
    async fn list_seasons(&self) -> Result<Vec<Season>, ApiError>;
    async fn get_season(&self, id: i64) -> Result<Season, ApiError>;
    async fn create_season(&self, draft: &SeasonDraft) -> Result<Season, ApiError>;
    async fn update_season(&self, id: i64, patch: &SeasonPatch) -> Result<Season, ApiError>;
    async fn season_roster(&self, id: i64) -> Result<Vec<String>, ApiError>;
    async fn reset_roster(&self, id: i64) -> Result<(), ApiError>;
    async fn eligible(&self) -> Result<EligibleSet, ApiError>;
    async fn list_rolls(&self, season_id: Option<i64>) -> Result<Vec<Roll>, ApiError>;
    async fn get_roll(&self, id: i64) -> Result<Roll, ApiError>;
    async fn perform_roll(&self, req: &RollRequest) -> Result<RollOutcome, ApiError>;
    async fn update_roll(&self, id: i64, patch: &RollPatch) -> Result<Roll, ApiError>;
    async fn delete_roll(&self, id: i64) -> Result<(), ApiError>;
    async fn enrich_roll(&self, id: i64) -> Result<Roll, ApiError>;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Concrete client talking JSON to the movie night server.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `http://127.0.0.1:5000`).
    /// A trailing slash on the base URL is tolerated.
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from the application config, applying the configured
    /// request timeout.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.server.request_timeout_secs,
            ))
            .build()?;
        Ok(ApiClient::new(http, &config.server.base_url))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        let resp = self.http.get(self.url(path)).send().await?;
        decode(resp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!("POST {}", path);
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        decode(resp).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!("PUT {}", path);
        let resp = self.http.put(self.url(path)).json(body).send().await?;
        decode(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!("DELETE {}", path);
        let resp = self.http.delete(self.url(path)).send().await?;
        expect_ok(resp).await
    }
}

#[async_trait]
impl MovieNightApi for ApiClient {
    async fn list_seasons(&self) -> Result<Vec<Season>, ApiError> {
        self.get_json("/api/seasons").await
    }

    async fn get_season(&self, id: i64) -> Result<Season, ApiError> {
        self.get_json(&format!("/api/seasons/{id}")).await
    }

    async fn create_season(&self, draft: &SeasonDraft) -> Result<Season, ApiError> {
        self.post_json("/api/seasons", draft).await
    }

    async fn update_season(&self, id: i64, patch: &SeasonPatch) -> Result<Season, ApiError> {
        self.put_json(&format!("/api/seasons/{id}"), patch).await
    }

    async fn season_roster(&self, id: i64) -> Result<Vec<String>, ApiError> {
        let resp: RosterResponse = self
            .get_json(&format!("/api/seasons/{id}/roster"))
            .await?;
        Ok(resp.roster)
    }

    async fn reset_roster(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/seasons/{id}/roster")).await
    }

    async fn eligible(&self) -> Result<EligibleSet, ApiError> {
        self.get_json("/api/eligible").await
    }

    async fn list_rolls(&self, season_id: Option<i64>) -> Result<Vec<Roll>, ApiError> {
        let path = match season_id {
            Some(id) => format!("/api/rolls?season_id={id}"),
            None => "/api/rolls".to_string(),
        };
        self.get_json(&path).await
    }

    async fn get_roll(&self, id: i64) -> Result<Roll, ApiError> {
        self.get_json(&format!("/api/rolls/{id}")).await
    }

    async fn perform_roll(&self, req: &RollRequest) -> Result<RollOutcome, ApiError> {
        self.post_json("/api/rolls", req).await
    }

    async fn update_roll(&self, id: i64, patch: &RollPatch) -> Result<Roll, ApiError> {
        self.put_json(&format!("/api/rolls/{id}"), patch).await
    }

    async fn delete_roll(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/rolls/{id}")).await
    }

    async fn enrich_roll(&self, id: i64) -> Result<Roll, ApiError> {
        self.post_json(&format!("/api/rolls/{id}/enrich"), &serde_json::json!({}))
            .await
    }
}

// ---------------------------------------------------------------------------
// Response handling helpers
// ---------------------------------------------------------------------------

/// Decode a JSON response body, converting non-success statuses into
/// `ApiError::Api` with the extracted display message.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp.json().await?)
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status: status.as_u16(),
            message: error_message(status.as_u16(), &body),
        })
    }
}

/// Like `decode`, for endpoints whose success body carries nothing the
/// client needs.
async fn expect_ok(resp: Response) -> Result<(), ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status: status.as_u16(),
            message: error_message(status.as_u16(), &body),
        })
    }
}

/// Extract a display message from an error response body.
///
/// The server answers errors as `{"error": "..."}`; some deployments use
/// `{"message": "..."}` instead. Falls back to the status code when the
/// body carries neither.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    format!("server returned status {status}")
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
