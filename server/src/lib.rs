//! HTTP API for Keygate.
//!
//! A thin JSON layer over [`KeyLifecycle`]: every route parses its input,
//! calls exactly one lifecycle operation and renders the structured result.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
    routing::{delete, get, post},
    Router,
};
use keygate_license::{
    AdminListing, DeleteResponse, IssueResponse, KeyLifecycle, LicenseError, ServiceInfo,
    StatusResult, ValidationResponse,
};
use keygate_types::Timestamp;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Issuer recorded for keys issued through the partner callback.
pub const DEFAULT_ISSUER: &str = "lootlabs";

type AppState = Arc<KeyLifecycle>;

/// Lifecycle errors rendered as HTTP responses.
#[derive(Debug)]
pub struct ApiError(LicenseError);

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LicenseError::Forbidden => {
                (StatusCode::FORBIDDEN, "Invalid admin password".to_string())
            }
            LicenseError::InvalidExpiry(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    key: Option<String>,
    hwid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdminParams {
    #[serde(default)]
    password: String,
    hours: Option<String>,
}

impl AdminParams {
    /// Leading decimal digits of `hours` as a positive count, or `None` to
    /// use the configured default. Trailing text is ignored, so `"12h"` is 12.
    fn hours(&self) -> Option<u32> {
        let raw = self.hours.as_deref()?.trim_start();
        let raw = raw.strip_prefix('+').unwrap_or(raw);
        let end = raw
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(raw.len());
        raw[..end].parse::<u32>().ok().filter(|h| *h > 0)
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK", "timestamp": Timestamp::now().to_rfc3339() }))
}

async fn info_handler(State(lifecycle): State<AppState>) -> Json<ServiceInfo> {
    Json(lifecycle.info().await)
}

async fn getkey_handler(State(lifecycle): State<AppState>) -> Redirect {
    let config = lifecycle.config();
    if config.is_demo_redirect() {
        Redirect::to("/api/callback?demo=true")
    } else {
        Redirect::to(&config.redirect_link)
    }
}

async fn callback_handler(
    State(lifecycle): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<IssueResponse>, ApiError> {
    let issuer = params
        .user_id
        .as_deref()
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_ISSUER);
    let key = lifecycle.issue(None, issuer).await?;
    Ok(Json(IssueResponse::for_key(&key)))
}

async fn validate_handler(
    State(lifecycle): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Json<ValidationResponse> {
    match lifecycle
        .validate(req.key.as_deref(), req.hwid.as_deref())
        .await
    {
        Ok(result) => Json(ValidationResponse::from(&result)),
        Err(e) => {
            error!("Validation error: {}", e);
            Json(ValidationResponse::server_error())
        }
    }
}

async fn check_handler(
    State(lifecycle): State<AppState>,
    Path(key): Path<String>,
) -> Json<StatusResult> {
    Json(lifecycle.check_status(&key).await)
}

async fn admin_list_handler(
    State(lifecycle): State<AppState>,
    Query(params): Query<AdminParams>,
) -> Result<Json<AdminListing>, ApiError> {
    Ok(Json(lifecycle.admin_list(&params.password).await?))
}

async fn admin_delete_handler(
    State(lifecycle): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<AdminParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = lifecycle.admin_delete(&params.password, &key).await?;
    Ok(Json(DeleteResponse::from_deleted(deleted)))
}

async fn admin_generate_handler(
    State(lifecycle): State<AppState>,
    Query(params): Query<AdminParams>,
) -> Result<Json<IssueResponse>, ApiError> {
    let key = lifecycle
        .admin_issue(&params.password, params.hours())
        .await?;
    Ok(Json(IssueResponse::for_key(&key)))
}

/// Build the HTTP API router over the given lifecycle.
pub fn build_router(lifecycle: Arc<KeyLifecycle>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/getkey", get(getkey_handler))
        .route("/api/info", get(info_handler))
        .route("/api/callback", get(callback_handler).post(callback_handler))
        .route("/api/validate", post(validate_handler))
        .route("/api/check/{key}", get(check_handler))
        .route("/api/admin/keys", get(admin_list_handler))
        .route("/api/admin/keys/{key}", delete(admin_delete_handler))
        .route("/api/admin/generate", post(admin_generate_handler))
        .with_state(lifecycle)
}

/// Runs [`KeyLifecycle::sweep_expired`] every `period` until the task is
/// aborted. Failures are logged and retried on the next tick.
pub fn spawn_sweeper(lifecycle: Arc<KeyLifecycle>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match lifecycle.sweep_expired().await {
                Ok(0) => {}
                Ok(n) => info!("Periodic sweep removed {} expired keys", n),
                Err(e) => error!("Periodic sweep failed: {}", e),
            }
        }
    })
}
