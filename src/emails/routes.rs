//! REST endpoints for email priority records, plus the dashboard page.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use super::model::priority_label;
use super::service::EmailPriorityService;
use super::tier::TierCounts;
use crate::error::EmailError;

/// Embedded single-page dashboard.
const DASHBOARD_HTML: &str = include_str!("../../assets/dashboard.html");

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: EmailPriorityService,
}

/// Build the Axum router for the email priority API and dashboard.
pub fn email_routes(service: EmailPriorityService) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/emails", get(list_emails).post(create_email))
        .route("/emails/summary", get(summary))
        .route("/emails/{id}", patch(update_priority))
        .with_state(state)
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Everything a handler can fail with, mapped onto the HTTP contract.
#[derive(Debug)]
pub enum ApiError {
    Email(EmailError),
    /// Body could not be read as JSON.
    Malformed {
        error: &'static str,
        details: String,
    },
}

impl From<EmailError> for ApiError {
    fn from(e: EmailError) -> Self {
        Self::Email(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Email(EmailError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::Email(EmailError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, json!({ "error": "Email not found" }))
            }
            ApiError::Email(EmailError::Store(e)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
            }
            ApiError::Malformed { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": error, "details": details }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(
    body: &Bytes,
    error: &'static str,
) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        error!(error = %e, context = error, "Malformed request body");
        ApiError::Malformed {
            error,
            details: e.to_string(),
        }
    })
}

// ── Pages ───────────────────────────────────────────────────────────────

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "email-priority"
    }))
}

// ── REST Endpoints ──────────────────────────────────────────────────────

/// POST /emails
///
/// Accepts the upstream agent payload, flat or wrapped under `json`.
async fn create_email(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload: Value = parse_body(&body, "Failed to process request")?;
    let stored = state.service.ingest(&payload).await?;
    Ok(Json(json!({
        "success": true,
        "data": [stored],
        "message": "Email priority saved successfully"
    })))
}

/// GET /emails
async fn list_emails(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let emails = state.service.list().await?;
    Ok(Json(json!({ "data": emails })))
}

/// GET /emails/summary
///
/// Tier counts over the same records `GET /emails` returns.
async fn summary(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let emails = state.service.list().await?;
    Ok(Json(json!({ "data": TierCounts::from_records(&emails) })))
}

#[derive(Deserialize)]
struct UpdatePriorityRequest {
    #[serde(default)]
    priority: Option<Value>,
}

/// PATCH /emails/{id}
async fn update_priority(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: UpdatePriorityRequest = parse_body(&body, "Failed to update priority")?;
    let priority = priority_label(request.priority.as_ref());
    let updated = state
        .service
        .update_priority(&id, priority.as_deref())
        .await?;
    Ok(Json(json!({
        "success": true,
        "data": updated,
        "message": "Priority updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::store::LibSqlBackend;

    async fn app() -> Router {
        let store = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        email_routes(EmailPriorityService::new(store))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn post_then_get() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/emails",
            r#"{"Sender_name":"Ann","priority_hml":"High"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"][0]["sender_name"], "Ann");
        assert_eq!(body["data"][0]["sender_email"], Value::Null);

        let (status, body) = send(&app, Method::GET, "/emails", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_post_body_is_500_with_details() {
        let app = app().await;
        let (status, body) = send(&app, Method::POST, "/emails", "{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to process request");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn non_object_post_body_is_400() {
        let app = app().await;
        let (status, body) = send(&app, Method::POST, "/emails", "[1,2,3]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn patch_errors_map_to_status_codes() {
        let app = app().await;
        let (_, created) = send(&app, Method::POST, "/emails", r#"{"priority_hml":"Low"}"#).await;
        let id = created["data"][0]["id"].as_str().unwrap().to_string();

        let (status, body) =
            send(&app, Method::PATCH, &format!("/emails/{id}"), r#"{"priority":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Priority is required");

        let (status, _) = send(&app, Method::PATCH, &format!("/emails/{id}"), "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = uuid::Uuid::new_v4();
        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/emails/{missing}"),
            r#"{"priority":"High"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Email not found");

        let (status, body) = send(&app, Method::PATCH, &format!("/emails/{id}"), "oops").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to update priority");
    }

    #[tokio::test]
    async fn patch_with_non_string_priority() {
        let app = app().await;
        let (_, created) = send(&app, Method::POST, "/emails", r#"{"priority_hml":"Low"}"#).await;
        let id = created["data"][0]["id"].as_str().unwrap().to_string();
        let uri = format!("/emails/{id}");

        for body in [
            r#"{"priority":false}"#,
            r#"{"priority":0}"#,
            r#"{"priority":null}"#,
        ] {
            let (status, resp) = send(&app, Method::PATCH, &uri, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(resp["error"], "Priority is required");
        }

        let (status, resp) = send(&app, Method::PATCH, &uri, r#"{"priority":3}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["data"]["priority"], "3");
    }

    #[tokio::test]
    async fn summary_counts_tiers() {
        let app = app().await;
        for p in ["High", "high", "Medium", "whatever"] {
            send(
                &app,
                Method::POST,
                "/emails",
                &json!({ "priority_hml": p }).to_string(),
            )
            .await;
        }

        let (status, body) = send(&app, Method::GET, "/emails/summary", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!({ "total": 4, "high": 2, "medium": 1, "low": 0 })
        );
    }

    #[tokio::test]
    async fn dashboard_is_html() {
        let app = app().await;
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}
