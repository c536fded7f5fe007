//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::api::UsageApi;
use crate::dashboard::DashboardView;
use crate::error::DashError;
use crate::session::{FetchOutcome, Session};

use super::{HttpResponse, content_type_json};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `POST /api/token` body.
#[derive(Debug, Deserialize)]
struct TokenRequest {
    #[serde(default)]
    token: String,
}

/// Result of an action that runs a fetch cycle.
#[derive(Debug, Serialize)]
struct CycleResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<FetchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    dashboard: DashboardView,
}

#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

/// Map a fetch-cycle result to an HTTP status and body.
///
/// An empty token is the caller's fault (400); a failing remote service is
/// reported as a bad gateway (502). Either way the body carries the view so
/// the page can redraw the banner.
fn cycle_response(
    result: Result<FetchOutcome, DashError>,
    dashboard: DashboardView,
) -> (u16, CycleResponse) {
    match result {
        Ok(outcome) => (
            200,
            CycleResponse {
                success: true,
                outcome: Some(outcome),
                error: None,
                dashboard,
            },
        ),
        Err(err) => {
            let status = match &err {
                DashError::EmptyToken => 400,
                e if e.is_remote() => 502,
                _ => 500,
            };
            (
                status,
                CycleResponse {
                    success: false,
                    outcome: None,
                    error: Some(err.to_string()),
                    dashboard,
                },
            )
        }
    }
}

/// Serialize `data` as a JSON response with the given status code.
fn json_response<T: Serialize>(status: u16, data: &T) -> Result<HttpResponse> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status)))
}

/// `{"error": message}` with the given status code.
pub(crate) fn error_response(status: u16, message: &str) -> HttpResponse {
    let body = serde_json::to_string(&ErrorResponse { error: message })
        .unwrap_or_else(|_| String::from("{}"));
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/dashboard` — the current view.
pub fn get_dashboard<A: UsageApi + 'static>(session: &Arc<Session<A>>) -> Result<HttpResponse> {
    json_response(200, &session.view())
}

/// `GET /api/status` — last successful service status, or `null`.
pub fn get_status<A: UsageApi + 'static>(session: &Arc<Session<A>>) -> Result<HttpResponse> {
    json_response(200, &session.cached_status())
}

/// `POST /api/token` — store a token and fetch with it.
///
/// Expects JSON body: `{ "token": "sk-..." }`
pub fn post_token<A: UsageApi + 'static>(
    session: &Arc<Session<A>>,
    body: &str,
) -> Result<HttpResponse> {
    let req: TokenRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(e) => return Ok(error_response(400, &format!("invalid JSON in token request: {e}"))),
    };

    let result = session.submit_token(&req.token);
    let (status, resp) = cycle_response(result, session.view());
    json_response(status, &resp)
}

/// `DELETE /api/token` — forget the token and hide the dashboard.
pub fn delete_token<A: UsageApi + 'static>(session: &Arc<Session<A>>) -> Result<HttpResponse> {
    session.clear_token();
    json_response(
        200,
        &serde_json::json!({
            "success": true,
            "dashboard": session.view(),
        }),
    )
}

/// `POST /api/refresh` — run one fetch cycle now.
pub fn post_refresh<A: UsageApi + 'static>(session: &Arc<Session<A>>) -> Result<HttpResponse> {
    let result = session.refresh();
    let (status, resp) = cycle_response(result, session.view());
    json_response(status, &resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
