//! Embedded web dashboard.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page dashboard (token form, service strip, rate cards, chart)
//! - JSON endpoints over the shared [`Session`]
//!
//! The session does all polling of the remote service; the page only mirrors
//! the session's view and forwards user actions.
//!
//! Launched via `mapledash serve` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::{Cursor, Read};
use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::api::UsageApi;
use crate::logging;
use crate::session::Session;

pub(crate) type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread and handles requests sequentially. Errors are
/// answered per request without stopping the server.
pub fn serve<A: UsageApi + 'static>(session: Arc<Session<A>>, addr: &str, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("mapledash dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");
    logging::info(&format!("web dashboard listening on {addr}"));

    if open {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            logging::warn(&format!("could not open browser: {e}"));
        }
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let resp = dispatch(&session, &method, &url, body.as_deref()).unwrap_or_else(|e| {
            logging::error(&format!("{method} {url} failed: {e:#}"));
            api::error_response(500, &e.to_string())
        });

        let status = resp.status_code().0;
        let _ = request.respond(resp);
        logging::debug(&format!("{method} {url} {status}"));
    }

    session.shutdown();
    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub(crate) fn dispatch<A: UsageApi + 'static>(
    session: &Arc<Session<A>>,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<HttpResponse> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // Dashboard state
        (&Method::Get, "/api/dashboard") => api::get_dashboard(session),
        (&Method::Get, "/api/status") => api::get_status(session),

        // User actions
        (&Method::Post, "/api/token") => api::post_token(session, body.unwrap_or("{}")),
        (&Method::Delete, "/api/token") => api::delete_token(session),
        (&Method::Post, "/api/refresh") => api::post_refresh(session),

        // 404
        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> HttpResponse {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 404 response.
fn not_found() -> HttpResponse {
    api::error_response(404, "not found")
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8")
        .expect("static header is valid")
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").expect("static header is valid")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
