//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method gate, context extraction,
//! dispatch to static file serving, access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context for file serving
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// Infallible at the hyper boundary: every failure becomes a 4xx/5xx
/// response for this request only.
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    let method = req.method();
    let path = req.uri().path();
    let is_head = *method == Method::HEAD;

    let response = match check_http_method(method) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                path,
                is_head,
                range_header: header_value(&req, "range"),
            };
            static_files::serve(&ctx, &state).await
        }
    };

    if state.config.logging.access_log {
        let entry = access_entry(&req, remote_addr, &response, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Gate on HTTP method: only GET and HEAD reach the file server
///
/// OPTIONS is answered with the allowed set; anything else is rejected.
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Extract a header as an owned string, ignoring non-ASCII values
fn header_value(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Build the access log entry for a handled request
fn access_entry(
    req: &Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
    response: &Response<Full<Bytes>>,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_10 => "1.0".to_string(),
        Version::HTTP_2 => "2".to_string(),
        _ => "1.1".to_string(),
    };
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.referer = header_value(req, "referer");
    entry.user_agent = header_value(req, "user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_head_pass_the_gate() {
        assert!(check_http_method(&Method::GET).is_none());
        assert!(check_http_method(&Method::HEAD).is_none());
    }

    #[test]
    fn test_options_gets_allow_header() {
        let resp = check_http_method(&Method::OPTIONS).unwrap();
        assert_eq!(resp.status(), 204);
        assert_eq!(resp.headers()["Allow"], "GET, HEAD, OPTIONS");
    }

    #[test]
    fn test_mutating_methods_rejected() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let resp = check_http_method(&method).unwrap();
            assert_eq!(resp.status(), 405);
        }
    }
}
