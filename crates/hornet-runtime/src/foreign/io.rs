//! Host environment access for foreign procedures
//!
//! Procedures never reach the network directly. They go through the
//! [`HostIo`] the registry was built with, so the embedding application
//! decides what a solver program may touch.

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Request timeout for [`HttpIo`]
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Host I/O failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IoError {
    #[error("Permission denied: network access to {0}")]
    PermissionDenied(String),

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
}

/// Synchronous host environment surface
pub trait HostIo: Send + Sync {
    /// Fetch `url` with the HTTP `method` and return the response body
    fn fetch(&self, url: &str, method: &str) -> Result<String, IoError>;
}

/// Rejects every request
#[derive(Debug, Default, Clone, Copy)]
pub struct DeniedIo;

impl HostIo for DeniedIo {
    fn fetch(&self, url: &str, _method: &str) -> Result<String, IoError> {
        Err(IoError::PermissionDenied(url.to_string()))
    }
}

/// Network access through a blocking HTTP client
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpIo;

impl HostIo for HttpIo {
    fn fetch(&self, url: &str, method: &str) -> Result<String, IoError> {
        let method = method.to_ascii_uppercase();
        if !matches!(method.as_str(), "GET" | "POST" | "PUT" | "DELETE" | "PATCH") {
            return Err(IoError::UnsupportedMethod(method));
        }
        debug!(url, method = %method, "fetch");

        // The blocking client owns an internal runtime and refuses to run
        // on a thread that is already driving one.
        std::thread::scope(|scope| {
            scope
                .spawn(|| send(url, &method))
                .join()
                .unwrap_or_else(|_| {
                    Err(IoError::Request {
                        url: url.to_string(),
                        reason: "request thread panicked".to_string(),
                    })
                })
        })
    }
}

fn send(url: &str, method: &str) -> Result<String, IoError> {
    let failed = |reason: String| IoError::Request {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| failed(format!("failed to create client: {}", e)))?;

    let request = match method {
        "GET" => client.get(url),
        "POST" => client.post(url),
        "PUT" => client.put(url),
        "DELETE" => client.delete(url),
        "PATCH" => client.patch(url),
        other => return Err(IoError::UnsupportedMethod(other.to_string())),
    };

    let response = request.send().map_err(|e| {
        if e.is_timeout() {
            failed(format!("timeout after {} seconds", FETCH_TIMEOUT.as_secs()))
        } else if e.is_connect() {
            failed(format!("connection error: {}", e))
        } else {
            failed(format!("network error: {}", e))
        }
    })?;

    response
        .text()
        .map_err(|e| failed(format!("failed to read response body: {}", e)))
}
