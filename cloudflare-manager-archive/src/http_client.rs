//! Generic HTTP client tools
//!
//! Sends a prepared `RequestBuilder`, logs the exchange and turns transport failures and
//! non-success statuses into [`ArchiveError`] values. Backends build their own requests
//! (method, headers, body) and decide which statuses count as success for each call.
//!
//! There is deliberately no retry loop here: an archive call either completes or fails.

use reqwest::RequestBuilder;

use crate::error::ArchiveError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Raw HTTP response: status code plus body bytes.
#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as lossy UTF-8, for error messages and logs.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP tool function set
pub(crate) struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the status code and body.
    ///
    /// Only transport-level failures are errors here; status interpretation is left to
    /// [`HttpUtils::status_error`] so callers can accept e.g. `405` for `MKCOL`.
    ///
    /// # Arguments
    /// * `request_builder` - configured request constructor (URL, headers, body)
    /// * `backend` - backend name (for logging)
    /// * `method_name` - request method name (such as "PUT", "PROPFIND", used for logs)
    /// * `path` - archive path (for logging)
    pub async fn execute_request(
        request_builder: RequestBuilder,
        backend: &str,
        method_name: &str,
        path: &str,
    ) -> Result<HttpResponse, ArchiveError> {
        log::debug!("[{backend}] {method_name} {path}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ArchiveError::Timeout {
                    backend: backend.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ArchiveError::NetworkError {
                    backend: backend.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[{backend}] Response Status: {status}");

        let body = response
            .bytes()
            .await
            .map_err(|e| ArchiveError::NetworkError {
                backend: backend.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?
            .to_vec();

        let response = HttpResponse { status, body };
        if !response.is_success() {
            log::debug!(
                "[{backend}] Response Body: {}",
                truncate_for_log(&response.text())
            );
        }

        Ok(response)
    }

    /// Map a non-success response onto the archive error taxonomy.
    pub fn status_error(response: &HttpResponse, backend: &str, path: &str) -> ArchiveError {
        let body = response.text();
        let raw_message = (!body.trim().is_empty()).then(|| truncate_for_log(&body));

        match response.status {
            401 => ArchiveError::InvalidCredentials {
                backend: backend.to_string(),
                raw_message,
            },
            403 => ArchiveError::PermissionDenied {
                backend: backend.to_string(),
                path: path.to_string(),
            },
            404 => ArchiveError::NotFound {
                backend: backend.to_string(),
                path: path.to_string(),
            },
            status @ 500..=599 => ArchiveError::ServerError {
                backend: backend.to_string(),
                status,
                raw_message,
            },
            status => ArchiveError::Unknown {
                backend: backend.to_string(),
                status,
                raw_message: raw_message.unwrap_or_default(),
            },
        }
    }
}
