//! `RemoteArchiveStore` implementation for `WebDavArchive`.

use async_trait::async_trait;
use reqwest::Method;

use crate::error::{ArchiveError, Result};
use crate::http_client::HttpUtils;
use crate::traits::RemoteArchiveStore;

use super::multistatus::parse_multistatus;
use super::{BACKEND, WebDavArchive, dav_method, parent_collections};

impl WebDavArchive {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<crate::http_client::HttpResponse> {
        let request = self
            .request(Method::PUT, path)
            .header("Content-Type", "application/json")
            .body(bytes);
        HttpUtils::execute_request(request, BACKEND, "PUT", path).await
    }

    /// Create every missing parent collection of `path`.
    ///
    /// `405 Method Not Allowed` means the collection already exists.
    async fn ensure_parents(&self, path: &str) -> Result<()> {
        for collection in parent_collections(path) {
            let request = self.request(dav_method(b"MKCOL")?, &collection);
            let response =
                HttpUtils::execute_request(request, BACKEND, "MKCOL", &collection).await?;
            if !response.is_success() && response.status != 405 {
                return Err(HttpUtils::status_error(&response, BACKEND, &collection));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteArchiveStore for WebDavArchive {
    fn id(&self) -> &'static str {
        BACKEND
    }

    async fn test_connection(&self) -> Result<()> {
        let request = self.propfind("/", "0")?;
        let response = HttpUtils::execute_request(request, BACKEND, "PROPFIND", "/").await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(HttpUtils::status_error(&response, BACKEND, "/"))
        }
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<()> {
        let size = bytes.len();
        let mut response = self.put(path, bytes.clone()).await?;

        if response.status == 409 {
            log::debug!("[{BACKEND}] Parent collection missing for {path}, creating it");
            self.ensure_parents(path).await?;
            response = self.put(path, bytes).await?;
        }

        if !response.is_success() {
            return Err(HttpUtils::status_error(&response, BACKEND, path));
        }

        log::debug!("[{BACKEND}] Uploaded {size} bytes to {path}");
        Ok(())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let request = self.request(Method::GET, path);
        let response = HttpUtils::execute_request(request, BACKEND, "GET", path).await?;
        if !response.is_success() {
            return Err(HttpUtils::status_error(&response, BACKEND, path));
        }
        Ok(response.body)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let collection = if prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };

        let request = self.propfind(&collection, "1")?;
        let response =
            HttpUtils::execute_request(request, BACKEND, "PROPFIND", &collection).await?;

        if response.status == 404 {
            return Ok(Vec::new());
        }
        if !response.is_success() {
            return Err(HttpUtils::status_error(&response, BACKEND, &collection));
        }

        let body = String::from_utf8(response.body).map_err(|e| ArchiveError::ParseError {
            backend: BACKEND.to_string(),
            detail: format!("multistatus is not UTF-8: {e}"),
        })?;

        let names = parse_multistatus(&body, BACKEND)?
            .iter()
            .filter(|entry| !entry.is_collection)
            .filter_map(|entry| entry.file_name().map(str::to_string))
            .collect();
        Ok(names)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let request = self.request(Method::DELETE, path);
        let response = HttpUtils::execute_request(request, BACKEND, "DELETE", path).await?;
        if !response.is_success() {
            return Err(HttpUtils::status_error(&response, BACKEND, path));
        }
        Ok(())
    }
}
