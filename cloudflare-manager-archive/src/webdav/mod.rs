//! WebDAV archive backend (HTTP Basic auth).

mod http;
mod multistatus;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};

use crate::error::{ArchiveError, Result};
use crate::types::ArchiveCredentials;

pub(crate) const BACKEND: &str = "webdav";

/// Per-request timeout. Calls are never retried, so this only bounds how long a caller waits.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:"><d:prop><d:resourcetype/></d:prop></d:propfind>"#;

/// WebDAV-backed [`RemoteArchiveStore`](crate::RemoteArchiveStore).
///
/// Operation mapping:
///
/// | operation | request |
/// |-----------|---------|
/// | `test_connection` | `PROPFIND` (`Depth: 0`) on the base URL |
/// | `upload` | `PUT`, with `MKCOL` of missing parents on `409 Conflict` |
/// | `download` | `GET` |
/// | `list` | `PROPFIND` (`Depth: 1`) on the prefix |
/// | `delete` | `DELETE` |
pub struct WebDavArchive {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl WebDavArchive {
    /// Create a client for the given credentials.
    ///
    /// Fails with [`ArchiveError::InvalidConfiguration`] when the base URL is not an
    /// absolute `http`/`https` URL or the username is empty.
    pub fn new(credentials: ArchiveCredentials) -> Result<Self> {
        let parsed = url::Url::parse(credentials.base_url.trim())
            .map_err(|e| invalid_config(format!("invalid base URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid_config(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }
        if credentials.username.trim().is_empty() {
            return Err(invalid_config("username must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| invalid_config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            username: credentials.username,
            password: credentials.password,
        })
    }

    /// Resolve an archive path against the base URL, percent-encoding each segment.
    pub(crate) fn url_for(&self, path: &str) -> String {
        let trailing_slash = path.ends_with('/') && path.len() > 1;
        let encoded: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();

        let mut url = format!("{}/{}", self.base_url, encoded.join("/"));
        if trailing_slash {
            url.push('/');
        }
        url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url_for(path))
            .basic_auth(&self.username, Some(&self.password))
    }

    fn propfind(&self, path: &str, depth: &'static str) -> Result<RequestBuilder> {
        Ok(self
            .request(dav_method(b"PROPFIND")?, path)
            .header("Depth", depth)
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(PROPFIND_BODY))
    }
}

fn dav_method(name: &'static [u8]) -> Result<Method> {
    Method::from_bytes(name).map_err(|e| invalid_config(format!("invalid HTTP method: {e}")))
}

fn invalid_config(detail: String) -> ArchiveError {
    ArchiveError::InvalidConfiguration {
        backend: BACKEND.to_string(),
        detail,
    }
}

/// Parent collection paths of `path`, outermost first (`/a/b/c.json` → `/a/`, `/a/b/`).
fn parent_collections(path: &str) -> Vec<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((_, parents)) = segments.split_last() else {
        return Vec::new();
    };

    let mut acc = String::from("/");
    parents
        .iter()
        .map(|segment| {
            acc.push_str(segment);
            acc.push('/');
            acc.clone()
        })
        .collect()
}
