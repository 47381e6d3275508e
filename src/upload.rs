#![doc = "HTTP uploader: the production `Uploader`, issuing authenticated PUT requests with a blocking reqwest client."]
//
//! # WebDAV client
//!
//! [`WebDavClient`] implements [`crate::contract::Uploader`] for Nextcloud
//! style WebDAV endpoints: one PUT per file, HTTP Basic authentication with a
//! user name and app access key, raw bytes as the body.
//!
//! - Construct it from [`crate::settings::UploadSettings`].
//! - Every HTTP status is returned to the caller; only connection, TLS and
//!   protocol failures are errors here.

use crate::contract::{BoxError, UploadRequest, UploadResponse, Uploader};
use crate::settings::UploadSettings;
use reqwest::blocking::{Client, Request};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error, info};

pub struct WebDavClient {
    client: Client,
    username: String,
    access_key: String,
}

impl WebDavClient {
    pub fn new(settings: &UploadSettings) -> Result<Self, BoxError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build HTTP client");
                e
            })?;
        info!(
            username = %settings.username,
            access_key_set = !settings.access_key.is_empty(),
            "Initialized WebDavClient"
        );
        Ok(Self {
            client,
            username: settings.username.clone(),
            access_key: settings.access_key.clone(),
        })
    }

    /// Builds the authenticated PUT without sending it.
    pub fn build_request(&self, request: UploadRequest) -> Result<Request, BoxError> {
        let built = self
            .client
            .put(request.target.as_str())
            .header(CONTENT_TYPE, request.content_type)
            .basic_auth(&self.username, Some(&self.access_key))
            .body(request.body)
            .build()?;
        Ok(built)
    }
}

impl Uploader for WebDavClient {
    fn put(&self, request: UploadRequest) -> Result<UploadResponse, BoxError> {
        let target = request.target.clone();
        let size = request.body.len();
        let http_request = self.build_request(request)?;
        debug!(target = %target, size, "Sending PUT");

        let response = self.client.execute(http_request).map_err(|e| {
            error!(error = ?e, target = %target, "PUT request failed");
            e
        })?;

        let status = response.status();
        Ok(UploadResponse {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("").to_string(),
        })
    }
}
