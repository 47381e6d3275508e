//! Publishing: upload every generated artifact, in manifest order, to the
//! remote base URL.
//!
//! Uploads are sequential. The first failure ends the run; files uploaded
//! before it stay uploaded.

use crate::contract::{UploadRequest, Uploader};
use crate::error::{Error, Result};
use crate::generate::Manifest;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Everything except RFC 2396 unreserved and reserved characters is escaped.
/// `%` itself is escaped too, so already-encoded input is encoded again.
const URI_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'[')
    .remove(b']');

/// Remote URL for a manifest entry: plain concatenation, then encoding.
pub fn remote_target(base_url: &str, relative: &str) -> String {
    utf8_percent_encode(&format!("{base_url}{relative}"), URI_ESCAPE).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedItem {
    pub path: String,
    pub target: String,
    pub status: u16,
}

/// What was uploaded, in upload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishReport {
    pub items: Vec<PublishedItem>,
}

pub struct Publisher<'a, U: Uploader + ?Sized> {
    uploader: &'a U,
    generation_root: PathBuf,
    base_url: String,
}

impl<'a, U: Uploader + ?Sized> Publisher<'a, U> {
    pub fn new(uploader: &'a U, generation_root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            uploader,
            generation_root: generation_root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn run(&self, manifest: &Manifest) -> Result<PublishReport> {
        info!(count = manifest.len(), "[PUBLISH] Starting upload");
        let mut report = PublishReport::default();
        for path in manifest {
            report.items.push(self.upload(path)?);
        }
        info!(uploaded = report.items.len(), "[PUBLISH] Upload complete");
        Ok(report)
    }

    fn upload(&self, path: &str) -> Result<PublishedItem> {
        let local = self.generation_root.join(path.trim_start_matches(['/', '\\']));
        let target = remote_target(&self.base_url, path);
        info!(from = %local.display(), to = %target, "[PUBLISH] Uploading");

        let body = read_artifact(&local)?;
        let request = UploadRequest {
            target: target.clone(),
            content_type: PDF_MIME_TYPE,
            body,
        };

        let response = self.uploader.put(request).map_err(|e| {
            error!(target = %target, error = %e, "[PUBLISH] Transport failure");
            Error::Transport {
                target: target.clone(),
                message: e.to_string(),
            }
        })?;

        if response.status >= 400 {
            error!(
                target = %target,
                status = response.status,
                message = %response.message,
                "[PUBLISH] Upload rejected"
            );
            return Err(Error::Upload {
                status: response.status,
                message: response.message,
            });
        }

        info!(status = response.status, message = %response.message, "[PUBLISH] => Response");
        Ok(PublishedItem {
            path: path.to_string(),
            target,
            status: response.status,
        })
    }
}

fn read_artifact(local: &Path) -> Result<Vec<u8>> {
    fs::read(local).map_err(|e| {
        error!(path = %local.display(), error = ?e, "[PUBLISH] Failed to read generated file");
        Error::io(local, e)
    })
}
