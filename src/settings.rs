//! Process-level settings, built once from flags and environment in the
//! driver and passed by reference to the generator and publisher.
//!
//! Validation mirrors what a run needs before any work starts: the config
//! file and styling directory must exist below the working root, and upload
//! credentials must be present unless uploading is skipped.

use crate::generate::GeneratorOptions;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const ENV_WORK_DIR: &str = "MD2PDF_WORK_DIR";
pub const ENV_CONFIG_FILE: &str = "MD2PDF_CONFIG_FILE";
pub const ENV_STYLING_DIR: &str = "MD2PDF_STYLING_DIR";
pub const ENV_SKIP_UPLOAD: &str = "MD2PDF_SKIP_UPLOAD";
pub const ENV_RENDERER_COMMAND: &str = "MD2PDF_RENDERER_COMMAND";
pub const ENV_NC_USER: &str = "NEXTCLOUD_USERNAME";
pub const ENV_NC_KEY: &str = "NEXTCLOUD_APP_ACCESS_KEY";
pub const ENV_NC_PATH: &str = "NEXTCLOUD_UPLOAD_PATH";

/// Credentials and location of the remote folder.
#[derive(Clone, PartialEq)]
pub struct UploadSettings {
    pub username: String,
    pub access_key: String,
    /// Full URL of the remote folder; manifest paths are appended verbatim.
    pub base_url: String,
}

impl std::fmt::Debug for UploadSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSettings")
            .field("username", &self.username)
            .field("access_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root_dir: PathBuf,
    pub config_file: PathBuf,
    pub styling_dir: PathBuf,
    pub renderer_command: Option<PathBuf>,
    /// `None` means uploading is skipped.
    pub upload: Option<UploadSettings>,
}

/// Raw, unvalidated inputs as they arrive from flags or environment.
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    pub root_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub styling_dir: Option<PathBuf>,
    pub skip_upload: bool,
    pub renderer_command: Option<PathBuf>,
    pub nc_user: Option<String>,
    pub nc_key: Option<String>,
    pub nc_path: Option<String>,
}

fn present_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|p| !p.as_os_str().is_empty())
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl Settings {
    /// Validates raw inputs. The working root defaults to the current
    /// directory.
    pub fn resolve(raw: RawSettings) -> Result<Self> {
        let root_dir = match present_path(raw.root_dir) {
            Some(root) => root,
            None => std::env::current_dir()?,
        };

        let Some(config_file) = present_path(raw.config_file) else {
            error!("Config file not given");
            bail!("ENV:{ENV_CONFIG_FILE} is required");
        };
        if !root_dir.join(&config_file).exists() {
            error!(config = %config_file.display(), "Config file does not exist");
            bail!("File in ENV:{ENV_CONFIG_FILE} must exist");
        }

        let Some(styling_dir) = present_path(raw.styling_dir) else {
            error!("Styling directory not given");
            bail!("ENV:{ENV_STYLING_DIR} is required");
        };
        if !root_dir.join(&styling_dir).is_dir() {
            error!(styling = %styling_dir.display(), "Styling directory does not exist");
            bail!("Dir in ENV:{ENV_STYLING_DIR} must exist");
        }

        let upload = if raw.skip_upload {
            None
        } else {
            Some(Self::resolve_upload(raw.nc_user, raw.nc_key, raw.nc_path)?)
        };

        let settings = Settings {
            root_dir,
            config_file,
            styling_dir,
            renderer_command: present_path(raw.renderer_command),
            upload,
        };
        info!(
            root = %settings.root_dir.display(),
            config = %settings.config_file.display(),
            styling = %settings.styling_dir.display(),
            skip_upload = settings.skip_upload(),
            "Settings resolved"
        );
        Ok(settings)
    }

    fn resolve_upload(
        user: Option<String>,
        key: Option<String>,
        path: Option<String>,
    ) -> Result<UploadSettings> {
        let Some(username) = present(user) else {
            bail!("ENV:{ENV_NC_USER} is required for uploading");
        };
        let Some(base_url) = present(path) else {
            bail!("ENV:{ENV_NC_PATH} is required for uploading");
        };
        let Some(access_key) = present(key) else {
            bail!("ENV:{ENV_NC_KEY} is required for uploading");
        };
        Ok(UploadSettings {
            username,
            access_key,
            base_url,
        })
    }

    pub fn skip_upload(&self) -> bool {
        self.upload.is_none()
    }

    /// Generator paths for a run staged in `generation_root`.
    pub fn generator_options(&self, generation_root: &Path) -> GeneratorOptions {
        GeneratorOptions {
            root_dir: self.root_dir.clone(),
            config_file: self.config_file.clone(),
            styling_dir: self.styling_dir.clone(),
            generation_root: generation_root.to_path_buf(),
        }
    }
}
