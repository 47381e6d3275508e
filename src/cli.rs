//!
//! Command-line driver for md2pdf: flag and environment parsing, settings
//! validation, and the generate-then-publish sequence.
//!
//! All document logic lives in [`crate::generate`] and [`crate::publish`];
//! this module only wires concrete collaborators to them.
//!
//! - For command-line users: run the `md2pdf` binary with `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`],
//!   or [`execute`] with resolved [`Settings`] and your own collaborators.
use crate::contract::{Renderer, Uploader};
use crate::generate::{Generator, Manifest};
use crate::publish::Publisher;
use crate::render::{CommandRenderer, PdfRenderer};
use crate::settings::{RawSettings, Settings};
use crate::upload::WebDavClient;
use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

/// Prefix of the per-run staging directory.
pub const GENERATION_ROOT_PREFIX: &str = "md2pdf-generated";

/// CLI for md2pdf: render configured Markdown documents to PDF and upload them.
#[derive(Parser, Debug, Default)]
#[clap(
    name = "md2pdf",
    version,
    about = "Render configured Markdown documents to PDF and publish them to Nextcloud"
)]
pub struct Cli {
    /// The root folder for relative paths
    #[clap(short = 'r', long = "root", env = "MD2PDF_WORK_DIR")]
    pub root: Option<String>,

    /// The config file for the run (relative to root)
    #[clap(short = 'c', long = "config", env = "MD2PDF_CONFIG_FILE")]
    pub config: Option<String>,

    /// The folder from where styling files are loaded (relative to root)
    #[clap(short = 's', long = "styling", env = "MD2PDF_STYLING_DIR")]
    pub styling: Option<String>,

    /// Skip the upload, e.g. for testing
    #[clap(
        short = 't',
        long = "skip-upload",
        env = "MD2PDF_SKIP_UPLOAD",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub skip_upload: bool,

    /// The Nextcloud user to upload with
    #[clap(long = "nc-user", env = "NEXTCLOUD_USERNAME")]
    pub nc_user: Option<String>,

    /// The Nextcloud app access key to upload with
    #[clap(long = "nc-key", env = "NEXTCLOUD_APP_ACCESS_KEY", hide_env_values = true)]
    pub nc_key: Option<String>,

    /// The full URL and path of the Nextcloud folder to upload to
    #[clap(long = "nc-path", env = "NEXTCLOUD_UPLOAD_PATH")]
    pub nc_path: Option<String>,

    /// External Markdown-to-PDF program; the built-in renderer is used if unset
    #[clap(long = "renderer-command", env = "MD2PDF_RENDERER_COMMAND")]
    pub renderer_command: Option<String>,
}

impl Cli {
    pub fn into_raw(self) -> RawSettings {
        RawSettings {
            root_dir: self.root.map(PathBuf::from),
            config_file: self.config.map(PathBuf::from),
            styling_dir: self.styling.map(PathBuf::from),
            skip_upload: self.skip_upload,
            renderer_command: self.renderer_command.map(PathBuf::from),
            nc_user: self.nc_user,
            nc_key: self.nc_key,
            nc_path: self.nc_path,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub generation_root: PathBuf,
    pub manifest: Manifest,
    /// Number of uploaded files; zero when publishing was skipped.
    pub uploaded: usize,
}

/// Entrypoint for main() and integration tests: resolves settings, creates
/// the generation root and runs the pipeline with the real collaborators.
pub fn run(cli: Cli) -> Result<RunSummary> {
    tracing::info!("trace_initialised");

    let settings = Settings::resolve(cli.into_raw())?;

    let generation_root = tempfile::Builder::new()
        .prefix(GENERATION_ROOT_PREFIX)
        .tempdir()
        .context("failed to create generation root")?
        .keep();

    let renderer: Box<dyn Renderer> = match &settings.renderer_command {
        Some(program) => Box::new(CommandRenderer::new(program)),
        None => Box::new(PdfRenderer::new()),
    };

    let client = match &settings.upload {
        Some(upload) => Some(
            WebDavClient::new(upload)
                .map_err(|e| anyhow::anyhow!("failed to construct uploader: {e}"))?,
        ),
        None => None,
    };

    execute(
        &settings,
        &generation_root,
        renderer.as_ref(),
        client.as_ref().map(|c| c as &dyn Uploader),
    )
}

/// Generates every document into `generation_root`, then publishes the
/// manifest unless uploading is skipped or nothing was generated.
pub fn execute(
    settings: &Settings,
    generation_root: &Path,
    renderer: &dyn Renderer,
    uploader: Option<&dyn Uploader>,
) -> Result<RunSummary> {
    let generator = Generator::new(settings.generator_options(generation_root), renderer);
    let manifest = generator.run()?;
    tracing::info!(command = "generate", generated = manifest.len(), "Generation finished");

    let uploaded = match (&settings.upload, uploader) {
        (Some(upload), Some(uploader)) if !manifest.is_empty() => {
            let publisher = Publisher::new(uploader, generation_root, upload.base_url.as_str());
            publisher.run(&manifest)?.items.len()
        }
        (Some(_), None) if !manifest.is_empty() => {
            tracing::error!(generated = manifest.len(), "Upload configured but no uploader given");
            anyhow::bail!("upload is configured but no uploader was provided");
        }
        _ => {
            tracing::info!(
                skip_upload = settings.skip_upload(),
                generated = manifest.len(),
                "publish_skipped"
            );
            0
        }
    };

    Ok(RunSummary {
        generation_root: generation_root.to_path_buf(),
        manifest,
        uploaded,
    })
}
