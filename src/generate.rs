//! Generation pipeline: resolve every configured document and render it into
//! the generation root.
//!
//! Groups and documents are processed strictly in file order. The first
//! failing document aborts the run; nothing after it is touched. The
//! [`Manifest`] of generated destinations is folded over the entries and only
//! handed back when every document succeeded.

use crate::contract::{RenderJob, Renderer};
use crate::error::{Error, Result};
use crate::front_matter;
use crate::load_config::{load_config, ConfigDocument, Group};
use crate::metadata::{describe, overlay, Metadata};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Extension of style profile files inside the styling directory.
pub const STYLE_EXTENSION: &str = "yml";

pub const STYLING_KEY: &str = "styling";
pub const SOURCE_KEY: &str = "source";
pub const DESTINATION_KEY: &str = "destination";

/// Keys consumed by the generator. They never reach a rendered header, even
/// when the source document declares them itself.
pub const CONTROL_KEYS: [&str; 3] = [STYLING_KEY, SOURCE_KEY, DESTINATION_KEY];

/// Ordered list of destinations (relative to the generation root) that were
/// rendered successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the manifest with `destination` appended.
    pub fn with(mut self, destination: String) -> Self {
        self.entries.push(destination);
        self
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<Vec<String>> for Manifest {
    fn from(entries: Vec<String>) -> Self {
        Self { entries }
    }
}

/// Where the generator reads from and writes to.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Working root; `source` entries are relative to it.
    pub root_dir: PathBuf,
    /// Configuration file, resolved against `root_dir`.
    pub config_file: PathBuf,
    /// Styling directory, resolved against `root_dir`.
    pub styling_dir: PathBuf,
    /// Fresh per-run staging directory; `destination` entries are relative to it.
    pub generation_root: PathBuf,
}

impl GeneratorOptions {
    pub fn config_path(&self) -> PathBuf {
        self.root_dir.join(&self.config_file)
    }

    pub fn styling_path(&self) -> PathBuf {
        self.root_dir.join(&self.styling_dir)
    }
}

/// A document entry with its control keys resolved to paths and removed from
/// the metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    pub style_path: PathBuf,
    pub source_path: PathBuf,
    pub destination: String,
    pub destination_path: PathBuf,
    pub metadata: Metadata,
}

pub struct Generator<'a, R: Renderer + ?Sized> {
    options: GeneratorOptions,
    renderer: &'a R,
}

impl<'a, R: Renderer + ?Sized> Generator<'a, R> {
    pub fn new(options: GeneratorOptions, renderer: &'a R) -> Self {
        Self { options, renderer }
    }

    /// Loads the configuration file and renders every document in it.
    pub fn run(&self) -> Result<Manifest> {
        let config = load_config(self.options.config_path())?;
        self.generate(&config)
    }

    /// Renders every document of an already loaded configuration.
    pub fn generate(&self, config: &ConfigDocument) -> Result<Manifest> {
        info!(
            groups = config.groups.len(),
            generation_root = %self.options.generation_root.display(),
            "[GENERATE] Starting generation"
        );
        let manifest = config
            .groups
            .iter()
            .try_fold(Manifest::new(), |manifest, group| {
                self.convert_group(group, manifest)
            })?;
        info!(generated = manifest.len(), "[GENERATE] Generation complete");
        Ok(manifest)
    }

    fn convert_group(&self, group: &Group, manifest: Manifest) -> Result<Manifest> {
        debug!(
            documents = group.documents.len(),
            default_keys = group.default.len(),
            "[GENERATE] Converting group"
        );
        group.documents.iter().try_fold(manifest, |manifest, entry| {
            let destination = self.convert_entry(entry, &group.default)?;
            Ok(manifest.with(destination))
        })
    }

    /// Renders one document and returns its destination relative to the
    /// generation root.
    pub fn convert_entry(&self, entry: &Metadata, default: &Metadata) -> Result<String> {
        let resolved = self.resolve_entry(entry, default)?;

        if let Some(parent) = resolved.destination_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        self.convert_doc(&resolved)?;
        Ok(resolved.destination)
    }

    /// Merges `default` with `entry` and resolves the control keys.
    ///
    /// Only checks for existence of the style and source files; nothing is
    /// created or written here.
    pub fn resolve_entry(&self, entry: &Metadata, default: &Metadata) -> Result<ResolvedEntry> {
        let mut doc = overlay(default, entry);
        let describe_entry = || describe(entry);

        let styling = take_control(&mut doc, STYLING_KEY).ok_or_else(|| {
            error!(entry = %describe_entry(), "[GENERATE] Entry has no styling");
            Error::MissingStyling {
                entry: describe_entry(),
            }
        })?;
        let style_path = self
            .options
            .styling_path()
            .join(format!("{styling}.{STYLE_EXTENSION}"));
        if !style_path.exists() {
            error!(path = %style_path.display(), "[GENERATE] Styling file not found");
            return Err(Error::StylingNotFound {
                path: style_path,
                entry: describe_entry(),
            });
        }

        let source = take_control(&mut doc, SOURCE_KEY).ok_or_else(|| {
            error!(entry = %describe_entry(), "[GENERATE] Entry has no source");
            Error::MissingSource {
                entry: describe_entry(),
            }
        })?;
        let source_path = join_relative(&self.options.root_dir, &source);
        if !source_path.exists() {
            error!(path = %source_path.display(), "[GENERATE] Source file not found");
            return Err(Error::SourceNotFound {
                path: source_path,
                entry: describe_entry(),
            });
        }

        let destination = take_control(&mut doc, DESTINATION_KEY).ok_or_else(|| {
            error!(entry = %describe_entry(), "[GENERATE] Entry has no destination");
            Error::MissingDestination {
                entry: describe_entry(),
            }
        })?;
        let destination_path = join_relative(&self.options.generation_root, &destination);

        Ok(ResolvedEntry {
            style_path,
            source_path,
            destination,
            destination_path,
            metadata: doc,
        })
    }

    fn convert_doc(&self, resolved: &ResolvedEntry) -> Result<()> {
        info!(
            from = %resolved.source_path.display(),
            with = %resolved.style_path.display(),
            to = %resolved.destination_path.display(),
            "[GENERATE] Generating pdf"
        );

        let markdown = fs::read_to_string(&resolved.source_path)
            .map_err(|e| Error::io(&resolved.source_path, e))?;
        let content = front_matter::merge_excluding(&markdown, &resolved.metadata, &CONTROL_KEYS)?;

        let job = RenderJob {
            content,
            style_path: resolved.style_path.clone(),
            asset_base: resolved
                .source_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            destination: resolved.destination_path.clone(),
        };

        self.renderer.render(&job).map_err(|e| {
            error!(
                destination = %resolved.destination_path.display(),
                error = %e,
                "[GENERATE] Renderer failed"
            );
            Error::Render {
                destination: resolved.destination_path.clone(),
                message: e.to_string(),
            }
        })
    }
}

/// Removes `key` and returns its scalar value. A key holding null or a
/// collection is removed as well and counts as missing.
fn take_control(doc: &mut Metadata, key: &str) -> Option<String> {
    doc.shift_remove(key)
        .and_then(|value| value.as_scalar_string())
}

/// Joins a configuration-declared path below `base`, treating leading
/// separators as relative.
fn join_relative(base: &Path, declared: &str) -> PathBuf {
    base.join(declared.trim_start_matches(['/', '\\']))
}
