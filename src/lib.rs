#![doc = "md2pdf: render configured Markdown documents to PDF and publish them."]

//! A YAML configuration describes groups of documents. Each document names a
//! Markdown source, a style profile and a destination, plus free-form
//! metadata inherited from its group. The [`generate`] pipeline merges that
//! metadata into each source's front matter and renders it; [`publish`] then
//! uploads the results in order.
//!
//! # Navigation
//! - Pipeline entrypoints: [`generate::Generator`], [`publish::Publisher`]
//! - Collaborator traits: [`contract::Renderer`], [`contract::Uploader`]
//! - Driver: [`cli::run`]

pub mod cli;
pub mod contract;
pub mod error;
pub mod front_matter;
pub mod generate;
pub mod load_config;
pub mod metadata;
pub mod publish;
pub mod render;
pub mod settings;
pub mod upload;

pub use cli::{run, Cli};
pub use error::{Error, Result};
