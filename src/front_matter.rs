//! Front matter handling: split an embedded YAML header off a Markdown
//! document and write a new header carrying merged metadata.

use crate::error::{Error, Result};
use crate::metadata::{overlay, Metadata};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?sm)\A\x{FEFF}?---[ \t]*\r?\n(.*?)(?:\r?\n)?^(?:---|\.\.\.)[ \t]*(?:\r?\n|\z)")
            .expect("front matter pattern is valid")
    })
}

/// Splits `content` into its header metadata and body.
///
/// A document without a header yields an empty map and the whole content as
/// body. Blank lines between the header terminator and the first body line
/// belong to the separator, not the body.
pub fn split(content: &str) -> Result<(Metadata, &str)> {
    let Some(caps) = header_pattern().captures(content) else {
        return Ok((Metadata::new(), content));
    };
    let whole = caps.get(0).map_or(0..0, |m| m.range());
    let raw_header = caps.get(1).map_or("", |m| m.as_str());
    let body = content[whole.end..].trim_start_matches(['\r', '\n']);

    let header = parse_header(raw_header)?;
    debug!(keys = header.len(), "Parsed embedded front matter");
    Ok((header, body))
}

fn parse_header(raw: &str) -> Result<Metadata> {
    if raw.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value: serde_yaml::Value =
        serde_yaml::from_str(raw).map_err(|e| Error::MalformedHeader(e.to_string()))?;
    match value {
        serde_yaml::Value::Null => Ok(Metadata::new()),
        serde_yaml::Value::Mapping(_) => {
            serde_yaml::from_value(value).map_err(|e| Error::MalformedHeader(e.to_string()))
        }
        other => Err(Error::MalformedHeader(format!(
            "expected a key/value mapping, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Renders `header` as a front matter block followed by `body`.
pub fn compose(header: &Metadata, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(header).map_err(|e| Error::MalformedHeader(e.to_string()))?;
    Ok(format!("---\n{yaml}---\n\n{body}"))
}

/// Overlays `extra` on the document's own header and rewrites the document.
///
/// Keys in `extra` win over identically named header keys; header-only keys
/// are kept as they were.
pub fn merge(content: &str, extra: &Metadata) -> Result<String> {
    merge_excluding(content, extra, &[])
}

/// Like [`merge`], then drops `excluded` keys from the resulting header
/// wherever they came from.
pub fn merge_excluding(content: &str, extra: &Metadata, excluded: &[&str]) -> Result<String> {
    let (existing, body) = split(content)?;
    let mut header = overlay(&existing, extra);
    for key in excluded {
        header.shift_remove(*key);
    }
    compose(&header, body)
}
