//! Loads the document configuration file into an ordered list of groups.
//!
//! The top-level YAML value may be a single group, a sequence of groups, or
//! empty. Groups and documents keep file order; the generator relies on it.

use crate::error::{Error, Result};
use crate::metadata::Metadata;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// One group of documents sharing `default` metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Group {
    #[serde(default, deserialize_with = "null_as_default")]
    pub default: Metadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: Vec<Metadata>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The whole configuration file, normalised to a sequence of groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    pub groups: Vec<Group>,
}

impl ConfigDocument {
    pub fn document_count(&self) -> usize {
        self.groups.iter().map(|g| g.documents.len()).sum()
    }

    /// Parses YAML text. `path` is only used for error messages.
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self> {
        let fail = |reason: String| Error::ConfigLoad {
            path: path.to_path_buf(),
            reason,
        };

        let value: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| fail(format!("invalid YAML: {e}")))?;

        let raw_groups = match value {
            serde_yaml::Value::Null => Vec::new(),
            serde_yaml::Value::Sequence(items) => items,
            single @ serde_yaml::Value::Mapping(_) => vec![single],
            _ => {
                return Err(fail(
                    "top-level value must be a group or a list of groups".to_string(),
                ))
            }
        };

        let groups = raw_groups
            .into_iter()
            .enumerate()
            .map(|(index, raw)| match raw {
                serde_yaml::Value::Null => Ok(Group::default()),
                raw => serde_yaml::from_value::<Group>(raw)
                    .map_err(|e| fail(format!("group {index}: {e}"))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ConfigDocument { groups })
    }
}

/// Reads and parses the configuration file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConfigDocument> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let text = match fs::read_to_string(path_ref) {
        Ok(text) => text,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(Error::ConfigLoad {
                path: path_ref.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    match ConfigDocument::from_yaml(&text, path_ref) {
        Ok(config) => {
            info!(
                config_path = ?path_ref,
                groups = config.groups.len(),
                documents = config.document_count(),
                "Parsed config YAML successfully"
            );
            Ok(config)
        }
        Err(e) => {
            error!(error = %e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(e)
        }
    }
}
