use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = ".quickstream.json";

/// Saved stream destinations and encoder presets, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub urls: Vec<String>,
    // Older files stored presets under this key.
    #[serde(default, alias = "string")]
    pub presets: Vec<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed reading config at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed parsing config at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed serializing config")]
    Serialize(#[source] serde_json::Error),
    #[error("failed writing config at {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.quickstream.json`, or the working directory when no home is known.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty record, not an error.
    pub fn load(&self) -> Result<Record, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Record::default()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str::<Record>(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, record: &Record) -> Result<(), StoreError> {
        ensure_parent_dir(&self.path)?;
        let payload = serde_json::to_string_pretty(record).map_err(StoreError::Serialize)?;
        fs::write(&self.path, payload).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
