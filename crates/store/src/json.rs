use std::io::ErrorKind;
use std::path::Path;

use eyre::{Result, WrapErr};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// Why a document fell back to its default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultReason {
    Missing,
    Corrupt(String),
}

/// Outcome of reading a JSON document. Reads fail open: a missing or
/// unparseable file yields the type's default, tagged with the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult<T> {
    Loaded(T),
    Default { value: T, reason: DefaultReason },
}

impl<T> LoadResult<T> {
    pub fn into_inner(self) -> T {
        match self {
            LoadResult::Loaded(value) | LoadResult::Default { value, .. } => value,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, LoadResult::Default { .. })
    }
}

pub async fn load_json<T>(path: &Path) -> Result<LoadResult<T>>
where
    T: DeserializeOwned + Default,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} not found, using default", path.display());
            return Ok(LoadResult::Default {
                value: T::default(),
                reason: DefaultReason::Missing,
            });
        }
        Err(e) => return Err(e).wrap_err_with(|| format!("Failed to read {}", path.display())),
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(LoadResult::Loaded(value)),
        Err(e) => {
            warn!("{} is not valid JSON ({}), using default", path.display(), e);
            Ok(LoadResult::Default {
                value: T::default(),
                reason: DefaultReason::Corrupt(e.to_string()),
            })
        }
    }
}

/// Writes pretty-printed JSON through a temporary sibling file and a rename,
/// so readers never observe a half-written document.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }

    let bytes = serde_json::to_vec_pretty(value)
        .wrap_err_with(|| format!("Failed to serialize {}", path.display()))?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .wrap_err_with(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .wrap_err_with(|| format!("Failed to replace {}", path.display()))?;

    debug!("Wrote {}", path.display());
    Ok(())
}

/// Deletes a file, treating an already-missing file as success.
pub async fn remove_file(path: &Path) -> Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).wrap_err_with(|| format!("Failed to delete {}", path.display())),
    }
}
