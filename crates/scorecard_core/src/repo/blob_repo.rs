//! JSON blob encoding on top of `KeyValueStore`.

use crate::storage::kv_store::{KeyValueStore, StorageError};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type BlobResult<T> = Result<T, BlobError>;

/// Failure reading or writing one JSON blob.
#[derive(Debug)]
pub enum BlobError {
    Storage(StorageError),
    Encode(serde_json::Error),
    Decode { key: String, source: serde_json::Error },
    /// Blob decoded but violates a model invariant.
    InvalidData { key: String, message: String },
}

impl Display for BlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode blob: {err}"),
            Self::Decode { key, source } => write!(f, "corrupt blob `{key}`: {source}"),
            Self::InvalidData { key, message } => write!(f, "invalid blob `{key}`: {message}"),
        }
    }
}

impl Error for BlobError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<StorageError> for BlobError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Outcome of a load that fell back to a default value.
#[derive(Debug)]
pub struct LoadIssue {
    pub key: &'static str,
    pub error: BlobError,
}

impl Display for LoadIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not load `{}`, using defaults: {}", self.key, self.error)
    }
}

/// Value produced by a never-failing load, plus the issue that forced a
/// fallback, if any.
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub issue: Option<LoadIssue>,
}

impl<T> Loaded<T> {
    pub fn clean(value: T) -> Self {
        Self { value, issue: None }
    }

    pub fn fallback(value: T, key: &'static str, error: BlobError) -> Self {
        warn!(
            "event=blob_load module=repo status=fallback key={} error={}",
            key, error
        );
        Self {
            value,
            issue: Some(LoadIssue { key, error }),
        }
    }
}

/// Reads and decodes the blob under `key`; `Ok(None)` when absent.
pub fn load_json<T, S>(store: &S, key: &str) -> BlobResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(blob) = store.get(key)? else {
        debug!("event=blob_load module=repo status=absent key={key}");
        return Ok(None);
    };
    let value = serde_json::from_str(&blob).map_err(|source| BlobError::Decode {
        key: key.to_string(),
        source,
    })?;
    debug!(
        "event=blob_load module=repo status=ok key={} bytes={}",
        key,
        blob.len()
    );
    Ok(Some(value))
}

/// Encodes `value` and writes it under `key`.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> BlobResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let started_at = Instant::now();
    let blob = serde_json::to_string(value).map_err(BlobError::Encode)?;
    if let Err(err) = store.set(key, &blob) {
        warn!(
            "event=blob_save module=repo status=error key={} bytes={} duration_ms={} error={}",
            key,
            blob.len(),
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err.into());
    }
    debug!(
        "event=blob_save module=repo status=ok key={} bytes={} duration_ms={}",
        key,
        blob.len(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}
