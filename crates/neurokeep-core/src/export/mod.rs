//! Event-log and patient-report exports.
//!
//! Every export carries [`ExportMetadata`] with a SHA-256 digest of its
//! content so a recipient can check the file they received.

mod events;
mod report;

pub use events::*;
pub use report::*;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::analytics::AnalyticsError;
use crate::clock::Clock;
use crate::db::{Database, DbError};

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

pub const EXPORT_FORMAT_VERSION: &str = "1.0";
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Export metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Export format version
    pub format_version: String,
    /// Local civil export time, `YYYY-MM-DD HH:MM:SS`
    pub exported_at: String,
    /// Hash algorithm used
    pub hash_algorithm: String,
    /// Hex digest of the exported content
    pub content_sha256: String,
}

impl ExportMetadata {
    pub fn for_content(content: &str, exported_at: NaiveDateTime) -> Self {
        Self {
            format_version: EXPORT_FORMAT_VERSION.to_string(),
            exported_at: exported_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            hash_algorithm: HASH_ALGORITHM.to_string(),
            content_sha256: sha256_hex(content.as_bytes()),
        }
    }

    /// Whether `content` matches the recorded digest.
    pub fn verify(&self, content: &str) -> bool {
        self.content_sha256 == sha256_hex(content.as_bytes())
    }
}

/// Exporter over the database, stamping exports with the clock's time.
pub struct Exporter<'a, C: ?Sized> {
    db: &'a Database,
    clock: &'a C,
}

impl<'a, C: Clock + ?Sized> Exporter<'a, C> {
    pub fn new(db: &'a Database, clock: &'a C) -> Self {
        Self { db, clock }
    }
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Escape a field for CSV output.
pub(crate) fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
