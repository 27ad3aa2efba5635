//! Track identity and metadata

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque track identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a track id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An enrolled track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Track identifier
    pub id: TrackId,

    /// Human-readable title
    pub title: Option<String>,

    /// File the track was enrolled from
    pub source_path: Option<PathBuf>,

    /// SHA-1 of the source file's contents (upper-case hex)
    pub file_digest: Option<String>,
}

impl TrackRecord {
    /// Record with an id and no metadata
    pub fn new(id: impl Into<TrackId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            source_path: None,
            file_digest: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the source path
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Set the file digest
    pub fn with_file_digest(mut self, digest: impl Into<String>) -> Self {
        self.file_digest = Some(digest.into());
        self
    }
}
