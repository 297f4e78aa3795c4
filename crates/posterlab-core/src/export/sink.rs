//! Download sinks.
//!
//! A sink receives the finished artifact and a suggested filename; where the
//! bytes end up is its own business.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ExportArtifact;

/// Errors a sink can report.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The filename cannot be used as given.
    #[error("Invalid download filename: {0:?}")]
    InvalidFilename(String),

    /// Writing the artifact failed.
    #[error("Failed to save {filename}: {message}")]
    Write { filename: String, message: String },
}

/// Destination for exported files.
pub trait DownloadSink {
    fn save(&mut self, artifact: &ExportArtifact) -> Result<(), SinkError>;
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Vec<ExportArtifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &[ExportArtifact] {
        &self.artifacts
    }

    pub fn last(&self) -> Option<&ExportArtifact> {
        self.artifacts.last()
    }
}

impl DownloadSink for MemorySink {
    fn save(&mut self, artifact: &ExportArtifact) -> Result<(), SinkError> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

/// Writes artifacts into a directory, one file per export.
///
/// Existing files with the same name are overwritten.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, artifact: &ExportArtifact) -> Result<(), SinkError> {
        let name = artifact.filename.as_str();
        let plain = Path::new(name)
            .file_name()
            .is_some_and(|file| file == name && name != "." && name != "..");
        if !plain {
            return Err(SinkError::InvalidFilename(name.to_string()));
        }

        let path = self.root.join(name);
        fs::write(&path, &artifact.bytes).map_err(|e| SinkError::Write {
            filename: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
