//! Side-effect ports injected into the session orchestrator: where session
//! cookies live between runs, and where diagnostic captures go.

use std::path::{Path, PathBuf};

use crate::error::PortError;

pub trait CredentialStore: Send + Sync {
    /// The stored blob, or `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`PortError`] if stored material exists but cannot be read.
    fn load(&self) -> Result<Option<Vec<u8>>, PortError>;

    /// # Errors
    ///
    /// Returns [`PortError`] if the blob cannot be written.
    fn save(&self, blob: &[u8]) -> Result<(), PortError>;
}

pub trait DiagnosticsSink: Send + Sync {
    /// Record one capture for `category`, returning where it was kept.
    ///
    /// # Errors
    ///
    /// Returns [`PortError`] if the capture cannot be written.
    fn record(&self, category: &str, label: &str, capture: &[u8]) -> Result<PathBuf, PortError>;
}

/// Credential blob kept in a single file, e.g. a browser cookie export.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Vec<u8>>, PortError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&self, blob: &[u8]) -> Result<(), PortError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PortError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, blob).map_err(|e| PortError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Writes captures as `<dir>/<category>_<label>_<UTC timestamp>.png`.
#[derive(Debug, Clone)]
pub struct FileDiagnosticsSink {
    dir: PathBuf,
}

impl FileDiagnosticsSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DiagnosticsSink for FileDiagnosticsSink {
    fn record(&self, category: &str, label: &str, capture: &[u8]) -> Result<PathBuf, PortError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| PortError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let path = self.dir.join(format!("{category}_{label}_{stamp}.png"));
        std::fs::write(&path, capture).map_err(|e| PortError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

/// Discards every capture.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl DiagnosticsSink for NoopDiagnostics {
    fn record(&self, _category: &str, _label: &str, _capture: &[u8]) -> Result<PathBuf, PortError> {
        Ok(PathBuf::new())
    }
}
