//! Error types for the caskwrap installer.
//!
//! Configuration problems are reported before any file is touched; I/O
//! failures carry the path that could not be written so the caller can report
//! which artefact failed.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or installing exec-script
/// artefacts.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// An artefact option was rejected at construction time.
    #[error("invalid exec_script configuration: {reason}")]
    InvalidConfiguration {
        /// Name of the offending option (`wrapper`, `target`, `source`).
        field: &'static str,
        /// Description of the problem.
        reason: String,
    },

    /// The wrapper script could not be written.
    #[error("failed to write wrapper script {path}")]
    WrapperWrite {
        /// Path of the wrapper script.
        path: Utf8PathBuf,
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// The binary installer could not expose an executable.
    #[error("failed to install {name}: {reason}")]
    BinaryInstall {
        /// Name the executable was to be exposed under.
        name: String,
        /// Description of the failure.
        reason: String,
    },

    /// No directory was available to place executables in.
    #[error("could not determine a bin directory; pass --bin-dir")]
    BinDirUnavailable,

    /// The manifest file could not be read.
    #[error("failed to read manifest {path}")]
    ManifestRead {
        /// Path of the manifest.
        path: Utf8PathBuf,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file could not be parsed.
    #[error("invalid manifest {path}: {reason}")]
    InvalidManifest {
        /// Path of the manifest.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    /// Returns `true` for errors raised while validating configuration.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
