//! Semantic wrapper for bare file names.
//!
//! Wrapper script names and installed executable names are always single path
//! components. [`FileName`] carries that guarantee through the installer so it
//! is checked once, when the artefact is constructed.

use crate::error::{InstallerError, Result};
use std::fmt;

/// A single path component such as `tool` or `tool.wrapper.sh`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    /// Validate `value` as a bare file name for the option `field`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidConfiguration`] if the value contains
    /// a path separator, is empty, or is `.` or `..`.
    ///
    /// # Examples
    ///
    /// ```
    /// use caskwrap::file_name::FileName;
    ///
    /// assert!(FileName::parse("target", "tool").is_ok());
    /// assert!(FileName::parse("target", "a/b").is_err());
    /// ```
    pub fn parse(field: &'static str, value: &str) -> Result<Self> {
        if value.contains('/') {
            return Err(InstallerError::InvalidConfiguration {
                field,
                reason: format!("`{field}` must be a file name instead of a path"),
            });
        }
        if value.is_empty() || value == "." || value == ".." {
            return Err(InstallerError::InvalidConfiguration {
                field,
                reason: format!("`{field}` must be a non-empty file name, got {value:?}"),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Get the file name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
