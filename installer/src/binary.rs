//! Executable installation into a bin directory.
//!
//! [`BinaryInstaller`] is the capability exec-script artefacts delegate to once
//! their wrapper is on disk. [`BinDirInstaller`] is the stock implementation:
//! it marks the file executable and links it into a directory, which is
//! usually on `PATH`.

use crate::error::{InstallerError, Result};
use crate::file_name::FileName;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Installs and removes files as named executables.
#[cfg_attr(test, mockall::automock)]
pub trait BinaryInstaller {
    /// Make `source` executable and reachable as `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be made executable or exposed.
    fn install_executable(&self, source: &Utf8Path, name: &FileName) -> Result<()>;

    /// Undo [`BinaryInstaller::install_executable`] for the same pair.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing entry cannot be removed.
    fn uninstall_executable(&self, source: &Utf8Path, name: &FileName) -> Result<()>;
}

/// Links executables into a single directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinDirInstaller {
    bin_dir: Utf8PathBuf,
}

impl BinDirInstaller {
    /// Create an installer that links into `bin_dir`.
    #[must_use]
    pub fn new(bin_dir: Utf8PathBuf) -> Self {
        Self { bin_dir }
    }

    /// Return the directory executables are linked into.
    #[must_use]
    pub fn bin_dir(&self) -> &Utf8Path {
        &self.bin_dir
    }

    /// Return the path `name` is exposed at.
    #[must_use]
    pub fn link_path(&self, name: &FileName) -> Utf8PathBuf {
        self.bin_dir.join(name.as_str())
    }

    /// Returns `true` if the bin directory is listed in `PATH`.
    #[must_use]
    pub fn in_path(&self) -> bool {
        is_directory_in_path(self.bin_dir.as_std_path())
    }
}

impl BinaryInstaller for BinDirInstaller {
    fn install_executable(&self, source: &Utf8Path, name: &FileName) -> Result<()> {
        make_executable(source).map_err(|e| InstallerError::BinaryInstall {
            name: name.to_string(),
            reason: format!("failed to set permissions on {source}: {e}"),
        })?;

        fs::create_dir_all(&self.bin_dir).map_err(|e| InstallerError::BinaryInstall {
            name: name.to_string(),
            reason: format!("failed to create {}: {e}", self.bin_dir),
        })?;

        let link = self.link_path(name);
        match fs::symlink_metadata(&link) {
            Ok(meta) if meta.file_type().is_symlink() => {
                debug!("replacing existing link {link}");
                fs::remove_file(&link)?;
            }
            Ok(_) => {
                return Err(InstallerError::BinaryInstall {
                    name: name.to_string(),
                    reason: format!("{link} already exists and is not a symlink"),
                });
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        debug!("linking {link} -> {source}");
        create_symlink(source, &link).map_err(|e| InstallerError::BinaryInstall {
            name: name.to_string(),
            reason: format!("failed to link {link}: {e}"),
        })
    }

    fn uninstall_executable(&self, source: &Utf8Path, name: &FileName) -> Result<()> {
        let link = self.link_path(name);
        match fs::read_link(&link) {
            Ok(dest) if dest == source.as_std_path() => {
                debug!("removing link {link}");
                fs::remove_file(&link)?;
            }
            Ok(dest) => debug!("leaving {link}: points at {}", dest.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            // Not a symlink; someone else owns it.
            Err(e) if e.kind() == ErrorKind::InvalidInput => {
                debug!("leaving {link}: not a symlink");
            }
            Err(e) => return Err(e.into()),
        }

        match fs::remove_file(source) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Return the per-user executable directory for the current platform.
///
/// Uses the XDG executable directory where the platform defines one and
/// falls back to `~/.local/bin`.
#[must_use]
pub fn default_bin_dir() -> Option<Utf8PathBuf> {
    let dirs = directories_next::BaseDirs::new()?;
    let dir = dirs
        .executable_dir()
        .map_or_else(|| dirs.home_dir().join(".local").join("bin"), Path::to_path_buf);
    Utf8PathBuf::try_from(dir).ok()
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    // rwxr-xr-x
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(path: &Utf8Path) -> std::io::Result<()> {
    fs::metadata(path).map(|_| ())
}

#[cfg(unix)]
fn create_symlink(source: &Utf8Path, link: &Utf8Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(windows)]
fn create_symlink(source: &Utf8Path, link: &Utf8Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(source, link)
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_source: &Utf8Path, _link: &Utf8Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

/// Checks if a directory is in the PATH environment variable.
fn is_directory_in_path(dir: &Path) -> bool {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|p| p == dir))
        .unwrap_or(false)
}

/// Returns instructions for adding a directory to PATH.
#[must_use]
pub fn path_instructions(bin_dir: &Utf8Path) -> String {
    format!(
        concat!(
            "Add the following to your shell profile (~/.bashrc or ~/.zshrc):\n",
            "  export PATH=\"{}:$PATH\""
        ),
        bin_dir
    )
}
