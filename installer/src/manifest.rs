//! TOML manifests describing exec-script artefacts.
//!
//! A manifest names the staging root once and lists any number of
//! `[[exec_script]]` stanzas:
//!
//! ```toml
//! staging_root = "/opt/staging/tool/1.0"
//! bin_dir = "/usr/local/bin"
//!
//! [[exec_script]]
//! source = "bin/tool"
//! args = ["--quiet", "$@"]
//! stderr = "/dev/null"
//! ```

use crate::error::{InstallerError, Result};
use crate::exec_script::{DEFAULT_SHELL, ExecScript, ExecScriptOptions};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;

/// Parsed manifest contents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Directory the cask's files were staged into.
    pub staging_root: Utf8PathBuf,
    /// Directory to expose executables in.
    #[serde(default)]
    pub bin_dir: Option<Utf8PathBuf>,
    /// Declared exec-script stanzas.
    #[serde(default, rename = "exec_script")]
    pub exec_scripts: Vec<ExecScriptStanza>,
}

/// One `[[exec_script]]` table.
///
/// The option keys are spelled out here rather than flattened from
/// [`ExecScriptOptions`] so that a misspelled key is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecScriptStanza {
    /// Source executable, relative to the staging root.
    pub source: Utf8PathBuf,
    /// Name to install the executable as.
    #[serde(default)]
    pub target: Option<String>,
    /// File name of the wrapper script.
    #[serde(default)]
    pub wrapper: Option<String>,
    /// Arguments passed to the source command.
    #[serde(default)]
    pub args: Option<Vec<String>>,
    /// Wrap each argument in double quotes.
    #[serde(default = "default_quote_args")]
    pub quote_args: bool,
    /// Interpreter for the shebang line.
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Where to send standard error.
    #[serde(default)]
    pub stderr: Option<Utf8PathBuf>,
    /// Directory to change into before running the command.
    #[serde(default)]
    pub chdir: Option<Utf8PathBuf>,
}

const fn default_quote_args() -> bool {
    true
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_owned()
}

impl ExecScriptStanza {
    /// Options for building this stanza's artefact.
    #[must_use]
    pub fn options(&self) -> ExecScriptOptions {
        ExecScriptOptions {
            target: self.target.clone(),
            wrapper: self.wrapper.clone(),
            args: self.args.clone(),
            quote_args: self.quote_args,
            shell: self.shell.clone(),
            stderr: self.stderr.clone(),
            chdir: self.chdir.clone(),
        }
    }
}

impl Manifest {
    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::ManifestRead`] if the file cannot be read and
    /// [`InstallerError::InvalidManifest`] if it cannot be parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        debug!("loading manifest {path}");
        let contents =
            std::fs::read_to_string(path).map_err(|source| InstallerError::ManifestRead {
                path: path.to_owned(),
                source,
            })?;
        Self::parse(&contents, path)
    }

    /// Parse manifest text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidManifest`] for malformed TOML, unknown
    /// keys at the top level or in a stanza, or a manifest with no stanzas.
    pub fn parse(contents: &str, path: &Utf8Path) -> Result<Self> {
        let manifest: Self =
            toml::from_str(contents).map_err(|e| InstallerError::InvalidManifest {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;

        if manifest.exec_scripts.is_empty() {
            return Err(InstallerError::InvalidManifest {
                path: path.to_owned(),
                reason: "no [[exec_script]] entries".to_owned(),
            });
        }
        Ok(manifest)
    }

    /// Build an artefact for every stanza, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error encountered.
    pub fn artefacts(&self) -> Result<Vec<ExecScript>> {
        self.exec_scripts
            .iter()
            .map(|stanza| {
                ExecScript::new(&self.staging_root, &stanza.source, stanza.options())
            })
            .collect()
    }
}
