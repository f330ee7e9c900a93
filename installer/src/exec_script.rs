//! The `exec_script` artefact.
//!
//! An [`ExecScript`] describes a wrapper script placed in a cask's staging
//! directory. Installing it writes the script and then hands the wrapper to a
//! [`BinaryInstaller`], which exposes it under the target name. Validation
//! happens in [`ExecScript::new`]; nothing touches the filesystem until
//! [`ExecScript::install`].

use crate::binary::BinaryInstaller;
use crate::error::{InstallerError, Result};
use crate::file_name::FileName;
use crate::script::{ScriptSpec, render_script};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};
use serde::Deserialize;

/// Arguments used when none are configured: forward every positional
/// parameter.
pub const DEFAULT_ARGS: &[&str] = &["$@"];

/// Interpreter used when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Optional settings for an `exec_script` stanza.
///
/// Field names match the stanza keys so the struct can be deserialised from
/// any declarative source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecScriptOptions {
    /// Name to install the executable as. Defaults to the source basename.
    #[serde(default)]
    pub target: Option<String>,
    /// File name of the wrapper script. Defaults to `{target}.wrapper.sh`.
    #[serde(default)]
    pub wrapper: Option<String>,
    /// Arguments passed to the source command. Defaults to [`DEFAULT_ARGS`].
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

impl Default for ExecScriptOptions {
    fn default() -> Self {
        Self {
            target: None,
            wrapper: None,
            args: None,
            quote_args: default_quote_args(),
            shell: default_shell(),
            stderr: None,
            chdir: None,
        }
    }
}

/// A validated wrapper-script artefact rooted in a staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecScript {
    command: Utf8PathBuf,
    wrapper: Utf8PathBuf,
    wrapper_name: FileName,
    target_name: FileName,
    args: Vec<String>,
    quote_args: bool,
    shell: String,
    stderr: Option<Utf8PathBuf>,
    chdir: Option<Utf8PathBuf>,
}

impl ExecScript {
    /// Validate `options` and derive paths under `staging_root`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidConfiguration`] if `staging_root` is
    /// not absolute, if `source` is absolute, if `wrapper` or `target` is not a
    /// bare file name, if `source` has no file name to default the target
    /// from, or if `stderr` or `chdir` contains a NUL byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use caskwrap::exec_script::{ExecScript, ExecScriptOptions};
    ///
    /// let script = ExecScript::new(
    ///     Utf8Path::new("/staging"),
    ///     Utf8Path::new("bin/tool"),
    ///     ExecScriptOptions::default(),
    /// )?;
    ///
    /// assert_eq!(script.target_name().as_str(), "tool");
    /// assert_eq!(script.wrapper(), Utf8Path::new("/staging/tool.wrapper.sh"));
    /// # Ok::<(), caskwrap::error::InstallerError>(())
    /// ```
    pub fn new(
        staging_root: &Utf8Path,
        source: &Utf8Path,
        options: ExecScriptOptions,
    ) -> Result<Self> {
        let ExecScriptOptions {
            target,
            wrapper,
            args,
            quote_args,
            shell,
            stderr,
            chdir,
        } = options;

        if !staging_root.is_absolute() {
            return Err(InstallerError::InvalidConfiguration {
                field: "staging_root",
                reason: format!("`staging_root` {staging_root} must be an absolute path"),
            });
        }
        if source.is_absolute() {
            return Err(InstallerError::InvalidConfiguration {
                field: "source",
                reason: format!("`source` {source} must be relative to the staging root"),
            });
        }
        reject_nul("stderr", stderr.as_deref())?;
        reject_nul("chdir", chdir.as_deref())?;

        let explicit_wrapper = wrapper
            .as_deref()
            .map(|name| FileName::parse("wrapper", name))
            .transpose()?;
        let target_name = match target.as_deref() {
            Some(name) => FileName::parse("target", name)?,
            None => source_basename(source)?,
        };
        let wrapper_name = match explicit_wrapper {
            Some(name) => name,
            None => FileName::parse("wrapper", &format!("{target_name}.wrapper.sh"))?,
        };

        let command = staging_root.join(source);
        let wrapper = staging_root.join(wrapper_name.as_str());
        trace!("exec_script {target_name}: command {command}, wrapper {wrapper}");

        Ok(Self {
            command,
            wrapper,
            wrapper_name,
            target_name,
            args: args.unwrap_or_else(default_args),
            quote_args,
            shell,
            stderr,
            chdir,
        })
    }

    /// Render the wrapper script text.
    #[must_use]
    pub fn render(&self) -> String {
        render_script(&ScriptSpec {
            shell: &self.shell,
            chdir: self.chdir.as_deref(),
            command: &self.command,
            args: &self.args,
            quote_args: self.quote_args,
            stderr: self.stderr.as_deref(),
        })
    }

    /// Write the wrapper script and install it as [`Self::target_name`].
    ///
    /// The staging directory must already exist. Re-running overwrites the
    /// wrapper with identical content.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::WrapperWrite`] if the script cannot be
    /// written. Errors from `installer` are returned unchanged.
    pub fn install(&self, installer: &dyn BinaryInstaller) -> Result<()> {
        debug!("writing wrapper script {}", self.wrapper);
        std::fs::write(&self.wrapper, self.render()).map_err(|source| {
            InstallerError::WrapperWrite {
                path: self.wrapper.clone(),
                source,
            }
        })?;

        installer.install_executable(&self.wrapper, &self.target_name)
    }

    /// Remove the installed executable through `installer`.
    ///
    /// # Errors
    ///
    /// Errors from `installer` are returned unchanged.
    pub fn uninstall(&self, installer: &dyn BinaryInstaller) -> Result<()> {
        debug!("uninstalling {}", self.target_name);
        installer.uninstall_executable(&self.wrapper, &self.target_name)
    }

    /// Absolute path of the source executable.
    #[must_use]
    pub fn command(&self) -> &Utf8Path {
        &self.command
    }

    /// Absolute path of the wrapper script.
    #[must_use]
    pub fn wrapper(&self) -> &Utf8Path {
        &self.wrapper
    }

    /// File name of the wrapper script.
    #[must_use]
    pub fn wrapper_name(&self) -> &FileName {
        &self.wrapper_name
    }

    /// Name the executable is installed as.
    #[must_use]
    pub fn target_name(&self) -> &FileName {
        &self.target_name
    }

    /// Argument tokens passed to the command.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether argument tokens are double-quoted.
    #[must_use]
    pub fn quote_args(&self) -> bool {
        self.quote_args
    }

    /// Interpreter on the shebang line.
    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Standard error redirection target.
    #[must_use]
    pub fn stderr(&self) -> Option<&Utf8Path> {
        self.stderr.as_deref()
    }

    /// Working directory for the command.
    #[must_use]
    pub fn chdir(&self) -> Option<&Utf8Path> {
        self.chdir.as_deref()
    }
}

fn default_args() -> Vec<String> {
    DEFAULT_ARGS.iter().map(|arg| (*arg).to_owned()).collect()
}

fn reject_nul(field: &'static str, path: Option<&Utf8Path>) -> Result<()> {
    match path {
        Some(path) if path.as_str().contains('\0') => Err(InstallerError::InvalidConfiguration {
            field,
            reason: format!("`{field}` must not contain a NUL byte"),
        }),
        _ => Ok(()),
    }
}

fn source_basename(source: &Utf8Path) -> Result<FileName> {
    let name = source
        .file_name()
        .ok_or_else(|| InstallerError::InvalidConfiguration {
            field: "source",
            reason: format!("`source` {source} has no file name; set `target` explicitly"),
        })?;
    FileName::parse("source", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::MockBinaryInstaller;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    fn staging() -> &'static Utf8Path {
        Utf8Path::new("/opt/staging/tool/1.0")
    }

    fn build(source: &str, options: ExecScriptOptions) -> Result<ExecScript> {
        ExecScript::new(staging(), Utf8Path::new(source), options)
    }

    struct Staged {
        _temp: TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn staged() -> Staged {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root =
            Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp dir path not UTF-8");
        Staged { _temp: temp, root }
    }

    fn expect_install(mock: &mut MockBinaryInstaller, wrapper: Utf8PathBuf, target: &'static str) {
        mock.expect_install_executable()
            .withf(move |path, name| path == wrapper && name.as_str() == target)
            .times(1)
            .returning(|_, _| Ok(()));
    }

    #[test]
    fn defaults_follow_source_basename() {
        let script = build("bin/tool", ExecScriptOptions::default()).expect("valid config");

        assert_eq!(script.target_name().as_str(), "tool");
        assert_eq!(script.wrapper_name().as_str(), "tool.wrapper.sh");
        assert_eq!(script.args(), ["$@"]);
        assert!(script.quote_args());
        assert_eq!(script.shell(), "/bin/bash");
        assert_eq!(script.stderr(), None);
        assert_eq!(script.chdir(), None);
        assert_eq!(script.command(), staging().join("bin/tool"));
        assert_eq!(script.wrapper(), staging().join("tool.wrapper.sh"));
    }

    #[test]
    fn explicit_target_names_the_default_wrapper() {
        let options = ExecScriptOptions {
            target: Some("tool-cli".to_owned()),
            ..ExecScriptOptions::default()
        };
        let script = build("bin/tool", options).expect("valid config");

        assert_eq!(script.target_name().as_str(), "tool-cli");
        assert_eq!(script.wrapper(), staging().join("tool-cli.wrapper.sh"));
    }

    #[test]
    fn explicit_wrapper_is_used_verbatim() {
        let options = ExecScriptOptions {
            wrapper: Some("launch.sh".to_owned()),
            ..ExecScriptOptions::default()
        };
        let script = build("bin/tool", options).expect("valid config");

        assert_eq!(script.target_name().as_str(), "tool");
        assert_eq!(script.wrapper(), staging().join("launch.sh"));
    }

    #[rstest]
    #[case::wrapper_path(Some("sub/dir/name.sh"), None, "wrapper")]
    #[case::target_path(None, Some("a/b"), "target")]
    #[case::wrapper_checked_first(Some("x/y"), Some("a/b"), "wrapper")]
    fn path_like_names_are_rejected(
        #[case] wrapper: Option<&str>,
        #[case] target: Option<&str>,
        #[case] expected_field: &str,
    ) {
        let options = ExecScriptOptions {
            wrapper: wrapper.map(str::to_owned),
            target: target.map(str::to_owned),
            ..ExecScriptOptions::default()
        };
        let err = build("bin/tool", options).expect_err("expected configuration error");

        match err {
            InstallerError::InvalidConfiguration { field, reason } => {
                assert_eq!(field, expected_field);
                assert!(reason.contains("must be a file name instead of a path"));
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn source_without_file_name_needs_target() {
        let err = build("..", ExecScriptOptions::default()).expect_err("expected rejection");
        assert!(err.is_configuration());

        let options = ExecScriptOptions {
            target: Some("tool".to_owned()),
            ..ExecScriptOptions::default()
        };
        assert!(build("..", options).is_ok());
    }

    #[rstest]
    #[case::relative_root("stage", "bin/tool", "staging_root")]
    #[case::dot_root(".", "bin/tool", "staging_root")]
    #[case::absolute_source("/opt/staging", "/etc/passwd", "source")]
    fn paths_escaping_the_staging_root_are_rejected(
        #[case] root: &str,
        #[case] source: &str,
        #[case] expected_field: &str,
    ) {
        let err = ExecScript::new(
            Utf8Path::new(root),
            Utf8Path::new(source),
            ExecScriptOptions::default(),
        )
        .expect_err("expected configuration error");

        match err {
            InstallerError::InvalidConfiguration { field, .. } => {
                assert_eq!(field, expected_field);
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[rstest]
    #[case::stderr("stderr")]
    #[case::chdir("chdir")]
    fn nul_bytes_in_shell_paths_are_rejected(#[case] expected_field: &str) {
        let path = Some(Utf8PathBuf::from("/tmp/a\0b"));
        let options = match expected_field {
            "stderr" => ExecScriptOptions {
                stderr: path,
                ..ExecScriptOptions::default()
            },
            _ => ExecScriptOptions {
                chdir: path,
                ..ExecScriptOptions::default()
            },
        };
        let err = build("bin/tool", options).expect_err("expected configuration error");

        match err {
            InstallerError::InvalidConfiguration { field, .. } => {
                assert_eq!(field, expected_field);
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn default_args_are_fresh_copies() {
        let mut first = build("bin/tool", ExecScriptOptions::default()).expect("valid config");
        first.args.push("--extra".to_owned());

        let second = build("bin/tool", ExecScriptOptions::default()).expect("valid config");
        assert_eq!(second.args(), ["$@"]);
        assert_eq!(DEFAULT_ARGS, ["$@"]);
    }

    #[test]
    fn render_includes_every_configured_piece() {
        let options = ExecScriptOptions {
            args: Some(vec!["--config".to_owned(), "my file".to_owned()]),
            shell: "/bin/sh".to_owned(),
            stderr: Some(Utf8PathBuf::from("/dev/null")),
            chdir: Some(Utf8PathBuf::from("/opt/My App")),
            ..ExecScriptOptions::default()
        };
        let script = build("bin/tool", options).expect("valid config");

        assert_eq!(
            script.render(),
            concat!(
                "#!/bin/sh\n",
                "cd '/opt/My App' && exec \"/opt/staging/tool/1.0/bin/tool\" ",
                "\"--config\" \"my file\" 2>/dev/null\n",
            )
        );
    }

    #[test]
    fn render_without_quoting_emits_raw_tokens() {
        let options = ExecScriptOptions {
            args: Some(vec!["a b".to_owned(), "c".to_owned()]),
            quote_args: false,
            ..ExecScriptOptions::default()
        };
        let script = build("bin/tool", options).expect("valid config");

        assert!(script.render().ends_with("bin/tool\" a b c\n"));
    }

    #[rstest]
    fn install_writes_wrapper_then_delegates(staged: Staged) {
        let script = ExecScript::new(
            &staged.root,
            Utf8Path::new("bin/tool"),
            ExecScriptOptions::default(),
        )
        .expect("valid config");

        let mut installer = MockBinaryInstaller::new();
        expect_install(&mut installer, script.wrapper().to_owned(), "tool");

        script.install(&installer).expect("install should succeed");

        let written = std::fs::read_to_string(script.wrapper()).expect("wrapper should exist");
        assert_eq!(written, script.render());
    }

    #[rstest]
    fn install_twice_writes_identical_bytes(staged: Staged) {
        let script = ExecScript::new(
            &staged.root,
            Utf8Path::new("bin/tool"),
            ExecScriptOptions {
                chdir: Some(Utf8PathBuf::from("/tmp")),
                ..ExecScriptOptions::default()
            },
        )
        .expect("valid config");

        let mut installer = MockBinaryInstaller::new();
        installer
            .expect_install_executable()
            .times(2)
            .returning(|_, _| Ok(()));

        script.install(&installer).expect("first install");
        let first = std::fs::read(script.wrapper()).expect("read wrapper");
        script.install(&installer).expect("second install");
        let second = std::fs::read(script.wrapper()).expect("read wrapper");

        assert_eq!(first, second);
    }

    #[rstest]
    fn install_truncates_stale_wrapper(staged: Staged) {
        let script = ExecScript::new(
            &staged.root,
            Utf8Path::new("tool"),
            ExecScriptOptions::default(),
        )
        .expect("valid config");
        std::fs::write(script.wrapper(), "x".repeat(4096)).expect("write stale wrapper");

        let mut installer = MockBinaryInstaller::new();
        installer
            .expect_install_executable()
            .returning(|_, _| Ok(()));
        script.install(&installer).expect("install should succeed");

        let written = std::fs::read_to_string(script.wrapper()).expect("read wrapper");
        assert_eq!(written, script.render());
    }

    #[rstest]
    fn install_propagates_delegate_errors_unchanged(staged: Staged) {
        let script = ExecScript::new(
            &staged.root,
            Utf8Path::new("tool"),
            ExecScriptOptions::default(),
        )
        .expect("valid config");

        let mut installer = MockBinaryInstaller::new();
        installer.expect_install_executable().returning(|_, name| {
            Err(InstallerError::BinaryInstall {
                name: name.to_string(),
                reason: "link exists".to_owned(),
            })
        });

        let err = script.install(&installer).expect_err("install should fail");
        match err {
            InstallerError::BinaryInstall { name, reason } => {
                assert_eq!(name, "tool");
                assert_eq!(reason, "link exists");
            }
            other => panic!("expected BinaryInstall, got {other:?}"),
        }
    }

    #[rstest]
    fn write_failure_skips_delegate(staged: Staged) {
        let missing_root = staged.root.join("not-created");
        let script = ExecScript::new(
            &missing_root,
            Utf8Path::new("tool"),
            ExecScriptOptions::default(),
        )
        .expect("valid config");

        let mut installer = MockBinaryInstaller::new();
        installer.expect_install_executable().times(0);

        let err = script.install(&installer).expect_err("install should fail");
        assert!(matches!(err, InstallerError::WrapperWrite { .. }));
    }

    #[test]
    fn uninstall_delegates_with_wrapper_and_target() {
        let script = build("bin/tool", ExecScriptOptions::default()).expect("valid config");
        let expected = script.wrapper().to_owned();

        let mut installer = MockBinaryInstaller::new();
        installer
            .expect_uninstall_executable()
            .withf(move |path, name| path == expected && name.as_str() == "tool")
            .times(1)
            .returning(|_, _| Ok(()));

        script.uninstall(&installer).expect("uninstall should succeed");
    }
}
