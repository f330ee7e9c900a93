//! CLI argument definitions for caskwrap.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::exec_script::{DEFAULT_SHELL, ExecScriptOptions};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Install exec-script wrappers for staged cask executables.
#[derive(Parser, Debug)]
#[command(name = "caskwrap")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install exec-script wrappers for staged cask executables.\n\n",
    "A wrapper is a two-line shell script written into the staging directory ",
    "that changes directory if asked, execs the staged executable with fixed ",
    "arguments, and optionally redirects standard error. The wrapper is then ",
    "linked into a bin directory under the target name.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Wrap a staged executable, forwarding all arguments:\n",
    "    $ caskwrap install --staging-root /opt/staging/tool/1.0 --source bin/tool\n\n",
    "  Fixed arguments and silenced stderr:\n",
    "    $ caskwrap install --staging-root DIR --source bin/tool \\\n",
    "        --arg --quiet --arg '$@' --stderr /dev/null\n\n",
    "  Install every stanza in a manifest:\n",
    "    $ caskwrap install --manifest cask.toml\n\n",
    "  Preview the generated script:\n",
    "    $ caskwrap render --manifest cask.toml",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write wrapper scripts and link them into the bin directory.
    Install(InstallArgs),

    /// Remove linked executables and their wrapper scripts.
    Uninstall(InstallArgs),

    /// Print wrapper scripts without writing anything.
    Render(StanzaArgs),
}

/// Arguments for the install and uninstall commands.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Stanza selection.
    #[command(flatten)]
    pub stanza: StanzaArgs,

    /// Directory to link executables into [default: manifest, then
    /// platform-specific].
    #[arg(short, long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Where exec-script stanzas come from: a manifest or individual flags.
#[derive(Parser, Debug, Clone, Default)]
pub struct StanzaArgs {
    /// TOML manifest listing `[[exec_script]]` stanzas.
    #[arg(
        short,
        long,
        value_name = "FILE",
        conflicts_with_all = [
            "staging_root",
            "source",
            "target",
            "wrapper",
            "arg",
            "no_quote_args",
            "shell",
            "stderr",
            "chdir",
        ]
    )]
    pub manifest: Option<Utf8PathBuf>,

    /// Directory the cask was staged into.
    #[arg(long, value_name = "DIR", required_unless_present = "manifest")]
    pub staging_root: Option<Utf8PathBuf>,

    /// Source executable, relative to the staging root.
    #[arg(long, value_name = "PATH", required_unless_present = "manifest")]
    pub source: Option<Utf8PathBuf>,

    /// Name to install the executable as [default: source file name].
    #[arg(long, value_name = "NAME")]
    pub target: Option<String>,

    /// Wrapper script file name [default: TARGET.wrapper.sh].
    #[arg(long, value_name = "NAME")]
    pub wrapper: Option<String>,

    /// Argument passed to the source executable (can be repeated)
    /// [default: "$@"].
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    pub arg: Vec<String>,

    /// Emit arguments without surrounding double quotes.
    #[arg(long)]
    pub no_quote_args: bool,

    /// Interpreter for the shebang line [default: /bin/bash].
    #[arg(long, value_name = "PATH")]
    pub shell: Option<String>,

    /// Redirect standard error to this path.
    #[arg(long, value_name = "PATH")]
    pub stderr: Option<Utf8PathBuf>,

    /// Change to this directory before running the executable.
    #[arg(long, value_name = "DIR")]
    pub chdir: Option<Utf8PathBuf>,
}

impl StanzaArgs {
    /// Convert the per-stanza flags into artefact options.
    ///
    /// No `--arg` flags means the default argument list, and no `--shell`
    /// means [`DEFAULT_SHELL`].
    ///
    /// # Examples
    ///
    /// ```
    /// use caskwrap::cli::StanzaArgs;
    ///
    /// let options = StanzaArgs::default().options();
    /// assert!(options.args.is_none());
    /// assert!(options.quote_args);
    /// assert_eq!(options.shell, "/bin/bash");
    /// ```
    #[must_use]
    pub fn options(&self) -> ExecScriptOptions {
        ExecScriptOptions {
            target: self.target.clone(),
            wrapper: self.wrapper.clone(),
            args: (!self.arg.is_empty()).then(|| self.arg.clone()),
            quote_args: !self.no_quote_args,
            shell: self
                .shell
                .clone()
                .unwrap_or_else(|| DEFAULT_SHELL.to_owned()),
            stderr: self.stderr.clone(),
            chdir: self.chdir.clone(),
        }
    }
}
