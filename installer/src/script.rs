//! Shell script rendering for exec-script wrappers.
//!
//! Rendering is pure: [`render_script`] turns a [`ScriptSpec`] into the text
//! of a two-line POSIX shell script and performs no I/O. Path-like values that
//! come from user configuration (`chdir`, `stderr`) go through [`sh_quote`];
//! the command path and argument tokens are handled separately.

use camino::Utf8Path;

/// Everything needed to render one wrapper script.
#[derive(Debug, Clone, Copy)]
pub struct ScriptSpec<'a> {
    /// Interpreter written to the shebang line.
    pub shell: &'a str,
    /// Directory to change into before the exec.
    pub chdir: Option<&'a Utf8Path>,
    /// Executable the script replaces itself with.
    pub command: &'a Utf8Path,
    /// Argument tokens passed to `command`.
    pub args: &'a [String],
    /// Whether each token is wrapped in double quotes.
    pub quote_args: bool,
    /// Standard error redirection target.
    pub stderr: Option<&'a Utf8Path>,
}

/// Render the wrapper script text.
///
/// The output is always two lines ending in a newline:
///
/// ```text
/// #!<shell>
/// [cd <chdir> && ]exec "<command>" <args>[ 2><stderr>]
/// ```
///
/// Argument tokens are wrapped in bare double quotes when `quote_args` is set.
/// Embedded `"`, `\`, `$` and backticks inside a token are *not* escaped, so
/// such tokens are interpreted by the shell at run time. This keeps `"$@"`
/// forwarding working and matches existing casks; tokens that need literal
/// quotes must be written pre-escaped.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use caskwrap::script::{ScriptSpec, render_script};
///
/// let args = vec!["$@".to_owned()];
/// let text = render_script(&ScriptSpec {
///     shell: "/bin/bash",
///     chdir: None,
///     command: Utf8Path::new("/staging/bin/tool"),
///     args: &args,
///     quote_args: true,
///     stderr: Some(Utf8Path::new("/dev/null")),
/// });
///
/// assert_eq!(
///     text,
///     "#!/bin/bash\nexec \"/staging/bin/tool\" \"$@\" 2>/dev/null\n"
/// );
/// ```
#[must_use]
pub fn render_script(spec: &ScriptSpec<'_>) -> String {
    let mut script = format!("#!{}\n", spec.shell);

    if let Some(dir) = spec.chdir {
        script.push_str("cd ");
        script.push_str(&sh_quote(dir.as_str()));
        script.push_str(" && ");
    }

    script.push_str("exec \"");
    script.push_str(spec.command.as_str());
    script.push_str("\" ");
    script.push_str(&render_args(spec.args, spec.quote_args));

    if let Some(target) = spec.stderr {
        script.push_str(" 2>");
        script.push_str(&sh_quote(target.as_str()));
    }

    script.push('\n');
    script
}

/// Join argument tokens with single spaces, double-quoting each when asked.
#[must_use]
pub fn render_args(args: &[String], quote_args: bool) -> String {
    if quote_args {
        args.iter()
            .map(|arg| format!("\"{arg}\""))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        args.join(" ")
    }
}

/// Quote `value` so a POSIX shell reads it back as exactly one word.
///
/// Quoting is delegated to [`shlex::try_quote`]: values with no characters
/// special to the shell are returned unchanged and everything else is quoted.
/// A NUL byte cannot be carried by a shell word, so any NUL bytes are dropped
/// before quoting.
///
/// # Examples
///
/// ```
/// use caskwrap::script::sh_quote;
///
/// assert_eq!(sh_quote("/dev/null"), "/dev/null");
/// assert_eq!(sh_quote("/tmp/my dir"), "'/tmp/my dir'");
/// assert_eq!(sh_quote(""), "''");
/// ```
#[must_use]
pub fn sh_quote(value: &str) -> String {
    match shlex::try_quote(value) {
        Ok(quoted) => quoted.into_owned(),
        Err(_) => sh_quote(&value.replace('\0', "")),
    }
}
