//! caskwrap CLI entrypoint.
//!
//! Writes exec-script wrappers into a cask's staging directory and links them
//! into a bin directory, or prints them with `render`.

use caskwrap::binary::path_instructions;
use caskwrap::cli::{Cli, Command, InstallArgs, StanzaArgs};
use caskwrap::error::{InstallerError, Result};
use caskwrap::resolution::{resolve_installer, resolve_stanzas};
use clap::Parser;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Command::Install(args) => run_install(args, stderr),
        Command::Uninstall(args) => run_uninstall(args, stderr),
        Command::Render(args) => run_render(args, stdout),
    }
}

fn run_install(args: &InstallArgs, stderr: &mut dyn Write) -> Result<()> {
    let resolved = resolve_stanzas(&args.stanza)?;
    let installer = resolve_installer(args, &resolved)?;

    for artefact in &resolved.artefacts {
        artefact.install(&installer)?;
        if !args.quiet {
            write_stderr_line(
                stderr,
                format!(
                    "Installed {} -> {}",
                    installer.link_path(artefact.target_name()),
                    artefact.wrapper()
                ),
            );
        }
    }

    if !args.quiet && !installer.in_path() {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, path_instructions(installer.bin_dir()));
    }
    Ok(())
}

fn run_uninstall(args: &InstallArgs, stderr: &mut dyn Write) -> Result<()> {
    let resolved = resolve_stanzas(&args.stanza)?;
    let installer = resolve_installer(args, &resolved)?;

    for artefact in &resolved.artefacts {
        artefact.uninstall(&installer)?;
        if !args.quiet {
            write_stderr_line(stderr, format!("Uninstalled {}", artefact.target_name()));
        }
    }
    Ok(())
}

fn run_render(args: &StanzaArgs, stdout: &mut dyn Write) -> Result<()> {
    let resolved = resolve_stanzas(args)?;
    for artefact in &resolved.artefacts {
        stdout
            .write_all(artefact.render().as_bytes())
            .map_err(|source| InstallerError::WriteFailed { source })?;
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                write_stderr_line(stderr, format!("  caused by: {cause}"));
                source = std::error::Error::source(cause);
            }
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}
