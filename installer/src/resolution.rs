//! Resolution of CLI arguments into artefacts and an installer.

use crate::binary::{BinDirInstaller, default_bin_dir};
use crate::cli::{InstallArgs, StanzaArgs};
use crate::error::{InstallerError, Result};
use crate::exec_script::ExecScript;
use crate::manifest::Manifest;
use camino::{Utf8Path, Utf8PathBuf};

/// Artefacts selected on the command line, plus any manifest bin directory.
#[derive(Debug, Clone)]
pub struct ResolvedStanzas {
    /// Artefacts in declaration order.
    pub artefacts: Vec<ExecScript>,
    /// Bin directory named by the manifest, if any.
    pub manifest_bin_dir: Option<Utf8PathBuf>,
}

/// Build the artefacts described by `args`.
///
/// # Errors
///
/// Returns manifest errors, or a configuration error if the stanza flags are
/// incomplete or invalid.
///
/// A relative `--staging-root` is taken relative to the current directory.
pub fn resolve_stanzas(args: &StanzaArgs) -> Result<ResolvedStanzas> {
    if let Some(path) = &args.manifest {
        let manifest = Manifest::load(path)?;
        return Ok(ResolvedStanzas {
            artefacts: manifest.artefacts()?,
            manifest_bin_dir: manifest.bin_dir,
        });
    }

    let staging_root = args
        .staging_root
        .as_deref()
        .ok_or_else(|| InstallerError::InvalidConfiguration {
            field: "staging_root",
            reason: "`--staging-root` is required without `--manifest`".to_owned(),
        })?;
    let source = args
        .source
        .as_deref()
        .ok_or_else(|| InstallerError::InvalidConfiguration {
            field: "source",
            reason: "`--source` is required without `--manifest`".to_owned(),
        })?;

    let staging_root = absolute_staging_root(staging_root)?;

    Ok(ResolvedStanzas {
        artefacts: vec![ExecScript::new(&staging_root, source, args.options())?],
        manifest_bin_dir: None,
    })
}

fn absolute_staging_root(staging_root: &Utf8Path) -> Result<Utf8PathBuf> {
    if staging_root.is_absolute() {
        return Ok(staging_root.to_owned());
    }
    let cwd = std::env::current_dir()?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| InstallerError::InvalidConfiguration {
        field: "staging_root",
        reason: format!("current directory is not valid UTF-8: {e}"),
    })?;
    Ok(cwd.join(staging_root))
}

/// Choose the bin directory: `--bin-dir`, then the manifest, then the
/// platform default.
///
/// # Errors
///
/// Returns [`InstallerError::BinDirUnavailable`] when no directory applies.
pub fn resolve_installer(
    args: &InstallArgs,
    resolved: &ResolvedStanzas,
) -> Result<BinDirInstaller> {
    args.bin_dir
        .clone()
        .or_else(|| resolved.manifest_bin_dir.clone())
        .or_else(default_bin_dir)
        .map(BinDirInstaller::new)
        .ok_or(InstallerError::BinDirUnavailable)
}
