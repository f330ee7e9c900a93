//! caskwrap installer library.
//!
//! This crate renders and installs `exec_script` artefacts: small shell
//! wrappers placed in a cask's staging directory that exec a staged
//! executable with fixed arguments. It is used by the `caskwrap` CLI binary
//! and can be consumed programmatically by other installers.
//!
//! # Modules
//!
//! - [`binary`] - Executable installation capability and bin-directory linking
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Semantic error types
//! - [`exec_script`] - The `exec_script` artefact
//! - [`file_name`] - Validated bare file names
//! - [`manifest`] - TOML manifests of exec-script stanzas
//! - [`resolution`] - CLI argument resolution
//! - [`script`] - Pure shell script rendering

pub mod binary;
pub mod cli;
pub mod error;
pub mod exec_script;
pub mod file_name;
pub mod manifest;
pub mod resolution;
pub mod script;
