//! Error types for dtsmerge core.

use crate::types::SymbolId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for bundling operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort bundling of a single entry point.
#[derive(Debug, Error)]
pub enum Error {
    /// The entry file is not among the program's root files.
    #[error("Cannot find root source file {path}")]
    RootFileNotFound {
        /// Entry file path as configured.
        path: PathBuf,
    },

    /// The root file has no module symbol (it is a script, not a module).
    #[error("Symbol for root source file {path} not found")]
    RootSymbolNotFound {
        /// Canonical root file path.
        path: PathBuf,
    },

    /// A declaration without a name reached the import step.
    #[error("Import/usage unnamed declaration: {text}")]
    UnnamedDeclaration {
        /// Preview of the offending statement.
        text: String,
    },

    /// The usage graph has no record of an identity that must have users.
    #[error(
        "No usages recorded for symbol {}",
        symbols.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    MissingUsages {
        /// The identity, split into its merged parts.
        symbols: Vec<SymbolId>,
    },

    /// Class declarations survived into output while they are disallowed.
    #[error("{} class statement(s) are found in generated dts: {}", names.len(), names.join(", "))]
    ClassesInOutput {
        /// Class names, `anonymous class` for unnamed ones.
        names: Vec<String>,
    },
}
