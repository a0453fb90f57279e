use std::path::PathBuf;

use thiserror::Error;

use crate::version::error::VersionError;

/// Error type for version discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The declaration file does not exist
    #[error("No version declaration found at {}", .0.display())]
    NotFound(PathBuf),

    /// Neither `<cwd>/src/<package>` nor `<cwd>/<package>` is a directory
    #[error(
        "Can't find package {package:?} under {}/src or {}; check the package name (it is lower cased) or pass a path",
        .cwd.display(),
        .cwd.display()
    )]
    PackageNotFound { package: String, cwd: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML
    #[error("Invalid syntax: {0}")]
    Syntax(String),

    /// The file has no `[version]` table
    #[error("No [{0}] table declared")]
    MissingDeclaration(String),

    /// The `[version]` table has unknown, duplicated, missing or mistyped keys
    #[error("Invalid version declaration: {0}")]
    InvalidDeclaration(String),

    /// The declared components do not form a valid version
    #[error(transparent)]
    Version(#[from] VersionError),
}
