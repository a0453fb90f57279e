use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Incomparable versions: {left:?} != {right:?}")]
    Incomparable { left: String, right: String },

    #[error("{0} has no public version number")]
    NotPublic(String),
}
