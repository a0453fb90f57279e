//! Release version values
//!
//! # Modules
//!
//! - [`value`]: the [`Version`] value type, its formatting and ordering
//! - [`parse`]: parsing of public version strings (`1.2.3rc1`)
//! - [`error`]: error types for construction and comparison

pub mod error;
pub mod parse;
pub mod value;

pub use error::VersionError;
pub use value::{Major, Qualifiers, Version};
