//! Deprecation warnings for functions, types, properties and module attributes
//!
//! # Modules
//!
//! - [`notice`]: warning text and documentation notices
//! - [`sink`]: process-wide warning channel and de-duplication policy
//! - [`wrap`]: wrappers for callables, values and properties
//! - [`module`]: lookup proxy for module-level attributes

pub mod module;
pub mod notice;
pub mod sink;
pub mod wrap;

pub use module::{AttributeError, ModuleAttributes};
pub use notice::DeprecationNotice;
pub use sink::{
    RecordingSink, TracingSink, Warning, WarningCapture, WarningSink, set_warning_policy,
    set_warning_sink, warn_deprecated, warning_policy, warning_sink,
};
pub use wrap::{Deprecated, DeprecatedProperty, deprecate};
