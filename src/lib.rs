//! Release versions and deprecation warnings for packaged projects
//!
//! # Modules
//!
//! - [`version`]: the [`Version`] value type, its formatting and ordering
//! - [`discovery`]: reading a project's declared version at build time
//! - [`deprecate`]: warnings for deprecated functions, types and attributes
//! - [`update`]: release bumping of a declared version
//! - [`config`]: file layout constants and the warning policy
//! - [`logging`]: `tracing` subscriber setup for the command line tool
//!
//! ```
//! use incremental::version::{Qualifiers, Version};
//!
//! let version = Version::new("widgetbox", 1, 2, 3, Qualifiers::release_candidate(1)).unwrap();
//! assert_eq!(version.short_string(), "1.2.3rc1");
//! assert!(version < Version::new("widgetbox", 1, 2, 3, Qualifiers::default()).unwrap());
//! ```

pub mod config;
pub mod deprecate;
pub mod discovery;
pub mod logging;
pub mod update;
pub mod version;

pub use discovery::{get_version_from_project, packaging_version};
pub use version::Version;
