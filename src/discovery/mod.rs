//! Build-time discovery of a project's declared version
//!
//! - declaration.rs: `_version.toml` reader and writer
//! - error.rs: discovery error type

pub mod declaration;
pub mod error;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::VERSION_FILE_NAME;
use crate::version::value::Version;

pub use declaration::{parse_declaration, render_declaration};
pub use error::DiscoveryError;

/// Returns `<source_root>/<project_name>/_version.toml`
pub fn version_file_path(project_name: &str, source_root: &Path) -> PathBuf {
    source_root.join(project_name).join(VERSION_FILE_NAME)
}

/// Discover the version declared by `project_name` under `source_root`
///
/// # Returns
/// * `Ok(Version)` - The declared version
/// * `Err(DiscoveryError::NotFound)` - If the declaration file does not exist
/// * `Err(DiscoveryError)` - If the file does not declare a valid version
pub fn get_version_from_project(
    project_name: &str,
    source_root: &Path,
) -> Result<Version, DiscoveryError> {
    let path = version_file_path(project_name, source_root);
    let version = read_declaration(&path)?;

    if !version.package().eq_ignore_ascii_case(project_name) {
        warn!(
            "{} declares package {:?}, expected {:?}",
            path.display(),
            version.package(),
            project_name
        );
    }

    Ok(version)
}

/// Read and parse a declaration file
pub fn read_declaration(path: &Path) -> Result<Version, DiscoveryError> {
    debug!("Reading version declaration from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DiscoveryError::NotFound(path.to_path_buf())
        } else {
            DiscoveryError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    parse_declaration(&content).inspect_err(|e| {
        warn!("Failed to read version from {}: {}", path.display(), e);
    })
}

/// Packaging hook: the release version string a build tool should publish
pub fn packaging_version(project_name: &str, source_root: &Path) -> Result<String, DiscoveryError> {
    get_version_from_project(project_name, source_root).map(|v| v.short_string())
}

/// Locate the package directory under `cwd`
///
/// Prefers `<cwd>/src/<package>` over `<cwd>/<package>`; the package name is
/// lower cased.
pub fn find_package_dir(cwd: &Path, package: &str) -> Result<PathBuf, DiscoveryError> {
    let name = package.to_lowercase();
    let src_dir = cwd.join("src").join(&name);
    let current_dir = cwd.join(&name);

    if src_dir.is_dir() {
        Ok(src_dir)
    } else if current_dir.is_dir() {
        Ok(current_dir)
    } else {
        Err(DiscoveryError::PackageNotFound {
            package: package.to_string(),
            cwd: cwd.to_path_buf(),
        })
    }
}
