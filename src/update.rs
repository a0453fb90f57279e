//! Release bumping for a package's declared version
//!
//! Computes the next version from the existing `_version.toml` and the
//! requested bump, replaces `<package> NEXT` markers in the package's files,
//! and rewrites the declaration file.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{NEXT_MARKER, VERSION_FILE_NAME, YEAR_START};
use crate::discovery::{self, DiscoveryError, render_declaration};
use crate::version::error::VersionError;
use crate::version::value::{Major, Qualifiers, Version};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Only give {0}")]
    ConflictingOptions(&'static str),

    #[error("You need to issue a prerelease first!")]
    NoPrerelease,

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Requested bump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub package: String,
    /// Package directory; looked up under the working directory when absent
    pub path: Option<PathBuf>,
    /// Explicit new version, e.g. `1.2.3rc1`
    pub newversion: Option<String>,
    pub patch: bool,
    pub rc: bool,
    pub dev: bool,
    pub create: bool,
}

impl UpdateOptions {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    fn check_conflicts(&self) -> Result<(), UpdateError> {
        let newversion = self.newversion.is_some();

        if newversion && (self.patch || self.dev || self.rc) {
            return Err(UpdateError::ConflictingOptions("--newversion"));
        }
        if self.dev && (self.patch || self.rc) {
            return Err(UpdateError::ConflictingOptions("--dev"));
        }
        if self.create && (self.dev || self.patch || self.rc || newversion) {
            return Err(UpdateError::ConflictingOptions("--create"));
        }
        Ok(())
    }
}

/// Outcome of an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub version: Version,
    pub version_file: PathBuf,
    /// Files whose `NEXT` markers were replaced
    pub updated_files: Vec<PathBuf>,
}

/// Run an update against the package found from `cwd`
///
/// `today` drives calendar versions (`--create`, and `--rc` without an
/// existing release candidate): year minus 2000, then month.
pub fn run(
    options: &UpdateOptions,
    today: NaiveDate,
    cwd: &Path,
) -> Result<UpdateReport, UpdateError> {
    options.check_conflicts()?;

    let package_dir = match &options.path {
        Some(path) => path.clone(),
        None => discovery::find_package_dir(cwd, &options.package)?,
    };
    let version_file = package_dir.join(VERSION_FILE_NAME);

    let (version, existing) = next_version(options, today, &version_file)?;
    info!("Updating codebase to {}", version.short_string());

    let updated_files = replace_next_markers(
        &package_dir,
        &version_file,
        &options.package,
        &version,
        existing.as_ref(),
    )?;

    info!("Updating {}", version_file.display());
    std::fs::write(&version_file, render_declaration(&version)).map_err(|e| UpdateError::Io {
        path: version_file.clone(),
        source: e,
    })?;

    Ok(UpdateReport {
        version,
        version_file,
        updated_files,
    })
}

/// The new version, and the declared one when it was read
fn next_version(
    options: &UpdateOptions,
    today: NaiveDate,
    version_file: &Path,
) -> Result<(Version, Option<Version>), UpdateError> {
    let package = options.package.as_str();

    if let Some(newversion) = &options.newversion {
        let existing = match discovery::read_declaration(version_file) {
            Ok(existing) => Some(existing),
            Err(DiscoveryError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };
        return Ok((Version::parse(package, newversion)?, existing));
    }
    if options.create {
        return Ok((
            calendar_version(package, today, Qualifiers::default())?,
            None,
        ));
    }

    let existing = discovery::read_declaration(version_file)?;
    debug!("Existing version is {}", existing.short_string());
    let (major, minor, micro) = numbered(&existing)?;

    let version = if options.patch {
        let qualifiers = if options.rc {
            Qualifiers::release_candidate(1)
        } else {
            Qualifiers::default()
        };
        Version::new(package, major, minor, increment("micro", micro)?, qualifiers)?
    } else if options.rc {
        match existing.release_candidate() {
            Some(rc) => Version::new(
                package,
                major,
                minor,
                micro,
                Qualifiers::release_candidate(increment("release_candidate", to_i64(rc)?)?),
            )?,
            None => calendar_version(package, today, Qualifiers::release_candidate(1))?,
        }
    } else if options.dev {
        let dev = existing.dev().map(to_i64).transpose()?.unwrap_or(0);
        let qualifiers = Qualifiers {
            release_candidate: existing.release_candidate().map(to_i64).transpose()?,
            post: None,
            dev: Some(increment("dev", dev)?),
        };
        Version::new(package, major, minor, micro, qualifiers)?
    } else if existing.release_candidate().is_some() {
        Version::new(package, major, minor, micro, Qualifiers::default())?
    } else {
        return Err(UpdateError::NoPrerelease);
    };

    Ok((version, Some(existing)))
}

fn calendar_version(
    package: &str,
    today: NaiveDate,
    qualifiers: Qualifiers,
) -> Result<Version, UpdateError> {
    let major = i64::from(today.year() - YEAR_START);
    let minor = i64::from(today.month());
    Ok(Version::new(package, major, minor, 0, qualifiers)?)
}

fn numbered(version: &Version) -> Result<(i64, i64, i64), UpdateError> {
    let Major::Release(major) = version.major() else {
        return Err(VersionError::NotPublic(version.package().to_string()).into());
    };
    Ok((
        to_i64(major)?,
        to_i64(version.minor())?,
        to_i64(version.micro())?,
    ))
}

fn increment(name: &str, value: i64) -> Result<i64, VersionError> {
    value
        .checked_add(1)
        .ok_or_else(|| VersionError::InvalidVersion(format!("{name} {value} cannot be bumped")))
}

fn to_i64(value: u64) -> Result<i64, VersionError> {
    i64::try_from(value)
        .map_err(|_| VersionError::InvalidVersion(format!("{value} is out of range")))
}

/// Rewrite references to the unreleased version in every text file under
/// `package_dir`
///
/// - `Version::next("<package>")` becomes the new version's constructor
/// - the previous release candidate's constructor, when there was one, too
/// - `<package> NEXT` becomes `<package> <version>`
fn replace_next_markers(
    package_dir: &Path,
    version_file: &Path,
    package: &str,
    version: &Version,
    existing: Option<&Version>,
) -> Result<Vec<PathBuf>, UpdateError> {
    let constructor = version.constructor_expr();
    let mut rewrites: Vec<(String, String)> = Vec::new();
    if let Some(existing) = existing.filter(|e| e.release_candidate().is_some()) {
        rewrites.push((existing.constructor_expr(), constructor.clone()));
    }
    rewrites.push((Version::next(package)?.constructor_expr(), constructor));

    let package = package.to_lowercase();
    rewrites.push((
        format!("{package} {NEXT_MARKER}"),
        format!("{package} {}", version.short_string()),
    ));

    let mut files: Vec<PathBuf> = WalkDir::new(package_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path != version_file)
        .collect();
    files.sort();

    let mut updated = Vec::new();
    for path in files {
        let Ok(content) = std::fs::read_to_string(&path) else {
            debug!("Skipping non-text file {}", path.display());
            continue;
        };
        let rewritten = rewrites
            .iter()
            .fold(content.clone(), |text, (from, to)| text.replace(from, to));
        if rewritten == content {
            continue;
        }

        info!("Updating {}", path.display());
        std::fs::write(&path, rewritten).map_err(|e| {
            UpdateError::Io {
                path: path.clone(),
                source: e,
            }
        })?;
        updated.push(path);
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn options(configure: impl FnOnce(&mut UpdateOptions)) -> UpdateOptions {
        let mut options = UpdateOptions::new("inctestpkg");
        configure(&mut options);
        options
    }

    #[rstest]
    #[case(options(|o| { o.newversion = Some("1.0.0".into()); o.patch = true; }), "--newversion")]
    #[case(options(|o| { o.newversion = Some("1.0.0".into()); o.rc = true; }), "--newversion")]
    #[case(options(|o| { o.newversion = Some("1.0.0".into()); o.dev = true; }), "--newversion")]
    #[case(options(|o| { o.dev = true; o.patch = true; }), "--dev")]
    #[case(options(|o| { o.dev = true; o.rc = true; }), "--dev")]
    #[case(options(|o| { o.create = true; o.patch = true; }), "--create")]
    #[case(options(|o| { o.create = true; o.newversion = Some("1.0.0".into()); }), "--create")]
    fn check_conflicts_rejects_combinations(
        #[case] options: UpdateOptions,
        #[case] expected: &str,
    ) {
        assert!(matches!(
            options.check_conflicts(),
            Err(UpdateError::ConflictingOptions(flag)) if flag == expected
        ));
    }

    #[rstest]
    #[case(options(|_| {}))]
    #[case(options(|o| { o.patch = true; o.rc = true; }))]
    #[case(options(|o| o.create = true))]
    fn check_conflicts_accepts_valid_combinations(#[case] options: UpdateOptions) {
        assert!(options.check_conflicts().is_ok());
    }

    #[test]
    fn calendar_version_counts_years_from_2000() {
        let today = NaiveDate::from_ymd_opt(2016, 8, 1).unwrap();
        let version = calendar_version("inctestpkg", today, Qualifiers::default()).unwrap();
        assert_eq!(version.short_string(), "16.8.0");
    }

    #[rstest]
    #[case(0, 1)]
    #[case(41, 42)]
    fn increment_adds_one(#[case] value: i64, #[case] expected: i64) {
        assert_eq!(increment("micro", value), Ok(expected));
    }

    #[test]
    fn increment_refuses_overflow() {
        assert!(matches!(
            increment("micro", i64::MAX),
            Err(VersionError::InvalidVersion(_))
        ));
    }

    #[test]
    fn numbered_rejects_next() {
        assert!(matches!(
            numbered(&Version::next("inctestpkg").unwrap()),
            Err(UpdateError::Version(VersionError::NotPublic(_)))
        ));
    }
}
