//! The release version value and its ordering

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use pep508_rs::pep440_rs;

use crate::config::NEXT_MARKER;
use crate::version::error::VersionError;

/// Major component of a version: a number, or the `NEXT` placeholder
///
/// `Next` sorts above every numbered release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Major {
    Release(u64),
    Next,
}

impl fmt::Display for Major {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Major::Release(n) => write!(f, "{n}"),
            Major::Next => f.write_str(NEXT_MARKER),
        }
    }
}

/// Optional qualifiers passed to the validating constructors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qualifiers {
    pub release_candidate: Option<i64>,
    pub post: Option<i64>,
    pub dev: Option<i64>,
}

impl Qualifiers {
    pub fn release_candidate(rc: i64) -> Self {
        Self {
            release_candidate: Some(rc),
            ..Self::default()
        }
    }

    pub fn post(post: i64) -> Self {
        Self {
            post: Some(post),
            ..Self::default()
        }
    }

    pub fn dev(dev: i64) -> Self {
        Self {
            dev: Some(dev),
            ..Self::default()
        }
    }

    pub fn with_post(self, post: i64) -> Self {
        Self {
            post: Some(post),
            ..self
        }
    }

    pub fn with_dev(self, dev: i64) -> Self {
        Self {
            dev: Some(dev),
            ..self
        }
    }
}

/// A project's release identity
///
/// Immutable once built. Equality and ordering ignore the case of the package
/// name; versions of different packages do not compare.
#[derive(Debug, Clone)]
pub struct Version {
    package: String,
    major: Major,
    minor: u64,
    micro: u64,
    release_candidate: Option<u64>,
    post: Option<u64>,
    dev: Option<u64>,
}

/// Absent release candidates and dev numbers sort after every present one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Slot {
    Value(u64),
    Absent,
}

impl Slot {
    fn of(value: Option<u64>) -> Self {
        value.map_or(Slot::Absent, Slot::Value)
    }
}

type SortKey = (Major, u64, u64, Slot, Option<u64>, Slot);

impl Version {
    /// Builds a numbered version, rejecting negative components.
    pub fn new(
        package: impl Into<String>,
        major: i64,
        minor: i64,
        micro: i64,
        qualifiers: Qualifiers,
    ) -> Result<Self, VersionError> {
        let major = Major::Release(component("major", major)?);
        Self::from_parts(package, major, minor, micro, qualifiers)
    }

    /// The `NEXT` placeholder version of `package`.
    ///
    /// Fails like [`Version::new`] when the package name is empty.
    pub fn next(package: impl Into<String>) -> Result<Self, VersionError> {
        Self::from_parts(package, Major::Next, 0, 0, Qualifiers::default())
    }

    /// Validating constructor shared by [`Version::new`], the string parser and
    /// the declaration reader.
    ///
    /// A `NEXT` version carries no other information, so any non-zero
    /// component or qualifier next to it is rejected.
    pub fn from_parts(
        package: impl Into<String>,
        major: Major,
        minor: i64,
        micro: i64,
        qualifiers: Qualifiers,
    ) -> Result<Self, VersionError> {
        let package = package.into();
        if package.trim().is_empty() {
            return Err(VersionError::InvalidVersion(
                "package name is required".to_string(),
            ));
        }

        let minor = component("minor", minor)?;
        let micro = component("micro", micro)?;
        let release_candidate =
            optional_component("release_candidate", qualifiers.release_candidate)?;
        let post = optional_component("post", qualifiers.post)?;
        let dev = optional_component("dev", qualifiers.dev)?;

        if major == Major::Next
            && (minor != 0
                || micro != 0
                || release_candidate.is_some()
                || post.is_some()
                || dev.is_some())
        {
            return Err(VersionError::InvalidVersion(format!(
                "when using {NEXT_MARKER}, all other values except package must be 0"
            )));
        }

        Ok(Self {
            package,
            major,
            minor,
            micro,
            release_candidate,
            post,
            dev,
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn major(&self) -> Major {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn micro(&self) -> u64 {
        self.micro
    }

    pub fn release_candidate(&self) -> Option<u64> {
        self.release_candidate
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    pub fn is_next(&self) -> bool {
        self.major == Major::Next
    }

    /// Public version string, e.g. `1.2.3`, `1.2.3rc1`, `1.2.3rc1.post2.dev3`
    ///
    /// Qualifiers always appear in the order release candidate, post, dev.
    /// `post` and `dev` take a leading dot: this is the PEP 440 normalised
    /// spelling, so the string is accepted unchanged by Python packaging tools.
    pub fn short_string(&self) -> String {
        let Major::Release(major) = self.major else {
            return NEXT_MARKER.to_string();
        };

        let mut s = format!("{}.{}.{}", major, self.minor, self.micro);
        if let Some(rc) = self.release_candidate {
            s.push_str(&format!("rc{rc}"));
        }
        if let Some(post) = self.post {
            s.push_str(&format!(".post{post}"));
        }
        if let Some(dev) = self.dev {
            s.push_str(&format!(".dev{dev}"));
        }
        s
    }

    /// Human readable form used in warning messages: `[package, version 1.2.3]`
    pub fn full_string(&self) -> String {
        format!("[{}, version {}]", self.package, self.short_string())
    }

    /// Package name followed by the public version: `package 1.2.3`
    pub fn version_string(&self) -> String {
        format!("{} {}", self.package, self.short_string())
    }

    /// Rust expression that builds this version, e.g.
    /// `Version::new("widgetbox", 1, 2, 3, Qualifiers::release_candidate(1))`
    /// or `Version::next("widgetbox")`. Both forms return a `Result`.
    pub fn constructor_expr(&self) -> String {
        let Major::Release(major) = self.major else {
            return format!("Version::next({:?})", self.package);
        };

        let mut qualifiers: Option<String> = None;
        for (name, value) in [
            ("release_candidate", self.release_candidate),
            ("post", self.post),
            ("dev", self.dev),
        ] {
            let Some(value) = value else { continue };
            qualifiers = Some(match qualifiers {
                None => format!("Qualifiers::{name}({value})"),
                Some(chain) => format!("{chain}.with_{name}({value})"),
            });
        }

        format!(
            "Version::new({:?}, {}, {}, {}, {})",
            self.package,
            major,
            self.minor,
            self.micro,
            qualifiers.unwrap_or_else(|| "Qualifiers::default()".to_string())
        )
    }

    /// Converts to a PEP 440 version. `NEXT` has no public number and fails.
    pub fn to_pep440(&self) -> Result<pep440_rs::Version, VersionError> {
        if self.is_next() {
            return Err(VersionError::NotPublic(self.package.clone()));
        }
        pep440_rs::Version::from_str(&self.short_string())
            .map_err(|e| VersionError::InvalidVersion(e.to_string()))
    }

    /// Package names are compared case-insensitively.
    pub fn same_package(&self, other: &Version) -> bool {
        self.package.to_lowercase() == other.package.to_lowercase()
    }

    /// Total order over versions of one package.
    pub fn compare(&self, other: &Version) -> Result<Ordering, VersionError> {
        if !self.same_package(other) {
            return Err(VersionError::Incomparable {
                left: self.package.clone(),
                right: other.package.clone(),
            });
        }
        Ok(self.sort_key().cmp(&other.sort_key()))
    }

    fn sort_key(&self) -> SortKey {
        (
            self.major,
            self.minor,
            self.micro,
            Slot::of(self.release_candidate),
            self.post,
            Slot::of(self.dev),
        )
    }
}

fn component(name: &str, value: i64) -> Result<u64, VersionError> {
    u64::try_from(value).map_err(|_| {
        VersionError::InvalidVersion(format!("{name} must be non-negative, got {value}"))
    })
}

fn optional_component(name: &str, value: Option<i64>) -> Result<Option<u64>, VersionError> {
    value.map(|v| component(name, v)).transpose()
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.same_package(other) && self.sort_key() == other.sort_key()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package.to_lowercase().hash(state);
        self.sort_key().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_string())
    }
}
