//! Parsing of public version strings

use std::sync::LazyLock;

use regex::Regex;

use crate::config::NEXT_MARKER;
use crate::version::error::VersionError;
use crate::version::value::{Qualifiers, Version};

/// `1.2.3`, optionally followed by `rcN` (or the older `preN`), `postN` and
/// `devN` in that order. Each qualifier may be preceded by a dot.
static PUBLIC_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<major>\d+)\.(?P<minor>\d+)\.(?P<micro>\d+)(?:\.?(?:rc|pre)(?P<rc>\d+))?(?:\.?post(?P<post>\d+))?(?:\.?dev(?P<dev>\d+))?$",
    )
    .expect("public version pattern is valid")
});

impl Version {
    /// Parse a public version string for `package`.
    ///
    /// Examples:
    /// - "1.2.3" -> 1.2.3
    /// - "1.2.3rc1.dev4" -> 1.2.3rc1.dev4
    /// - "1.2.3pre1" -> 1.2.3rc1
    /// - "NEXT" -> the placeholder version
    pub fn parse(package: impl Into<String>, text: &str) -> Result<Self, VersionError> {
        let text = text.trim();

        if text == NEXT_MARKER {
            return Version::next(package);
        }

        let caps = PUBLIC_VERSION
            .captures(text)
            .ok_or_else(|| VersionError::InvalidVersion(format!("unrecognised version {text:?}")))?;

        let number = |name: &str| -> Result<Option<i64>, VersionError> {
            caps.name(name)
                .map(|m| {
                    m.as_str().parse::<i64>().map_err(|e| {
                        VersionError::InvalidVersion(format!("{name} in {text:?}: {e}"))
                    })
                })
                .transpose()
        };

        let major = number("major")?.unwrap_or_default();
        let minor = number("minor")?.unwrap_or_default();
        let micro = number("micro")?.unwrap_or_default();
        let qualifiers = Qualifiers {
            release_candidate: number("rc")?,
            post: number("post")?,
            dev: number("dev")?,
        };

        Version::new(package, major, minor, micro, qualifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::value::Major;
    use rstest::rstest;

    fn widgetbox(major: i64, minor: i64, micro: i64, qualifiers: Qualifiers) -> Version {
        Version::new("widgetbox", major, minor, micro, qualifiers).unwrap()
    }

    #[rstest]
    #[case("1.2.3", widgetbox(1, 2, 3, Qualifiers::default()))]
    #[case("16.8.0", widgetbox(16, 8, 0, Qualifiers::default()))]
    #[case("1.2.3rc1", widgetbox(1, 2, 3, Qualifiers::release_candidate(1)))]
    #[case("1.2.3pre1", widgetbox(1, 2, 3, Qualifiers::release_candidate(1)))]
    #[case("1.2.3.rc1", widgetbox(1, 2, 3, Qualifiers::release_candidate(1)))]
    #[case("1.2.3.post2", widgetbox(1, 2, 3, Qualifiers::post(2)))]
    #[case("1.2.3post2", widgetbox(1, 2, 3, Qualifiers::post(2)))]
    #[case("1.2.3.dev0", widgetbox(1, 2, 3, Qualifiers::dev(0)))]
    #[case("14.2.1rc1dev9", widgetbox(14, 2, 1, Qualifiers::release_candidate(1).with_dev(9)))]
    #[case(
        "1.2.3rc1.post2.dev3",
        widgetbox(1, 2, 3, Qualifiers::release_candidate(1).with_post(2).with_dev(3))
    )]
    #[case(" 1.2.3 ", widgetbox(1, 2, 3, Qualifiers::default()))]
    #[case("NEXT", Version::next("widgetbox").unwrap())]
    fn parse_accepts_public_versions(#[case] text: &str, #[case] expected: Version) {
        assert_eq!(Version::parse("widgetbox", text).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("1")]
    #[case("1.2")]
    #[case("1.2.3.4")]
    #[case("-1.2.3")]
    #[case("1.2.3beta1")]
    #[case("1.2.3.dev1rc1")] // qualifiers out of order
    #[case("next")]
    #[case("99999999999999999999.0.0")]
    fn parse_rejects_malformed_versions(#[case] text: &str) {
        assert!(matches!(
            Version::parse("widgetbox", text),
            Err(VersionError::InvalidVersion(_))
        ));
    }

    #[rstest]
    #[case(Qualifiers::default())]
    #[case(Qualifiers::release_candidate(7))]
    #[case(Qualifiers::post(1).with_dev(2))]
    #[case(Qualifiers::release_candidate(1).with_post(2).with_dev(3))]
    fn short_string_parses_back_to_same_version(#[case] qualifiers: Qualifiers) {
        let original = widgetbox(3, 14, 15, qualifiers);
        let reparsed = Version::parse("widgetbox", &original.short_string()).unwrap();

        assert_eq!(reparsed, original);
        assert_eq!(
            (reparsed.major(), reparsed.minor(), reparsed.micro()),
            (Major::Release(3), 14, 15)
        );
    }
}
