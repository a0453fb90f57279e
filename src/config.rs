use serde::Deserialize;

// =============================================================================
// Declaration file layout
// =============================================================================

/// Name of the per-package version declaration file
pub const VERSION_FILE_NAME: &str = "_version.toml";

/// Table inside the declaration file that holds the version
pub const VERSION_TABLE: &str = "version";

/// Placeholder major version for a release that has not been numbered yet
pub const NEXT_MARKER: &str = "NEXT";

/// Calendar versions count years from here (2016 -> 16)
pub const YEAR_START: i32 = 2000;

// =============================================================================
// Logging
// =============================================================================

/// Filter used when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "incremental=info,deprecation=warn";

/// Environment variable selecting the deprecation warning policy
pub const WARNING_POLICY_ENV: &str = "INCREMENTAL_WARNINGS";

/// How often a deprecated symbol warns
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WarningPolicy {
    /// Warn the first time each call site touches a deprecated symbol
    #[default]
    Once,
    /// Warn on every use
    Always,
    /// Never warn
    Ignore,
}

impl WarningPolicy {
    /// Reads the policy from `INCREMENTAL_WARNINGS`, falling back to [`WarningPolicy::Once`].
    pub fn from_env() -> Self {
        policy_from_value(std::env::var(WARNING_POLICY_ENV).ok())
    }
}

fn policy_from_value(value: Option<String>) -> WarningPolicy {
    value
        .and_then(|v| serde_json::from_value(serde_json::Value::String(v.to_lowercase())).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn warning_policy_deserializes_lowercase_names() {
        let result = serde_json::from_value::<Vec<WarningPolicy>>(json!([
            "once", "always", "ignore"
        ]))
        .unwrap();

        assert_eq!(
            result,
            vec![
                WarningPolicy::Once,
                WarningPolicy::Always,
                WarningPolicy::Ignore
            ]
        );
    }

    #[rstest]
    #[case(Some("always"), WarningPolicy::Always)]
    #[case(Some("IGNORE"), WarningPolicy::Ignore)]
    #[case(Some("once"), WarningPolicy::Once)]
    #[case(Some("sometimes"), WarningPolicy::Once)]
    #[case(None, WarningPolicy::Once)]
    fn policy_from_value_falls_back_to_once(
        #[case] value: Option<&str>,
        #[case] expected: WarningPolicy,
    ) {
        assert_eq!(policy_from_value(value.map(str::to_string)), expected);
    }
}
