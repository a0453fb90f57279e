//! Deprecation messages and documentation notices

use crate::version::value::Version;

/// The version a symbol was deprecated in, and what to use instead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    version: Version,
    replacement: Option<String>,
}

impl DeprecationNotice {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            replacement: None,
        }
    }

    pub fn with_replacement(self, replacement: impl Into<String>) -> Self {
        Self {
            replacement: Some(replacement.into()),
            ..self
        }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn replacement(&self) -> Option<&str> {
        self.replacement.as_deref()
    }

    /// Warning text for `name`, e.g.
    /// `widgets.old_api was deprecated in [widgetbox, version 1.2.3]; please use new_api instead`
    pub fn warning_string(&self, name: &str) -> String {
        let mut message = format!(
            "{} was deprecated in {}",
            name,
            self.version.full_string()
        );
        if let Some(replacement) = &self.replacement {
            message.push_str(&format!("; please use {replacement} instead"));
        }
        message
    }

    /// The sentence appended to deprecated symbols' documentation
    pub fn docs_notice(&self) -> String {
        match &self.replacement {
            Some(replacement) => format!(
                "Deprecated in {}; please use {} instead.",
                self.version.version_string(),
                replacement
            ),
            None => format!("Deprecated in {}.", self.version.version_string()),
        }
    }

    /// Append the deprecation notice to `docs` as its own paragraph
    pub fn amend_docs(&self, docs: &str) -> String {
        let docs = docs.trim_end();
        if docs.is_empty() {
            self.docs_notice()
        } else {
            format!("{docs}\n\n{}", self.docs_notice())
        }
    }
}
