//! Deprecation of module-level attributes
//!
//! [`ModuleAttributes`] is an explicit lookup proxy: the module registers its
//! attributes once, marks the deprecated ones, and every read goes through
//! [`ModuleAttributes::get`].
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use incremental::deprecate::{DeprecationNotice, ModuleAttributes};
//! use incremental::version::{Qualifiers, Version};
//!
//! static ATTRIBUTES: LazyLock<ModuleAttributes<&'static str>> = LazyLock::new(|| {
//!     let mut attributes = ModuleAttributes::new("widgetbox.colours");
//!     attributes.insert("bad_attribute", "some value");
//!     attributes.insert("good_attribute", "some value");
//!     let version = Version::new("widgetbox", 8, 0, 0, Qualifiers::default()).unwrap();
//!     attributes
//!         .deprecate_attribute(
//!             DeprecationNotice::new(version),
//!             "Use good_attribute instead.",
//!             "bad_attribute",
//!         )
//!         .unwrap();
//!     attributes
//! });
//!
//! assert_eq!(ATTRIBUTES.get("bad_attribute"), Some(&"some value"));
//! ```

use std::panic::Location;

use indexmap::IndexMap;
use thiserror::Error;

use crate::deprecate::notice::DeprecationNotice;
use crate::deprecate::sink::emit;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    #[error("module {module:?} has no attribute {name:?}")]
    Unknown { module: String, name: String },
}

#[derive(Debug, Clone)]
struct Attribute<V> {
    value: V,
    deprecation: Option<(DeprecationNotice, String)>,
}

/// Attribute table of one module
#[derive(Debug, Clone)]
pub struct ModuleAttributes<V> {
    module: String,
    attributes: IndexMap<String, Attribute<V>>,
}

impl<V> ModuleAttributes<V> {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Register `name`, returning the value it replaced
    ///
    /// Replacing a value keeps an existing deprecation.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        match self.attributes.get_mut(&name) {
            Some(attribute) => Some(std::mem::replace(&mut attribute.value, value)),
            None => {
                self.attributes.insert(
                    name,
                    Attribute {
                        value,
                        deprecation: None,
                    },
                );
                None
            }
        }
    }

    /// Mark an already registered attribute as deprecated
    ///
    /// `message` is appended to the warning, e.g. "Use good_attribute instead.".
    pub fn deprecate_attribute(
        &mut self,
        notice: DeprecationNotice,
        message: impl Into<String>,
        name: &str,
    ) -> Result<(), AttributeError> {
        let attribute = self
            .attributes
            .get_mut(name)
            .ok_or_else(|| AttributeError::Unknown {
                module: self.module.clone(),
                name: name.to_string(),
            })?;
        attribute.deprecation = Some((notice, message.into()));
        Ok(())
    }

    pub fn is_deprecated(&self, name: &str) -> bool {
        self.attributes
            .get(name)
            .is_some_and(|a| a.deprecation.is_some())
    }

    /// Read an attribute, warning first if it is deprecated
    #[track_caller]
    pub fn get(&self, name: &str) -> Option<&V> {
        let attribute = self.attributes.get(name)?;
        if let Some((notice, message)) = &attribute.deprecation {
            emit(self.warning(name, notice, message), Location::caller());
        }
        Some(&attribute.value)
    }

    /// Attribute names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    fn warning(&self, name: &str, notice: &DeprecationNotice, message: &str) -> String {
        let fqpn = format!("{}.{}", self.module, name);
        let warning = notice.warning_string(&fqpn);
        if message.is_empty() {
            warning
        } else {
            format!("{warning}: {message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WarningPolicy;
    use crate::deprecate::sink::WarningCapture;
    use crate::version::value::{Qualifiers, Version};
    use serial_test::serial;

    fn attributes() -> ModuleAttributes<i32> {
        let mut attributes = ModuleAttributes::new("widgetbox.limits");
        attributes.insert("OLD_LIMIT", 10);
        attributes.insert("LIMIT", 20);
        attributes
            .deprecate_attribute(
                DeprecationNotice::new(
                    Version::new("widgetbox", 8, 0, 0, Qualifiers::default()).unwrap(),
                ),
                "Use LIMIT instead.",
                "OLD_LIMIT",
            )
            .unwrap();
        attributes
    }

    #[test]
    #[serial]
    fn get_deprecated_attribute_warns_then_returns_value() {
        let capture = WarningCapture::start(WarningPolicy::Always);
        let attributes = attributes();

        assert_eq!(attributes.get("OLD_LIMIT"), Some(&10));

        assert_eq!(
            capture.messages(),
            vec![
                "widgetbox.limits.OLD_LIMIT was deprecated in [widgetbox, version 8.0.0]: Use LIMIT instead."
                    .to_string()
            ]
        );
    }

    #[test]
    #[serial]
    fn get_regular_attribute_does_not_warn() {
        let capture = WarningCapture::start(WarningPolicy::Always);
        let attributes = attributes();

        assert_eq!(attributes.get("LIMIT"), Some(&20));
        assert_eq!(attributes.get("MISSING"), None);

        assert!(capture.messages().is_empty());
    }

    #[test]
    fn deprecate_unknown_attribute_fails() {
        let mut attributes = attributes();
        let notice = DeprecationNotice::new(Version::next("widgetbox").unwrap());

        assert_eq!(
            attributes.deprecate_attribute(notice, "", "NOPE"),
            Err(AttributeError::Unknown {
                module: "widgetbox.limits".to_string(),
                name: "NOPE".to_string()
            })
        );
    }

    #[test]
    fn insert_keeps_deprecation_and_order() {
        let mut attributes = attributes();

        assert_eq!(attributes.insert("OLD_LIMIT", 11), Some(10));
        assert!(attributes.is_deprecated("OLD_LIMIT"));
        assert!(!attributes.is_deprecated("LIMIT"));
        assert_eq!(attributes.names().collect::<Vec<_>>(), vec!["OLD_LIMIT", "LIMIT"]);
    }

    #[test]
    #[serial]
    fn empty_message_is_omitted() {
        let capture = WarningCapture::start(WarningPolicy::Always);
        let mut attributes = attributes();
        attributes
            .deprecate_attribute(DeprecationNotice::new(Version::next("widgetbox").unwrap()), "", "LIMIT")
            .unwrap();

        attributes.get("LIMIT");

        assert_eq!(
            capture.messages(),
            vec!["widgetbox.limits.LIMIT was deprecated in [widgetbox, version NEXT]".to_string()]
        );
    }
}
