//! Wrappers that warn when a deprecated callable, type or property is used

use std::panic::Location;

use crate::deprecate::notice::DeprecationNotice;
use crate::deprecate::sink::emit;

/// Wrap a one-argument callable so each call warns before delegating
///
/// The returned closure has the same signature as `f`; callables with more
/// arguments take a tuple. Warnings are attributed to the place `f` was
/// wrapped, so under [`WarningPolicy::Once`](crate::config::WarningPolicy::Once)
/// the wrapper warns once. Use [`Deprecated::call`] to attribute warnings to
/// each call site instead.
#[track_caller]
pub fn deprecate<F, A, R>(name: &str, notice: &DeprecationNotice, f: F) -> impl Fn(A) -> R + use<F, A, R>
where
    F: Fn(A) -> R,
{
    let message = notice.warning_string(name);
    let location = Location::caller();
    move |args| {
        emit(message.clone(), location);
        f(args)
    }
}

/// A deprecated value, callable or constructor
///
/// Every access goes through [`Deprecated::get`] or [`Deprecated::call`],
/// which warn with the caller's location.
#[derive(Debug, Clone)]
pub struct Deprecated<T> {
    name: String,
    notice: DeprecationNotice,
    inner: T,
}

impl<T> Deprecated<T> {
    pub fn new(name: impl Into<String>, notice: DeprecationNotice, inner: T) -> Self {
        Self {
            name: name.into(),
            notice,
            inner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn notice(&self) -> &DeprecationNotice {
        &self.notice
    }

    /// The warning emitted on use
    pub fn message(&self) -> String {
        self.notice.warning_string(&self.name)
    }

    /// `docs` with the deprecation notice appended
    pub fn docs(&self, docs: &str) -> String {
        self.notice.amend_docs(docs)
    }

    #[track_caller]
    pub fn get(&self) -> &T {
        emit(self.message(), Location::caller());
        &self.inner
    }

    #[track_caller]
    pub fn call<A, R>(&self, args: A) -> R
    where
        T: Fn(A) -> R,
    {
        emit(self.message(), Location::caller());
        (self.inner)(args)
    }

    /// Unwrap without warning
    pub fn into_inner(self) -> T {
        self.inner
    }
}

/// A deprecated property: reading and writing both warn
#[derive(Debug, Clone)]
pub struct DeprecatedProperty<T> {
    name: String,
    notice: DeprecationNotice,
    value: T,
}

impl<T> DeprecatedProperty<T> {
    pub fn new(name: impl Into<String>, notice: DeprecationNotice, value: T) -> Self {
        Self {
            name: name.into(),
            notice,
            value,
        }
    }

    pub fn message(&self) -> String {
        self.notice.warning_string(&self.name)
    }

    pub fn docs(&self, docs: &str) -> String {
        self.notice.amend_docs(docs)
    }

    #[track_caller]
    pub fn get(&self) -> &T {
        emit(self.message(), Location::caller());
        &self.value
    }

    #[track_caller]
    pub fn set(&mut self, value: T) {
        emit(self.message(), Location::caller());
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WarningPolicy;
    use crate::deprecate::sink::WarningCapture;
    use crate::version::value::{Qualifiers, Version};
    use serial_test::serial;

    fn notice() -> DeprecationNotice {
        DeprecationNotice::new(
            Version::new("widgetbox", 1, 2, 3, Qualifiers::default()).unwrap(),
        )
    }

    struct Widget {
        size: u32,
    }

    impl Widget {
        fn new(size: u32) -> Self {
            Self { size }
        }
    }

    #[test]
    #[serial]
    fn deprecate_keeps_signature_and_warns_on_call() {
        let capture = WarningCapture::start(WarningPolicy::Always);
        let notice = notice().with_replacement("widgets.sum");
        let add = deprecate("widgets.add", &notice, |(a, b): (i32, i32)| a + b);

        assert_eq!(add((1, 2)), 3);
        assert_eq!(add((3, 4)), 7);

        assert_eq!(
            capture.messages(),
            vec![
                "widgets.add was deprecated in [widgetbox, version 1.2.3]; please use widgets.sum instead"
                    .to_string();
                2
            ]
        );
    }

    #[test]
    #[serial]
    fn deprecate_warns_once_per_wrapper_by_default() {
        let capture = WarningCapture::start(WarningPolicy::Once);
        let double = deprecate("double", &notice(), |x: i32| x * 2);

        for x in 0..5 {
            double(x);
        }

        assert_eq!(capture.messages().len(), 1);
    }

    #[test]
    #[serial]
    fn deprecated_constructor_warns_on_instantiation() {
        let capture = WarningCapture::start(WarningPolicy::Always);
        let widget_new = Deprecated::new("Widget", notice(), Widget::new);

        let widget = widget_new.call(4);

        assert_eq!(widget.size, 4);
        assert_eq!(
            capture.messages(),
            vec!["Widget was deprecated in [widgetbox, version 1.2.3]".to_string()]
        );
    }

    #[test]
    #[serial]
    fn deprecated_get_warns_per_call_site() {
        let capture = WarningCapture::start(WarningPolicy::Once);
        let limit = Deprecated::new("LIMIT", notice(), 10);

        for _ in 0..3 {
            assert_eq!(*limit.get(), 10);
        }
        assert_eq!(*limit.get(), 10);

        assert_eq!(capture.messages().len(), 2);
    }

    #[test]
    #[serial]
    fn into_inner_does_not_warn() {
        let capture = WarningCapture::start(WarningPolicy::Always);
        let limit = Deprecated::new("LIMIT", notice(), 10);

        assert_eq!(limit.into_inner(), 10);
        assert!(capture.messages().is_empty());
    }

    #[test]
    fn deprecated_docs_carry_notice() {
        let limit = Deprecated::new("LIMIT", notice(), 10);
        assert_eq!(
            limit.docs("Maximum widgets."),
            "Maximum widgets.\n\nDeprecated in widgetbox 1.2.3."
        );
    }

    #[test]
    #[serial]
    fn property_getter_and_setter_warn() {
        let capture = WarningCapture::start(WarningPolicy::Always);
        let mut colour = DeprecatedProperty::new("Widget.colour", notice(), "red".to_string());

        colour.set("blue".to_string());
        assert_eq!(colour.get(), "blue");

        assert_eq!(
            capture.messages(),
            vec!["Widget.colour was deprecated in [widgetbox, version 1.2.3]".to_string(); 2]
        );
    }
}
