//! Process-wide warning channel
//!
//! Deprecation wrappers hand their warnings to the installed [`WarningSink`]
//! (by default [`TracingSink`]). The [`WarningPolicy`] decides whether a call
//! site warns once, every time, or never.

use std::collections::HashSet;
use std::panic::Location;
use std::sync::{Arc, LazyLock, Mutex, PoisonError, RwLock};

#[cfg(test)]
use mockall::automock;
use tracing::warn;

use crate::config::WarningPolicy;

/// Target used for deprecation warnings logged through `tracing`
pub const DEPRECATION_TARGET: &str = "deprecation";

/// A single deprecation warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    /// Where the deprecated symbol was used
    pub location: &'static Location<'static>,
}

/// Receiver for deprecation warnings
#[cfg_attr(test, automock)]
pub trait WarningSink: Send + Sync {
    fn emit(&self, warning: &Warning);
}

/// Logs warnings with `tracing::warn!` on the `deprecation` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn emit(&self, warning: &Warning) {
        warn!(
            target: DEPRECATION_TARGET,
            file = warning.location.file(),
            line = warning.location.line(),
            "{}",
            warning.message
        );
    }
}

/// Keeps every warning in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    warnings: Mutex<Vec<Warning>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|w| w.message.clone()).collect()
    }

    /// Removes and returns the recorded warnings
    pub fn take(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Warning>> {
        self.warnings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WarningSink for RecordingSink {
    fn emit(&self, warning: &Warning) {
        self.lock().push(warning.clone());
    }
}

static SINK: LazyLock<RwLock<Arc<dyn WarningSink>>> =
    LazyLock::new(|| RwLock::new(Arc::new(TracingSink)));

static POLICY: LazyLock<RwLock<WarningPolicy>> =
    LazyLock::new(|| RwLock::new(WarningPolicy::from_env()));

type SeenKey = (&'static Location<'static>, String);

static SEEN: LazyLock<Mutex<HashSet<SeenKey>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// The currently installed sink
pub fn warning_sink() -> Arc<dyn WarningSink> {
    SINK.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Install `sink`, returning the previous one
pub fn set_warning_sink(sink: Arc<dyn WarningSink>) -> Arc<dyn WarningSink> {
    let mut guard = SINK.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *guard, sink)
}

pub fn warning_policy() -> WarningPolicy {
    *POLICY.read().unwrap_or_else(PoisonError::into_inner)
}

/// Change the policy, returning the previous one. Forgets which call sites
/// already warned.
pub fn set_warning_policy(policy: WarningPolicy) -> WarningPolicy {
    let previous = {
        let mut guard = POLICY.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, policy)
    };
    SEEN.lock().unwrap_or_else(PoisonError::into_inner).clear();
    previous
}

/// Emit a deprecation warning attributed to the caller
#[track_caller]
pub fn warn_deprecated(message: impl Into<String>) {
    emit(message.into(), Location::caller());
}

pub(crate) fn emit(message: String, location: &'static Location<'static>) {
    match warning_policy() {
        WarningPolicy::Ignore => return,
        WarningPolicy::Once => {
            let mut seen = SEEN.lock().unwrap_or_else(PoisonError::into_inner);
            if !seen.insert((location, message.clone())) {
                return;
            }
        }
        WarningPolicy::Always => {}
    }

    warning_sink().emit(&Warning { message, location });
}

/// Records warnings until dropped, then restores the previous sink and policy
///
/// ```
/// use incremental::config::WarningPolicy;
/// use incremental::deprecate::{WarningCapture, warn_deprecated};
///
/// let capture = WarningCapture::start(WarningPolicy::Always);
/// warn_deprecated("old_api was deprecated in [widgetbox, version 1.0.0]");
/// assert_eq!(capture.messages().len(), 1);
/// ```
pub struct WarningCapture {
    sink: Arc<RecordingSink>,
    previous_sink: Option<Arc<dyn WarningSink>>,
    previous_policy: WarningPolicy,
}

impl WarningCapture {
    pub fn start(policy: WarningPolicy) -> Self {
        let sink = Arc::new(RecordingSink::new());
        let previous_sink = set_warning_sink(sink.clone());
        let previous_policy = set_warning_policy(policy);
        Self {
            sink,
            previous_sink: Some(previous_sink),
            previous_policy,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sink.messages()
    }

    pub fn take(&self) -> Vec<Warning> {
        self.sink.take()
    }
}

impl Drop for WarningCapture {
    fn drop(&mut self) {
        if let Some(previous) = self.previous_sink.take() {
            set_warning_sink(previous);
        }
        set_warning_policy(self.previous_policy);
    }
}
