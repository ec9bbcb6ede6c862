//! Diagnostic observers for resolution events.
//!
//! Observers see every service resolution that goes through a provider or
//! a scope: when it starts, how long it took, and why it failed. They are
//! registered on the [`ServiceCollection`](crate::ServiceCollection) and
//! shared by every resolver built from it.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::TypeKey;

/// Observer for resolution events.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{DiError, DiObserver, Resolver, ServiceCollection, ServiceDescriptor, TypeKey};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, key: &TypeKey) {
///         self.0.lock().unwrap().push(format!("start {}", key.name()));
///     }
///     fn resolved(&self, key: &TypeKey, _duration: Duration) {
///         self.0.lock().unwrap().push(format!("done {}", key.name()));
///     }
///     fn resolution_failed(&self, key: &TypeKey, _error: &DiError) {
///         self.0.lock().unwrap().push(format!("failed {}", key.name()));
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let mut services = ServiceCollection::new();
/// services.add(ServiceDescriptor::instance(7u8), false);
/// services.add_observer(recorder.clone());
///
/// let provider = services.build();
/// provider.get::<u8>().unwrap();
///
/// let events = recorder.0.lock().unwrap();
/// assert_eq!(events.as_slice(), ["start u8", "done u8"]);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a registered service is looked up and built.
    fn resolving(&self, key: &TypeKey);

    /// Called after a registered service resolved successfully.
    ///
    /// `duration` covers the whole resolution, nested dependencies included.
    fn resolved(&self, key: &TypeKey, duration: Duration);

    /// Called when resolving a registered service failed.
    fn resolution_failed(&self, key: &TypeKey, error: &DiError) {
        let _ = (key, error);
    }
}

/// Observer forwarding every event to `tracing`.
///
/// Starts and completions are emitted at `debug`, failures at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, key: &TypeKey) {
        tracing::debug!(service = key.name(), "resolving");
    }

    fn resolved(&self, key: &TypeKey, duration: Duration) {
        tracing::debug!(service = key.name(), elapsed_us = duration.as_micros() as u64, "resolved");
    }

    fn resolution_failed(&self, key: &TypeKey, error: &DiError) {
        tracing::warn!(service = key.name(), %error, "resolution failed");
    }
}

/// Collection of observers for the DI container.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    /// Returns true if any observers are registered.
    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &TypeKey) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &TypeKey, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn resolution_failed(&self, key: &TypeKey, error: &DiError) {
        for observer in &self.observers {
            observer.resolution_failed(key, error);
        }
    }

    /// Runs `resolve` between the start and end notifications.
    pub(crate) fn observe<T>(&self, key: TypeKey, resolve: impl FnOnce() -> Result<T, DiError>) -> Result<T, DiError> {
        if !self.has_observers() {
            return resolve();
        }
        let start = std::time::Instant::now();
        self.resolving(&key);
        let result = resolve();
        match &result {
            Ok(_) => self.resolved(&key, start.elapsed()),
            Err(error) => self.resolution_failed(&key, error),
        }
        result
    }
}
