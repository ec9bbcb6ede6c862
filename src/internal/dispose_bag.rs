//! Internal disposal bag for managing cleanup hooks.

use crate::error::{DiError, DiResult};
use crate::value::Value;

/// Container for disposable instances with LIFO execution order.
///
/// Every disposer is attempted even when an earlier one fails; failures
/// are collected into a single [`DiError::Disposal`].
#[derive(Default)]
pub(crate) struct DisposeBag {
    values: Vec<Value>,
}

impl DisposeBag {
    /// Track a value; values without a disposal hook are ignored.
    pub(crate) fn push(&mut self, value: &Value) {
        if value.is_disposable() {
            self.values.push(value.clone());
        }
    }

    /// Dispose every tracked value in reverse order (LIFO).
    pub(crate) fn run_all_reverse(&mut self) -> DiResult<()> {
        let mut failures = Vec::new();
        while let Some(value) = self.values.pop() {
            if let Err(err) = value.dispose() {
                tracing::warn!(type_name = value.type_key().name(), error = %err, "disposer failed");
                failures.push(err);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DiError::Disposal(failures))
        }
    }

    /// Check if the bag is empty (no disposers registered).
    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
