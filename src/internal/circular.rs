//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

// Thread-local resolution state for circular dependency detection
thread_local! {
    static RESOLUTION_TLS: RefCell<ResolutionTls> = RefCell::new(ResolutionTls::default());
}

#[derive(Default)]
struct ResolutionTls {
    stack: Vec<TypeKey>,
}

/// Guard for managing the thread-local resolution stack
///
/// Pops its entry on drop, including when the resolution fails part way.
pub(crate) struct StackGuard {
    key: TypeKey,
}

impl StackGuard {
    pub(crate) fn enter(key: TypeKey, max_depth: usize) -> DiResult<Self> {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();

            // Circular detection BEFORE pushing the new key
            if tls.stack.contains(&key) {
                let mut path: Vec<&'static str> = tls.stack.iter().map(TypeKey::name).collect();
                path.push(key.name());
                return Err(DiError::Circular(path));
            }

            if tls.stack.len() >= max_depth {
                return Err(DiError::DepthExceeded(max_depth));
            }

            tls.stack.push(key);
            Ok(())
        })?;

        Ok(Self { key })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();
            if let Some(last) = tls.stack.pop() {
                debug_assert_eq!(last, self.key);
            }
        });
    }
}

/// Execute a closure with circular dependency detection
pub(crate) fn with_resolution_guard<T, F>(key: TypeKey, max_depth: usize, f: F) -> DiResult<T>
where
    F: FnOnce() -> DiResult<T>,
{
    let _guard = StackGuard::enter(key, max_depth)?;
    f()
}
