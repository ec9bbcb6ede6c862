//! Disposal trait for resource cleanup.

use crate::error::DiResult;

/// Trait for synchronous resource disposal.
///
/// Implement this trait for services that need structured teardown (e.g.,
/// flushing caches, closing connections) and register the type as
/// disposable with the catalog, or wrap instances with
/// [`Value::disposable`](crate::Value::disposable). The container calls
/// `dispose` exactly once when the owning scope or provider releases the
/// instance. A failing disposer does not stop the remaining ones.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{Dispose, DiResult, Lifetime, Resolver, ServiceCollection, ServiceDescriptor, TypeDef, Signature};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// static FLUSHED: AtomicBool = AtomicBool::new(false);
///
/// struct Cache;
///
/// impl Dispose for Cache {
///     fn dispose(&self) -> DiResult<()> {
///         FLUSHED.store(true, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.register_type(
///     TypeDef::class::<Cache>()
///         .constructor(Signature::new(), |_| Ok(Cache))
///         .disposable(),
/// );
/// services.add(ServiceDescriptor::scoped::<Cache, Cache>(), false);
///
/// let provider = services.build();
/// let mut scope = provider.create_scope();
/// scope.get::<Cache>().unwrap();
/// scope.dispose().unwrap();
/// assert!(FLUSHED.load(Ordering::SeqCst));
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self) -> DiResult<()>;
}
