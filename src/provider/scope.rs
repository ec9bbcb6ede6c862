//! Scoped service resolution and disposal.

use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use super::ServiceProvider;
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::factory::ObjectFactory;
use crate::internal::{with_resolution_guard, DisposeBag};
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::traits::ResolverCore;
use crate::value::Value;

/// Scoped service container for request-scoped dependency resolution.
///
/// # Lifetime Behavior
///
/// - **Singleton**: Resolved and cached in the root provider (shared across all scopes)
/// - **Scoped**: Resolved and cached within this specific scope
/// - **Transient**: Created fresh on every resolution (no caching)
///
/// Dependencies of Scoped and Transient services resolve through the
/// scope; dependencies of Singletons resolve through the root.
///
/// Disposing the scope (explicitly or on drop) disposes its Scoped
/// instances in reverse creation order, exactly once.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{Resolver, ServiceCollection, ServiceDescriptor};
/// use std::sync::Arc;
///
/// struct DatabaseConnection(String);
/// struct UserService { db: Arc<DatabaseConnection> }
///
/// let mut collection = ServiceCollection::new();
/// collection.add(ServiceDescriptor::scoped_factory(|_| Ok(DatabaseConnection("connection-123".into()))), false);
/// collection.add(
///     ServiceDescriptor::transient_factory(|resolver| Ok(UserService { db: resolver.get::<DatabaseConnection>()? })),
///     false,
/// );
///
/// let provider = collection.build();
/// let scope = provider.create_scope();
///
/// // Multiple services in the same scope share the same DB connection
/// let user1 = scope.get::<UserService>().unwrap();
/// let user2 = scope.get::<UserService>().unwrap();
/// assert!(Arc::ptr_eq(&user1.db, &user2.db));
/// assert_eq!(user1.db.0, "connection-123");
/// ```
pub struct Scope {
    root: ServiceProvider,
    // Slot-based scoped storage for O(1) access
    scoped_cells: Box<[OnceCell<Value>]>,
    disposers: Mutex<DisposeBag>,
    disposed: AtomicBool,
}

impl Scope {
    pub(crate) fn new(root: ServiceProvider) -> Self {
        let scoped_cells = (0..root.registry().scoped_count())
            .map(|_| OnceCell::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        tracing::trace!(slots = scoped_cells.len(), "created scope");
        Self {
            root,
            scoped_cells,
            disposers: Mutex::new(DisposeBag::default()),
            disposed: AtomicBool::new(false),
        }
    }

    /// The provider this scope was created from.
    pub fn service_provider(&self) -> &ServiceProvider {
        &self.root
    }

    /// Creates a sibling scope with fresh Scoped state.
    pub fn create_scope(&self) -> Scope {
        self.root.create_scope()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Disposes every Scoped instance created through this scope, most
    /// recent first.
    ///
    /// All disposers run even if some fail. Afterwards every resolution of
    /// a registered service through this scope fails with
    /// [`DiError::Disposed`]. Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// [`DiError::Disposal`] carrying every disposer failure.
    pub fn dispose(&self) -> DiResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut bag = std::mem::take(&mut *self.disposers.lock());
        let result = bag.run_all_reverse();
        tracing::debug!(ok = result.is_ok(), "disposed scope");
        result
    }

    #[inline]
    fn factory(&self) -> &ObjectFactory {
        self.root.object_factory()
    }

    fn resolve_scoped(&self, key: TypeKey, descriptor: &ServiceDescriptor) -> DiResult<Value> {
        if self.is_disposed() {
            return Err(DiError::Disposed(key.name()));
        }
        let Some(slot) = self.root.registry().scoped_slot(key) else {
            return descriptor.create_instance(self.factory(), Some(self.as_core()));
        };
        let cell = &self.scoped_cells[slot];
        if let Some(value) = cell.get() {
            tracing::trace!(service = key.name(), "scope cache hit");
            return Ok(value.clone());
        }
        cell.get_or_try_init(|| {
            let value = descriptor.create_instance(self.factory(), Some(self.as_core()))?;
            self.disposers.lock().push(&value);
            Ok(value)
        })
        .cloned()
    }

    fn resolve_descriptor(&self, key: TypeKey, descriptor: &ServiceDescriptor) -> DiResult<Value> {
        match descriptor.lifetime() {
            Lifetime::Singleton => self.root.resolve_from_root(descriptor),
            Lifetime::Scoped => self.resolve_scoped(key, descriptor),
            Lifetime::Transient => descriptor.get_instance(self.factory(), Some(self.as_core())),
        }
    }
}

impl ResolverCore for Scope {
    fn try_resolve(&self, key: TypeKey) -> DiResult<Option<Value>> {
        let Some(descriptor) = self.root.registry().lookup(key) else {
            return Ok(None);
        };
        if self.is_disposed() || self.root.is_disposed() {
            return Err(DiError::Disposed(key.name()));
        }
        with_resolution_guard(key, self.root.options().max_depth, || {
            self.root
                .observers()
                .observe(key, || self.resolve_descriptor(key, descriptor))
        })
        .map(Some)
    }

    fn object_factory(&self) -> &ObjectFactory {
        self.root.object_factory()
    }

    fn as_core(&self) -> &dyn ResolverCore {
        self
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            tracing::warn!(error = %err, "scope disposal failed on drop");
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("slots", &self.scoped_cells.len())
            .field("tracking_disposables", &!self.disposers.lock().is_empty())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ServiceCollection;
    use crate::traits::{Dispose, Resolver};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    struct Tracked(Arc<AtomicUsize>);

    impl Dispose for Tracked {
        fn dispose(&self) -> DiResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn provider_with_tracked(count: Arc<AtomicUsize>) -> ServiceProvider {
        let mut services = ServiceCollection::new();
        services.add(
            ServiceDescriptor::with_factory(TypeKey::of::<Tracked>(), Lifetime::Scoped, move |_| {
                Ok(Value::disposable(Tracked(count.clone())))
            }),
            false,
        );
        services.build()
    }

    #[test]
    fn drop_disposes_scoped_instances_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let provider = provider_with_tracked(count.clone());
        {
            let scope = provider.create_scope();
            let first = scope.get::<Tracked>().unwrap();
            let again = scope.get::<Tracked>().unwrap();
            assert!(Arc::ptr_eq(&first, &again));
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disposed_scope_refuses_scoped_services() {
        let count = Arc::new(AtomicUsize::new(0));
        let provider = provider_with_tracked(count);
        let scope = provider.create_scope();
        scope.dispose().unwrap();
        assert!(matches!(scope.get::<Tracked>(), Err(DiError::Disposed(_))));
    }

    #[test]
    fn disposed_scope_refuses_every_lifetime() {
        let mut services = ServiceCollection::new();
        services.add(ServiceDescriptor::transient_factory(|_| Ok(5u32)), false);
        services.add(ServiceDescriptor::singleton_factory(|_| Ok(6u64)), false);
        services.add(ServiceDescriptor::scoped_factory(|_| Ok(7u16)), false);
        let provider = services.build();

        let scope = provider.create_scope();
        assert_eq!(*scope.get::<u32>().unwrap(), 5);
        scope.dispose().unwrap();

        assert!(matches!(scope.get::<u32>(), Err(DiError::Disposed(_))));
        assert!(matches!(scope.get::<u64>(), Err(DiError::Disposed(_))));
        assert!(matches!(scope.get::<u16>(), Err(DiError::Disposed(_))));
        assert!(scope.try_get::<i8>().unwrap().is_none());

        // The root and sibling scopes are unaffected
        assert_eq!(*provider.get::<u64>().unwrap(), 6);
        assert_eq!(*scope.create_scope().get::<u32>().unwrap(), 5);
    }

    #[test]
    fn singletons_are_shared_between_scopes() {
        let mut services = ServiceCollection::new();
        services.add(ServiceDescriptor::singleton_factory(|_| Ok(String::from("shared"))), false);
        let provider = services.build();

        let a = provider.create_scope().get::<String>().unwrap();
        let b = provider.create_scope().get::<String>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &provider.get::<String>().unwrap()));
    }
}
