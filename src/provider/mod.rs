//! Service provider: resolves registered services and owns their
//! Singleton instances.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::ContainerOptions;
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::factory::ObjectFactory;
use crate::internal::with_resolution_guard;
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::observer::Observers;
use crate::registration::ServiceRegistry;
use crate::traits::ResolverCore;
use crate::value::Value;

pub mod context;
pub mod scope;
pub use context::ResolverContext;
pub use scope::Scope;

/// Service provider for resolving dependencies from the container.
///
/// Resolution looks up the descriptor of the requested service type and
/// asks it for its instance, passing the provider along so constructor
/// dependencies resolve recursively. Singleton instances are cached on
/// their descriptors and live until [`dispose`](Self::dispose).
///
/// Scoped services resolved here (outside any [`Scope`]) share one
/// root-level instance, unless
/// [`ContainerOptions::validate_scopes`] turns that into an error.
///
/// The provider is cheap to clone; clones share every cache.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{Resolver, ServiceCollection, ServiceDescriptor};
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct RequestId(u32);
///
/// let mut collection = ServiceCollection::new();
/// let counter = Arc::new(std::sync::atomic::AtomicU32::new(0));
/// let source = counter.clone();
/// collection.add(
///     ServiceDescriptor::scoped_factory(move |_| {
///         Ok(RequestId(source.fetch_add(1, std::sync::atomic::Ordering::SeqCst)))
///     }),
///     false,
/// );
///
/// let provider = collection.build();
///
/// let scope1 = provider.create_scope();
/// let scope2 = provider.create_scope();
///
/// let req1a = scope1.get::<RequestId>().unwrap();
/// let req1b = scope1.get::<RequestId>().unwrap();
/// let req2 = scope2.get::<RequestId>().unwrap();
///
/// assert!(Arc::ptr_eq(&req1a, &req1b));
/// assert!(!Arc::ptr_eq(&req1a, &req2));
/// ```
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    registry: ServiceRegistry,
    factory: ObjectFactory,
    observers: Observers,
    options: ContainerOptions,
    disposed: AtomicBool,
}

impl ServiceProvider {
    pub(crate) fn new(
        registry: ServiceRegistry,
        factory: ObjectFactory,
        observers: Observers,
        options: ContainerOptions,
    ) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                factory,
                observers,
                options,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    #[inline]
    pub(crate) fn registry(&self) -> &ServiceRegistry {
        &self.inner.registry
    }

    #[inline]
    pub(crate) fn observers(&self) -> &Observers {
        &self.inner.observers
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Registration for `service`.
    ///
    /// # Errors
    ///
    /// [`DiError::NotFound`] if the service type is not registered.
    pub fn get_descriptor(&self, service: TypeKey) -> DiResult<Arc<ServiceDescriptor>> {
        self.inner.registry.get(service)
    }

    pub fn try_get_descriptor(&self, service: TypeKey) -> Option<Arc<ServiceDescriptor>> {
        self.inner.registry.try_get(service)
    }

    /// Registrations in insertion order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<ServiceDescriptor>> {
        self.inner.registry.iter()
    }

    /// Creates a new scope for resolving Scoped services.
    ///
    /// Each scope caches its own Scoped instances and disposes them when it
    /// is disposed or dropped; Singletons still come from this provider.
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Disposes every cached instance, most recent registration first.
    ///
    /// Every descriptor is attempted even when some disposers fail. Later
    /// resolutions fail with [`DiError::Disposed`]; disposing twice is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`DiError::Disposal`] carrying every disposer failure.
    pub fn dispose(&self) -> DiResult<()> {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut failures = Vec::new();
        for descriptor in self.inner.registry.iter().rev() {
            if let Err(err) = descriptor.try_dispose() {
                tracing::warn!(service = descriptor.service_type().name(), error = %err, "disposer failed");
                failures.push(err);
            }
        }
        tracing::debug!(failures = failures.len(), "disposed service provider");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DiError::Disposal(failures))
        }
    }

    /// Singleton (or Transient) resolution against the root.
    pub(crate) fn resolve_from_root(&self, descriptor: &ServiceDescriptor) -> DiResult<Value> {
        descriptor.get_instance(&self.inner.factory, Some(self.as_core()))
    }

    fn resolve_descriptor(&self, descriptor: &ServiceDescriptor) -> DiResult<Value> {
        if descriptor.lifetime() == Lifetime::Scoped && self.inner.options.validate_scopes {
            return Err(DiError::WrongLifetime("Cannot resolve scoped service from root provider"));
        }
        self.resolve_from_root(descriptor)
    }
}

impl Clone for ServiceProvider {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for ServiceProvider {
    fn drop(&mut self) {
        // Only the last handle reports
        if Arc::strong_count(&self.inner) != 1 || self.is_disposed() {
            return;
        }
        let pending = self
            .inner
            .registry
            .iter()
            .filter(|descriptor| descriptor.holds_disposable())
            .count();
        if pending > 0 {
            tracing::warn!(pending, "ServiceProvider dropped with undisposed instances; call dispose() before dropping");
        }
    }
}

impl ResolverCore for ServiceProvider {
    fn try_resolve(&self, key: TypeKey) -> DiResult<Option<Value>> {
        let Some(descriptor) = self.inner.registry.lookup(key) else {
            return Ok(None);
        };
        if self.is_disposed() {
            return Err(DiError::Disposed(key.name()));
        }
        with_resolution_guard(key, self.inner.options.max_depth, || {
            self.inner.observers.observe(key, || self.resolve_descriptor(descriptor))
        })
        .map(Some)
    }

    fn object_factory(&self) -> &ObjectFactory {
        &self.inner.factory
    }

    fn as_core(&self) -> &dyn ResolverCore {
        self
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("services", &self.inner.registry.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
