//! Registration records binding a service type to how it is built.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::arguments::Arguments;
use crate::catalog::TypeKind;
use crate::error::{DiError, DiResult};
use crate::factory::ObjectFactory;
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::traits::ResolverCore;
use crate::value::Value;

/// Factory closure stored by factory-backed descriptors.
pub type ServiceFactory = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<Value> + Send + Sync>;

/// How a descriptor produces its instance.
#[derive(Clone)]
pub enum Implementation {
    /// Activated through the object factory.
    Type(TypeKey),
    /// Built by a user closure.
    Factory(ServiceFactory),
    /// Supplied at registration; the instance lives in the descriptor.
    Instance,
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Type(key) => write!(f, "Type({})", key.name()),
            Implementation::Factory(_) => f.write_str("Factory"),
            Implementation::Instance => f.write_str("Instance"),
        }
    }
}

/// Service descriptor: service type, implementation strategy and lifetime
///
/// Singleton and Scoped descriptors cache the instance they build. A
/// Scoped descriptor drops (and disposes) its cached instance on
/// [`exit_scope`](Self::exit_scope), so the next resolution builds anew.
/// Instance descriptors are always Singletons.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{Hooks, Lifetime, ObjectFactory, ServiceDescriptor, TypeCatalog};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// static BUILT: AtomicU32 = AtomicU32::new(0);
///
/// struct Session(u32);
///
/// let factory = ObjectFactory::new(TypeCatalog::new(), Hooks::new());
/// let descriptor = ServiceDescriptor::scoped_factory(|_| Ok(Session(BUILT.fetch_add(1, Ordering::SeqCst))));
/// assert_eq!(descriptor.lifetime(), Lifetime::Scoped);
///
/// descriptor.enter_scope();
/// let first = descriptor.get_instance(&factory, None).unwrap();
/// let again = descriptor.get_instance(&factory, None).unwrap();
/// assert!(first.ptr_eq(&again));
///
/// descriptor.exit_scope().unwrap();
/// let next = descriptor.get_instance(&factory, None).unwrap();
/// assert!(!next.ptr_eq(&first));
/// ```
pub struct ServiceDescriptor {
    service: TypeKey,
    lifetime: Lifetime,
    implementation: Implementation,
    instance: Mutex<Option<Value>>,
}

impl ServiceDescriptor {
    /// Type-backed descriptor; `implementation` must be `service` or
    /// declare an upcast to it.
    pub fn with_type(service: TypeKey, implementation: TypeKey, lifetime: Lifetime) -> Self {
        Self {
            service,
            lifetime,
            implementation: Implementation::Type(implementation),
            instance: Mutex::new(None),
        }
    }

    /// Factory-backed descriptor producing type-erased values.
    pub fn with_factory<F>(service: TypeKey, lifetime: Lifetime, factory: F) -> Self
    where
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Value> + Send + Sync + 'static,
    {
        Self {
            service,
            lifetime,
            implementation: Implementation::Factory(Arc::new(factory)),
            instance: Mutex::new(None),
        }
    }

    /// Fixed instance; always a Singleton.
    pub fn with_instance(service: TypeKey, instance: Value) -> Self {
        Self {
            service,
            lifetime: Lifetime::Singleton,
            implementation: Implementation::Instance,
            instance: Mutex::new(Some(instance)),
        }
    }

    pub fn singleton<S: ?Sized + 'static, I: 'static>() -> Self {
        Self::with_type(TypeKey::of::<S>(), TypeKey::of::<I>(), Lifetime::Singleton)
    }

    pub fn scoped<S: ?Sized + 'static, I: 'static>() -> Self {
        Self::with_type(TypeKey::of::<S>(), TypeKey::of::<I>(), Lifetime::Scoped)
    }

    pub fn transient<S: ?Sized + 'static, I: 'static>() -> Self {
        Self::with_type(TypeKey::of::<S>(), TypeKey::of::<I>(), Lifetime::Transient)
    }

    fn typed_factory<T, F>(lifetime: Lifetime, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::with_factory(TypeKey::of::<T>(), lifetime, move |ctx| factory(ctx).map(Value::new))
    }

    pub fn singleton_factory<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::typed_factory(Lifetime::Singleton, factory)
    }

    pub fn scoped_factory<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::typed_factory(Lifetime::Scoped, factory)
    }

    pub fn transient_factory<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::typed_factory(Lifetime::Transient, factory)
    }

    /// Factory for a trait-object service.
    pub fn trait_factory<S, F>(lifetime: Lifetime, factory: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        Self::with_factory(TypeKey::of::<S>(), lifetime, move |ctx| factory(ctx).map(Value::from_trait))
    }

    /// Singleton holding `instance`.
    pub fn instance<T: Send + Sync + 'static>(instance: T) -> Self {
        Self::with_instance(TypeKey::of::<T>(), Value::new(instance))
    }

    /// Singleton holding a trait object.
    pub fn trait_instance<S: ?Sized + Send + Sync + 'static>(instance: Arc<S>) -> Self {
        Self::with_instance(TypeKey::of::<S>(), Value::from_trait(instance))
    }

    pub fn service_type(&self) -> TypeKey {
        self.service
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    /// Implementation type of type-backed descriptors.
    pub fn implementation_type(&self) -> Option<TypeKey> {
        match self.implementation {
            Implementation::Type(key) => Some(key),
            _ => None,
        }
    }

    /// Whether an instance is cached right now.
    pub fn has_instance(&self) -> bool {
        self.instance.lock().is_some()
    }

    /// Whether the cached instance runs a disposal hook when released.
    pub(crate) fn holds_disposable(&self) -> bool {
        self.instance.lock().as_ref().is_some_and(Value::is_disposable)
    }

    /// Instance for the current scope.
    ///
    /// Transient descriptors build on every call; Singleton and Scoped
    /// descriptors build once and cache. The cache lock is held while
    /// building, so concurrent callers never build twice.
    pub fn get_instance(&self, factory: &ObjectFactory, services: Option<&dyn ResolverCore>) -> DiResult<Value> {
        if !self.lifetime.is_cached() {
            return self.create_instance(factory, services);
        }

        let mut slot = self.instance.lock();
        if let Some(cached) = slot.as_ref() {
            tracing::trace!(service = self.service.name(), lifetime = %self.lifetime, "cache hit");
            return Ok(cached.clone());
        }
        let created = self.build(factory, services)?;
        *slot = Some(created.clone());
        Ok(created)
    }

    /// Builds a fresh instance, bypassing the cache.
    ///
    /// Instance descriptors return their instance.
    pub fn create_instance(&self, factory: &ObjectFactory, services: Option<&dyn ResolverCore>) -> DiResult<Value> {
        if let Implementation::Instance = self.implementation {
            return self.instance.lock().clone().ok_or(DiError::Disposed(self.service.name()));
        }
        self.build(factory, services)
    }

    fn build(&self, factory: &ObjectFactory, services: Option<&dyn ResolverCore>) -> DiResult<Value> {
        let built = match &self.implementation {
            Implementation::Type(implementation) => factory.create_instance(*implementation, &Arguments::new(), services)?,
            Implementation::Factory(build) => build(&ResolverContext::new(factory, services))?,
            Implementation::Instance => return Err(DiError::Disposed(self.service.name())),
        };
        self.as_service(factory, built)
    }

    /// Converts a built instance to the service type.
    fn as_service(&self, factory: &ObjectFactory, value: Value) -> DiResult<Value> {
        if value.type_key() == self.service || factory.catalog().kind(self.service) == Some(TypeKind::Dynamic) {
            return Ok(value);
        }
        factory.catalog().upcast(&value, self.service).ok_or(DiError::TypeMismatch {
            expected: self.service.name(),
            found: value.type_key().name(),
        })
    }

    /// Scope entry notification; no lifetime needs preparation.
    pub fn enter_scope(&self) {
        tracing::trace!(service = self.service.name(), lifetime = %self.lifetime, "enter scope");
    }

    /// Scope exit notification: a Scoped descriptor disposes and clears its
    /// cached instance. Other lifetimes are untouched.
    pub fn exit_scope(&self) -> DiResult<()> {
        if self.lifetime != Lifetime::Scoped {
            return Ok(());
        }
        self.release()
    }

    /// Disposes and clears the cached instance, whatever the lifetime.
    ///
    /// Instance descriptors are spent afterwards and report
    /// [`DiError::Disposed`].
    pub fn try_dispose(&self) -> DiResult<()> {
        self.release()
    }

    fn release(&self) -> DiResult<()> {
        let taken = self.instance.lock().take();
        match taken {
            Some(instance) => {
                tracing::debug!(service = self.service.name(), lifetime = %self.lifetime, "released instance");
                instance.dispose()
            }
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service.name())
            .field("lifetime", &self.lifetime)
            .field("implementation", &self.implementation)
            .field("has_instance", &self.has_instance())
            .finish()
    }
}
