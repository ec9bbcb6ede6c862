//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::arguments::Arguments;
use crate::error::{DiError, DiResult};
use crate::factory::ObjectFactory;
use crate::key::TypeKey;
use crate::value::Value;

/// Core resolver trait for object-safe service resolution.
///
/// Implemented by [`ServiceProvider`](crate::ServiceProvider),
/// [`Scope`](crate::Scope) and [`ResolverContext`](crate::ResolverContext).
/// This is the dependency-lookup function the parameter matcher consults.
///
/// Most users should use the [`Resolver`] trait instead, which provides
/// typed helpers built on top of this trait.
pub trait ResolverCore: Send + Sync {
    /// Resolves `key` if it is registered.
    ///
    /// * `Ok(Some(value))` - the resolved instance, typed as the service
    /// * `Ok(None)` - nothing registered for `key`
    /// * `Err(DiError)` - construction failed (circular, wrong lifetime,
    ///   user error, ...)
    fn try_resolve(&self, key: TypeKey) -> DiResult<Option<Value>>;

    /// Object factory used for activation and method invocation.
    fn object_factory(&self) -> &ObjectFactory;

    /// `self` as a trait object.
    fn as_core(&self) -> &dyn ResolverCore;
}

/// High-level resolver interface with typed helpers.
///
/// Blanket-implemented for every [`ResolverCore`], so providers, scopes
/// and factory contexts are interchangeable.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{Resolver, ServiceCollection, ServiceDescriptor};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("LOG: {msg}")
///     }
/// }
///
/// let mut collection = ServiceCollection::new();
/// collection.add(ServiceDescriptor::instance(42usize), false);
/// collection.add(ServiceDescriptor::trait_instance::<dyn Logger>(Arc::new(ConsoleLogger)), false);
///
/// let provider = collection.build();
///
/// let number = provider.get::<usize>().unwrap();
/// assert_eq!(*number, 42);
///
/// let logger = provider.get_trait::<dyn Logger>().unwrap();
/// assert_eq!(logger.log("ready"), "LOG: ready");
///
/// assert!(provider.try_get::<String>().unwrap().is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves `key`, failing with [`DiError::NotFound`] if unregistered.
    fn get_service(&self, key: TypeKey) -> DiResult<Value> {
        self.try_resolve(key)?.ok_or(DiError::NotFound(key.name()))
    }

    /// Resolves `key`; `Ok(None)` if unregistered.
    fn try_get_service(&self, key: TypeKey) -> DiResult<Option<Value>> {
        self.try_resolve(key)
    }

    /// Resolves a concrete service type.
    fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let value = self.get_service(TypeKey::of::<T>())?;
        downcast(&value)
    }

    /// Resolves a concrete service type; `Ok(None)` if unregistered.
    fn try_get<T: Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        match self.try_resolve(TypeKey::of::<T>())? {
            Some(value) => downcast(&value).map(Some),
            None => Ok(None),
        }
    }

    /// Resolves a trait-object service.
    fn get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let value = self.get_service(TypeKey::of::<T>())?;
        value.get_trait::<T>().ok_or(DiError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            found: value.type_key().name(),
        })
    }

    /// Activates `ty` with the given inputs, resolving missing
    /// dependencies through this resolver.
    fn create_instance(&self, ty: TypeKey, args: &Arguments) -> DiResult<Value> {
        self.object_factory().create_instance(ty, args, Some(self.as_core()))
    }

    /// Typed form of [`Resolver::create_instance`].
    fn create<T: Send + Sync + 'static>(&self, args: &Arguments) -> DiResult<Arc<T>> {
        let value = self.create_instance(TypeKey::of::<T>(), args)?;
        downcast(&value)
    }

    /// Invokes the best-matching overload of `method` on `instance`.
    fn invoke_method(&self, instance: &Value, method: &str, args: &Arguments) -> DiResult<Option<Value>> {
        self.object_factory().invoke_method(instance, method, args, Some(self.as_core()))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}

fn downcast<T: Send + Sync + 'static>(value: &Value) -> DiResult<Arc<T>> {
    value.get::<T>().ok_or(DiError::TypeMismatch {
        expected: std::any::type_name::<T>(),
        found: value.type_key().name(),
    })
}
