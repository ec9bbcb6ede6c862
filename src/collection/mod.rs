//! Service collection: registrations, type descriptions and hooks, turned
//! into a [`ServiceProvider`] by [`ServiceCollection::build`].

use std::sync::Arc;

use crate::catalog::{TypeCatalog, TypeDescriptor};
use crate::config::ContainerOptions;
use crate::descriptors::{Implementation, ServiceDescriptor};
use crate::error::{DiError, DiResult};
use crate::factory::ObjectFactory;
use crate::key::TypeKey;
use crate::matching::{Hooks, ParameterMatchingArgs, ValueMatchingArgs};
use crate::observer::{DiObserver, Observers};
use crate::provider::ServiceProvider;
use crate::registration::ServiceRegistry;

/// Mutable container configuration.
///
/// Holds the service registry, the type catalog the object factory
/// activates from, the matching hooks and the resolution observers. All
/// of it is frozen into the provider on [`build`](Self::build); hooks and
/// observers belong to this container only.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{Resolver, ServiceCollection, ServiceDescriptor, Signature, TypeDef};
/// use std::sync::Arc;
///
/// trait Fake: Send + Sync { fn value(&self) -> i32; }
/// struct FakeA;
/// impl Fake for FakeA { fn value(&self) -> i32 { 1 } }
///
/// struct Consumer { fake: Arc<dyn Fake>, label: String }
///
/// let mut services = ServiceCollection::new();
/// services
///     .register_type(TypeDef::interface::<dyn Fake>())
///     .register_type(
///         TypeDef::class::<FakeA>()
///             .constructor(Signature::new(), |_| Ok(FakeA))
///             .implements::<dyn Fake>(|a| a as Arc<dyn Fake>),
///     )
///     .register_type(TypeDef::class::<Consumer>().constructor(
///         Signature::new().param::<dyn Fake>("fake").param::<String>("label"),
///         |args| Ok(Consumer { fake: args.get_trait(0)?, label: args.cloned(1)? }),
///     ));
/// services.add(ServiceDescriptor::singleton::<dyn Fake, FakeA>(), false);
/// services.validate().unwrap();
///
/// let provider = services.build();
/// let consumer = provider
///     .create::<Consumer>(&ferrous_activator::Arguments::new().arg("first"))
///     .unwrap();
/// assert_eq!(consumer.fake.value(), 1);
/// assert_eq!(consumer.label, "first");
/// ```
pub struct ServiceCollection {
    registry: ServiceRegistry,
    catalog: TypeCatalog,
    hooks: Hooks,
    observers: Observers,
    options: ContainerOptions,
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceCollection {
    /// Creates an empty collection whose catalog already describes the
    /// primitives, `String`, `Value` and their collections.
    pub fn new() -> Self {
        Self {
            registry: ServiceRegistry::new(),
            catalog: TypeCatalog::new(),
            hooks: Hooks::new(),
            observers: Observers::new(),
            options: ContainerOptions::default(),
        }
    }

    // ----- Registrations -----

    /// Adds a descriptor; returns `false` when its service type is taken
    /// and `replace` is not set.
    pub fn add(&mut self, descriptor: ServiceDescriptor, replace: bool) -> bool {
        self.registry.add(Arc::new(descriptor), replace)
    }

    /// Adds a shared descriptor, keeping the caller's handle usable for
    /// [`remove`](Self::remove).
    pub fn add_shared(&mut self, descriptor: Arc<ServiceDescriptor>, replace: bool) -> bool {
        self.registry.add(descriptor, replace)
    }

    /// Removes exactly this descriptor.
    pub fn remove(&mut self, descriptor: &Arc<ServiceDescriptor>) -> bool {
        self.registry.remove(descriptor)
    }

    /// Registration for `service`.
    ///
    /// # Errors
    ///
    /// [`DiError::NotFound`] if the service type is not registered.
    pub fn get_descriptor(&self, service: TypeKey) -> DiResult<Arc<ServiceDescriptor>> {
        self.registry.get(service)
    }

    pub fn try_get_descriptor(&self, service: TypeKey) -> Option<Arc<ServiceDescriptor>> {
        self.registry.try_get(service)
    }

    /// Registrations in insertion order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<ServiceDescriptor>> {
        self.registry.iter()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // ----- Type descriptions -----

    /// Describes a type to the object factory.
    pub fn register_type(&mut self, descriptor: impl Into<TypeDescriptor>) -> &mut Self {
        self.catalog.register(descriptor);
        self
    }

    /// Describes `Box<[T]>` and `Vec<T>` so `T` can be collected.
    pub fn register_collections<T: Clone + Send + Sync + 'static>(&mut self) -> &mut Self {
        self.catalog.register_collections::<T>();
        self
    }

    pub fn types(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn types_mut(&mut self) -> &mut TypeCatalog {
        &mut self.catalog
    }

    // ----- Hooks, observers, options -----

    /// Handler consulted when no input or service satisfies a parameter.
    pub fn on_parameter_matching<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ParameterMatchingArgs<'_>) -> DiResult<()> + Send + Sync + 'static,
    {
        self.hooks.on_parameter_matching(handler);
        self
    }

    /// Handler consulted when a value has no built-in conversion.
    pub fn on_value_matching<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ValueMatchingArgs<'_>) -> DiResult<()> + Send + Sync + 'static,
    {
        self.hooks.on_value_matching(handler);
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    pub fn with_options(&mut self, options: ContainerOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// Checks every type-backed registration against the catalog.
    ///
    /// # Errors
    ///
    /// [`DiError::InvalidRegistration`] naming the first registration whose
    /// implementation type is undescribed, can never be activated, or does
    /// not convert to the service type.
    pub fn validate(&self) -> DiResult<()> {
        for descriptor in self.registry.iter() {
            let Implementation::Type(implementation) = descriptor.implementation() else {
                continue;
            };
            let service = descriptor.service_type();
            if let Err(err) = self.catalog.check_instantiable(*implementation) {
                return Err(DiError::InvalidRegistration(format!("{}: {err}", service.name())));
            }
            if !self.catalog.is_assignable(service, *implementation) {
                return Err(DiError::InvalidRegistration(format!(
                    "{} does not convert to {}",
                    implementation.name(),
                    service.name()
                )));
            }
        }
        Ok(())
    }

    /// Freezes the collection into a provider.
    pub fn build(mut self) -> ServiceProvider {
        // Finalize registry by assigning scoped slot indices
        self.registry.finalize();
        tracing::debug!(
            services = self.registry.len(),
            types = self.catalog.len(),
            observers = self.observers.has_observers(),
            "built service provider"
        );
        let factory = ObjectFactory::with_options(self.catalog, self.hooks, &self.options);
        ServiceProvider::new(self.registry, factory, self.observers, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeDef;
    use crate::error::Unresolvable;
    use crate::signature::Signature;

    trait Marker: Send + Sync {}
    struct Plain;
    impl Marker for Plain {}

    #[test]
    fn validate_reports_undescribed_implementation() {
        let mut services = ServiceCollection::new();
        services.add(ServiceDescriptor::transient::<Plain, Plain>(), false);
        let err = services.validate().unwrap_err();
        assert!(matches!(err, DiError::InvalidRegistration(_)));
        assert!(err.to_string().contains(&Unresolvable::Undescribed.to_string()));
    }

    #[test]
    fn validate_requires_an_upcast_to_the_service() {
        let mut services = ServiceCollection::new();
        services.register_type(TypeDef::class::<Plain>().constructor(Signature::new(), |_| Ok(Plain)));
        services.add(ServiceDescriptor::transient::<dyn Marker, Plain>(), false);
        assert!(services.validate().is_err());

        services.register_type(
            TypeDef::class::<Plain>()
                .constructor(Signature::new(), |_| Ok(Plain))
                .implements::<dyn Marker>(|p| p as Arc<dyn Marker>),
        );
        assert!(services.validate().is_ok());
    }

    #[test]
    fn factories_and_instances_skip_validation() {
        let mut services = ServiceCollection::new();
        services.add(ServiceDescriptor::singleton_factory(|_| Ok(Plain)), false);
        services.add(ServiceDescriptor::instance(5u8), false);
        assert!(services.validate().is_ok());
        assert_eq!(services.len(), 2);
    }
}
