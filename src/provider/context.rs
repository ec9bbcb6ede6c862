//! Resolver context handed to factory closures.

use crate::error::DiResult;
use crate::factory::ObjectFactory;
use crate::key::TypeKey;
use crate::traits::ResolverCore;
use crate::value::Value;

/// Context passed to factory functions for resolving dependencies.
///
/// Wraps the resolver (ServiceProvider or Scope) that asked for the
/// service, so factories can pull in other services and activate types
/// through the same object factory. Without a resolver every lookup comes
/// back empty.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{Resolver, ServiceCollection, ServiceDescriptor};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut services = ServiceCollection::new();
/// services.add(ServiceDescriptor::instance(Database { url: "postgres://localhost".to_string() }), false);
/// services.add(
///     ServiceDescriptor::transient_factory(|resolver| Ok(UserService { db: resolver.get::<Database>()? })),
///     false,
/// );
///
/// let provider = services.build();
/// assert_eq!(provider.get::<UserService>().unwrap().db.url, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    factory: &'a ObjectFactory,
    resolver: Option<&'a dyn ResolverCore>,
}

impl<'a> ResolverContext<'a> {
    /// Creates a new ResolverContext wrapping the given resolver.
    pub(crate) fn new(factory: &'a ObjectFactory, resolver: Option<&'a dyn ResolverCore>) -> Self {
        Self { factory, resolver }
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn try_resolve(&self, key: TypeKey) -> DiResult<Option<Value>> {
        match self.resolver {
            Some(resolver) => resolver.try_resolve(key),
            None => Ok(None),
        }
    }

    fn object_factory(&self) -> &ObjectFactory {
        self.factory
    }

    fn as_core(&self) -> &dyn ResolverCore {
        self
    }
}
