//! # ferrous-activator
//!
//! Inversion-of-control container with best-match activation, inspired by
//! Microsoft.Extensions.DependencyInjection.
//!
//! ## Features
//!
//! - **Lifetimes**: Singleton, Scoped and Transient services
//! - **Overload resolution**: every described constructor or method is
//!   scored against the supplied inputs and the best one wins
//! - **Mixed inputs**: named values, positional values, container
//!   services, declared defaults and type defaults all feed one binding
//! - **Conversions**: numeric and textual primitive conversions, trait
//!   upcasts and single-value-to-collection coercion
//! - **Hooks**: per-container parameter and value matching handlers
//! - **Disposal**: scoped and singleton instances are disposed exactly once
//! - **Circular dependency detection** with the full resolution path
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_activator::{Arguments, Resolver, ServiceCollection, ServiceDescriptor, Signature, TypeDef};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//!     page_size: i32,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.register_type(
//!     TypeDef::class::<UserService>().constructor(
//!         Signature::new().param::<Database>("db").param_or("page_size", 20i32),
//!         |args| Ok(UserService { db: args.get(0)?, page_size: args.cloned(1)? }),
//!     ),
//! );
//! services.add(ServiceDescriptor::instance(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! }), false);
//! services.add(ServiceDescriptor::transient::<UserService, UserService>(), false);
//!
//! let provider = services.build();
//!
//! // Dependencies come from the container, the rest from defaults
//! let user_service = provider.get::<UserService>().unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! assert_eq!(user_service.page_size, 20);
//!
//! // Inputs supplied by the caller beat defaults
//! let custom = provider.create::<UserService>(&Arguments::new().named("PAGE_SIZE", 50)).unwrap();
//! assert_eq!(custom.page_size, 50);
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: Created once and shared across the entire container
//! - **Scoped**: Created once per [`Scope`], disposed with it
//! - **Transient**: Created fresh on every resolution
//!
//! ## Matching Rules
//!
//! Each declared parameter takes the first of: rest of the inputs
//! (variadic), an out-slot default, a named value, a positional value, a
//! registered service, a hook result, its declared default, a positional
//! value coerced into a collection, and finally its type default. Real
//! values score 10, declared defaults 7.5 and type defaults 5; the score
//! of a callable is the mean over its parameters.

mod arguments;
mod catalog;
mod descriptors;
mod error;
mod factory;
mod internal;
mod key;
mod lifetime;
mod registration;
mod signature;
mod value;

pub mod collection;
pub mod config;
pub mod matching;
pub mod observer;
pub mod provider;
pub mod traits;

pub use arguments::{Args, Arguments, NamedArgs};
pub use catalog::{
    convert, ClassDef, CollectionInfo, CollectionShape, PrimitiveKind, TypeCatalog, TypeDef, TypeDescriptor, TypeKind,
};
pub use collection::ServiceCollection;
pub use config::ContainerOptions;
pub use descriptors::{Implementation, ServiceDescriptor, ServiceFactory};
pub use error::{BoxError, DiError, DiResult, Unresolvable};
pub use factory::ObjectFactory;
pub use key::{key_of_type, TypeKey};
pub use lifetime::Lifetime;
pub use matching::{
    ArgumentMatchedResult, ArgumentTraverseContext, Hooks, MatchOptions, MatchQuality, Matcher,
    ParameterMatchingArgs, ValueMatchingArgs, DEFAULT_VALUE_RATIO, SINGLE_PARAMETER_SCORE, TYPE_DEFAULT_RATIO,
};
pub use observer::{DiObserver, TracingObserver};
pub use provider::{ResolverContext, Scope, ServiceProvider};
pub use registration::ServiceRegistry;
pub use signature::{Callable, ParameterInfo, ParameterKind, Signature};
pub use traits::{Dispose, Resolver, ResolverCore};
pub use value::Value;
