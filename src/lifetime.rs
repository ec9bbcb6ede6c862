//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance caching behavior
///
/// Each lifetime drives a small state machine on the registered
/// descriptor: `Uninstantiated → Active` on first resolution, and for
/// Scoped registrations `Active → Disposed → Uninstantiated` when the
/// owning scope exits.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{Lifetime, ServiceCollection, ServiceDescriptor, Resolver};
///
/// struct Counter(u32);
///
/// let mut services = ServiceCollection::new();
/// services.add(ServiceDescriptor::singleton_factory(|_| Ok(Counter(1))), false);
/// services.add(ServiceDescriptor::transient_factory(|_| Ok(String::from("fresh"))), false);
///
/// let provider = services.build();
///
/// // Singleton: same instance every time
/// let a = provider.get::<Counter>().unwrap();
/// let b = provider.get::<Counter>().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
///
/// // Transient: new instance every time
/// let x = provider.get::<String>().unwrap();
/// let y = provider.get::<String>().unwrap();
/// assert!(!std::sync::Arc::ptr_eq(&x, &y));
///
/// assert_eq!(Lifetime::Scoped.to_string(), "scoped");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Single instance per container, cached until the container is disposed
    ///
    /// Scope enter/exit notifications are no-ops for singletons.
    Singleton,
    /// Single instance per scope, disposed and cleared when the scope exits
    Scoped,
    /// New instance per resolution, never cached
    Transient,
}

impl Lifetime {
    /// Whether resolutions of this lifetime are cached at all.
    pub fn is_cached(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
            Lifetime::Transient => "transient",
        };
        f.write_str(text)
    }
}
