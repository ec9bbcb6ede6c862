//! Argument resolution: value matching, collection coercion and
//! best-effort binding of declared parameters.

mod collection;
mod hooks;
mod parameter;
mod traverse;
mod value;

pub use hooks::{Hooks, ParameterMatchingArgs, ValueMatchingArgs};
pub use parameter::{ArgumentMatchedResult, MatchQuality};
pub use traverse::ArgumentTraverseContext;

use crate::arguments::NamedArgs;
use crate::catalog::TypeCatalog;
use crate::traits::ResolverCore;
use crate::value::Value;

/// Weight of a parameter bound to a real value.
pub const SINGLE_PARAMETER_SCORE: f64 = 10.0;
/// Share of the full weight earned by a declared default.
pub const DEFAULT_VALUE_RATIO: f64 = 0.75;
/// Share of the full weight earned by an intrinsic type default.
pub const TYPE_DEFAULT_RATIO: f64 = 0.5;

/// Candidate inputs for one matching run.
#[derive(Clone, Copy, Default)]
pub struct MatchOptions<'a> {
    pub named: Option<&'a NamedArgs>,
    pub positional: &'a [Value],
    pub services: Option<&'a dyn ResolverCore>,
}

impl<'a> MatchOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, named: &'a NamedArgs) -> Self {
        self.named = Some(named);
        self
    }

    pub fn positional(mut self, positional: &'a [Value]) -> Self {
        self.positional = positional;
        self
    }

    pub fn services(mut self, services: &'a dyn ResolverCore) -> Self {
        self.services = Some(services);
        self
    }
}

/// Matching engine bound to one catalog and one set of hooks.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{Hooks, Matcher, TypeCatalog, TypeKey, Value};
///
/// let catalog = TypeCatalog::new();
/// let hooks = Hooks::new();
/// let matcher = Matcher::new(&catalog, &hooks);
///
/// let converted = matcher.match_value(TypeKey::of::<i64>(), &Value::from("12")).unwrap();
/// assert_eq!(converted.and_then(|v| v.cloned::<i64>()), Some(12));
///
/// let wrapped = matcher
///     .coerce_to_collection(&Value::from(10), TypeKey::of::<Box<[i32]>>(), false)
///     .unwrap()
///     .unwrap();
/// assert_eq!(wrapped.downcast_ref::<Box<[i32]>>().map(|a| a.to_vec()), Some(vec![10]));
/// ```
#[derive(Clone, Copy)]
pub struct Matcher<'a> {
    catalog: &'a TypeCatalog,
    hooks: &'a Hooks,
    case_insensitive: bool,
}

impl<'a> Matcher<'a> {
    pub fn new(catalog: &'a TypeCatalog, hooks: &'a Hooks) -> Self {
        Self {
            catalog,
            hooks,
            case_insensitive: true,
        }
    }

    /// Whether named values match parameter names regardless of ASCII case.
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    pub fn catalog(&self) -> &'a TypeCatalog {
        self.catalog
    }
}
