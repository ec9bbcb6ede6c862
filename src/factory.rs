//! Best-match activation of constructors and invocation of methods.

use std::sync::Arc;

use crate::arguments::{Arguments, NamedArgs};
use crate::catalog::{convert, PrimitiveKind, TypeCatalog, TypeKind};
use crate::config::ContainerOptions;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::matching::{ArgumentMatchedResult, Hooks, MatchOptions, Matcher};
use crate::signature::Callable;
use crate::traits::ResolverCore;
use crate::value::Value;

/// Named key checked first when activating a primitive.
const PRIMITIVE_VALUE_KEY: &str = "value";

/// Builds instances and invokes methods by scoring every overload against
/// the supplied inputs.
///
/// Shared by a container and all of its scopes; the catalog and hooks are
/// immutable once the factory exists.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{Arguments, Hooks, ObjectFactory, Signature, TypeCatalog, TypeDef, TypeKey};
///
/// struct Greeting(String);
///
/// let mut catalog = TypeCatalog::new();
/// catalog.register(
///     TypeDef::class::<Greeting>()
///         .constructor(Signature::new().param::<String>("text"), |args| Ok(Greeting(args.cloned(0)?)))
///         .constructor(Signature::new(), |_| Ok(Greeting("hi".into()))),
/// );
/// let factory = ObjectFactory::new(catalog, Hooks::new());
/// let key = TypeKey::of::<Greeting>();
///
/// // Both overloads score 10 here; the first described one wins the tie
/// let made = factory.create_instance(key, &Arguments::new().arg("hello"), None).unwrap();
/// assert_eq!(made.downcast_ref::<Greeting>().unwrap().0, "hello");
///
/// // Without inputs `text` falls back to its type default and scores lower
/// let plain = factory.create_instance(key, &Arguments::new(), None).unwrap();
/// assert_eq!(plain.downcast_ref::<Greeting>().unwrap().0, "hi");
/// ```
#[derive(Clone)]
pub struct ObjectFactory {
    catalog: Arc<TypeCatalog>,
    hooks: Arc<Hooks>,
    case_insensitive: bool,
}

impl ObjectFactory {
    pub fn new(catalog: TypeCatalog, hooks: Hooks) -> Self {
        Self {
            catalog: Arc::new(catalog),
            hooks: Arc::new(hooks),
            case_insensitive: true,
        }
    }

    pub(crate) fn with_options(catalog: TypeCatalog, hooks: Hooks, options: &ContainerOptions) -> Self {
        Self {
            catalog: Arc::new(catalog),
            hooks: Arc::new(hooks),
            case_insensitive: options.case_insensitive_names,
        }
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Matcher over this factory's catalog and hooks.
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&self.catalog, &self.hooks).case_insensitive(self.case_insensitive)
    }

    /// Builds an instance of `ty`.
    ///
    /// # Errors
    ///
    /// * [`DiError::Unresolvable`] for arrays, enums, non-instantiable,
    ///   abstract, interface and undescribed types, before any matching
    /// * [`DiError::NoMatchingConstructor`] when no overload scores above zero
    /// * [`DiError::Invocation`] carrying the constructor's own error
    pub fn create_instance(&self, ty: TypeKey, args: &Arguments, services: Option<&dyn ResolverCore>) -> DiResult<Value> {
        let descriptor = self.catalog.check_instantiable(ty)?;

        if let TypeKind::Primitive(kind) = descriptor.kind() {
            return self
                .create_primitive(kind, args)?
                .ok_or(DiError::NoMatchingConstructor(ty.name()));
        }

        let options = match_options(args, services);
        let best = self
            .find_best_match(descriptor.constructors().iter(), &options)?
            .ok_or(DiError::NoMatchingConstructor(ty.name()))?;
        tracing::debug!(
            type_name = ty.name(),
            candidates = descriptor.constructors().len(),
            score = best.score(),
            "selected constructor"
        );

        let callable = best.callable();
        let created = callable
            .invoke(None, &best.into_args())?
            .ok_or(DiError::NoMatchingConstructor(ty.name()))?;
        Ok(descriptor.attach_disposer(created))
    }

    /// Invokes the best-matching overload of `name` on `instance`.
    ///
    /// Returns `Ok(None)` for methods without a result.
    pub fn invoke_method(
        &self,
        instance: &Value,
        name: &str,
        args: &Arguments,
        services: Option<&dyn ResolverCore>,
    ) -> DiResult<Option<Value>> {
        let ty = instance.type_key();
        let no_match = || DiError::NoMatchingMethod {
            method: name.to_string(),
            type_name: ty.name(),
        };
        let descriptor = self.catalog.get(ty).ok_or_else(no_match)?;

        let options = match_options(args, services);
        let best = self
            .find_best_match(descriptor.methods_named(name), &options)?
            .ok_or_else(no_match)?;
        tracing::debug!(type_name = ty.name(), method = name, score = best.score(), "selected method");

        let callable = best.callable();
        callable.invoke(Some(instance), &best.into_args())
    }

    /// Highest strictly-greater score among passed candidates; ties keep
    /// the first.
    fn find_best_match<'c, I>(&self, candidates: I, options: &MatchOptions<'_>) -> DiResult<Option<ArgumentMatchedResult<'c>>>
    where
        I: Iterator<Item = &'c Callable>,
    {
        let matcher = self.matcher();
        let mut best: Option<ArgumentMatchedResult<'c>> = None;
        let mut threshold = 0.0;
        for candidate in candidates {
            let result = matcher.match_callable(candidate, options)?;
            tracing::trace!(
                callable = candidate.name(),
                params = candidate.signature().len(),
                score = result.score(),
                "scored candidate"
            );
            if !result.is_passed() {
                continue;
            }
            if result.score() > threshold {
                threshold = result.score();
                best = Some(result);
            }
        }
        Ok(best)
    }

    /// Primitives have no constructors: named `value` first, then
    /// positional values of the same type, then convertible positional
    /// values, then any named value of the same type or convertible.
    fn create_primitive(&self, kind: PrimitiveKind, args: &Arguments) -> DiResult<Option<Value>> {
        let ty = kind.type_key();
        let named = args.named_args();

        if let Some(named) = named {
            if let Some(index) = named.position(PRIMITIVE_VALUE_KEY, self.case_insensitive) {
                if let Some((_, value)) = named.entry(index) {
                    if let Some(found) = exact_or_convert(value, kind) {
                        return Ok(Some(found));
                    }
                }
            }
        }

        let positional = args.positional();
        if let Some(found) = positional.iter().find(|v| v.type_key() == ty) {
            return Ok(Some(found.clone()));
        }
        if let Some(found) = positional.iter().find_map(|v| convert(v, kind)) {
            return Ok(Some(found));
        }

        Ok(named.and_then(|named| best_named_primitive(named, kind)))
    }
}

fn match_options<'a>(args: &'a Arguments, services: Option<&'a dyn ResolverCore>) -> MatchOptions<'a> {
    MatchOptions {
        named: args.named_args(),
        positional: args.positional(),
        services,
    }
}

fn exact_or_convert(value: &Value, kind: PrimitiveKind) -> Option<Value> {
    if value.type_key() == kind.type_key() {
        Some(value.clone())
    } else {
        convert(value, kind)
    }
}

fn best_named_primitive(named: &NamedArgs, kind: PrimitiveKind) -> Option<Value> {
    let ty = kind.type_key();
    named
        .iter()
        .find(|(_, v)| v.type_key() == ty)
        .map(|(_, v)| v.clone())
        .or_else(|| named.iter().find_map(|(_, v)| convert(v, kind)))
}

impl std::fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectFactory")
            .field("catalog", &self.catalog)
            .field("hooks", &self.hooks)
            .field("case_insensitive", &self.case_insensitive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeDef;
    use crate::signature::Signature;

    struct Pair(i32, String);

    fn factory() -> ObjectFactory {
        let mut catalog = TypeCatalog::new();
        catalog.register(
            TypeDef::class::<Pair>()
                .constructor(Signature::new().param::<i32>("n").param::<String>("s"), |a| {
                    Ok(Pair(a.cloned(0)?, a.cloned(1)?))
                })
                .constructor(Signature::new().param::<i32>("n"), |a| Ok(Pair(a.cloned(0)?, "one".into()))),
        );
        ObjectFactory::new(catalog, Hooks::new())
    }

    #[test]
    fn equal_scores_keep_the_first_overload() {
        let made = factory()
            .create_instance(TypeKey::of::<Pair>(), &Arguments::new().arg("two").arg(3), None)
            .unwrap();
        let pair = made.downcast_ref::<Pair>().unwrap();
        assert_eq!((pair.0, pair.1.as_str()), (3, "two"));
    }

    #[test]
    fn parameterless_overload_described_first_wins_tie() {
        struct Greeting(String);

        let mut catalog = TypeCatalog::new();
        catalog.register(
            TypeDef::class::<Greeting>()
                .constructor(Signature::new(), |_| Ok(Greeting("hi".into())))
                .constructor(Signature::new().param::<String>("text"), |a| Ok(Greeting(a.cloned(0)?))),
        );
        let factory = ObjectFactory::new(catalog, Hooks::new());

        let made = factory
            .create_instance(TypeKey::of::<Greeting>(), &Arguments::new().arg("hello"), None)
            .unwrap();
        assert_eq!(made.downcast_ref::<Greeting>().unwrap().0, "hi");
    }

    #[test]
    fn defaulted_overload_loses_to_exact_one() {
        let made = factory()
            .create_instance(TypeKey::of::<Pair>(), &Arguments::new().arg(3), None)
            .unwrap();
        let pair = made.downcast_ref::<Pair>().unwrap();
        assert_eq!((pair.0, pair.1.as_str()), (3, "one"));
    }

    #[test]
    fn primitives_prefer_the_value_key() {
        let factory = factory();
        let args = Arguments::new().arg(1i32).named("other", 2i32).named("Value", "3");
        let made = factory.create_instance(TypeKey::of::<i32>(), &args, None).unwrap();
        assert_eq!(made.cloned::<i32>(), Some(3));

        let args = Arguments::new().arg("7").arg(8i64);
        let made = factory.create_instance(TypeKey::of::<i64>(), &args, None).unwrap();
        assert_eq!(made.cloned::<i64>(), Some(8));

        let args = Arguments::new().named("x", "9");
        let made = factory.create_instance(TypeKey::of::<u8>(), &args, None).unwrap();
        assert_eq!(made.cloned::<u8>(), Some(9));
    }

    #[test]
    fn primitive_without_inputs_has_no_constructor() {
        let err = factory()
            .create_instance(TypeKey::of::<i32>(), &Arguments::new(), None)
            .unwrap_err();
        assert!(matches!(err, DiError::NoMatchingConstructor(_)));
    }
}
