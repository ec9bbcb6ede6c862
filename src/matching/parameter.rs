//! Binding of declared parameters to candidate inputs, with scoring.

use smallvec::SmallVec;

use super::hooks::ParameterMatchingArgs;
use super::traverse::ArgumentTraverseContext;
use super::{MatchOptions, Matcher, DEFAULT_VALUE_RATIO, SINGLE_PARAMETER_SCORE, TYPE_DEFAULT_RATIO};
use crate::error::DiResult;
use crate::signature::{Callable, ParameterInfo, ParameterKind};
use crate::value::Value;

/// How a single parameter was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchQuality {
    /// Bound to a supplied, resolved or hook-provided value.
    Matched,
    /// Fell back to the declared default.
    DeclaredDefault,
    /// Fell back to the intrinsic default of the parameter type.
    TypeDefault,
}

impl MatchQuality {
    /// Points earned by one parameter.
    pub fn weight(self) -> f64 {
        match self {
            MatchQuality::Matched => SINGLE_PARAMETER_SCORE,
            MatchQuality::DeclaredDefault => SINGLE_PARAMETER_SCORE * DEFAULT_VALUE_RATIO,
            MatchQuality::TypeDefault => SINGLE_PARAMETER_SCORE * TYPE_DEFAULT_RATIO,
        }
    }
}

/// Outcome of matching one callable: the argument vector and its score.
#[derive(Debug, Clone)]
pub struct ArgumentMatchedResult<'c> {
    callable: &'c Callable,
    args: Vec<Option<Value>>,
    qualities: Vec<MatchQuality>,
    score: f64,
    passed: bool,
}

impl<'c> ArgumentMatchedResult<'c> {
    pub fn callable(&self) -> &'c Callable {
        self.callable
    }

    /// Resolved values, one per declared parameter.
    pub fn args(&self) -> &[Option<Value>] {
        &self.args
    }

    pub fn qualities(&self) -> &[MatchQuality] {
        &self.qualities
    }

    /// Mean weight over all parameters; a parameterless callable scores
    /// [`SINGLE_PARAMETER_SCORE`].
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Every parameter always receives a value, so this is always `true`.
    pub fn is_passed(&self) -> bool {
        self.passed
    }

    pub(crate) fn into_args(self) -> Vec<Option<Value>> {
        self.args
    }
}

fn score_of(qualities: &[MatchQuality]) -> f64 {
    if qualities.is_empty() {
        return SINGLE_PARAMETER_SCORE;
    }
    qualities.iter().map(|q| q.weight()).sum::<f64>() / qualities.len() as f64
}

/// Per-run mutable state.
struct Binding<'o> {
    options: MatchOptions<'o>,
    traverse: ArgumentTraverseContext<'o>,
    used_names: SmallVec<[usize; 4]>,
}

impl<'a> Matcher<'a> {
    /// Binds every parameter of `callable` and scores the result.
    ///
    /// Each parameter takes the first rule that yields a value: variadic
    /// capture, output default, named value, positional value, service
    /// lookup, the "parameter matching" hook, declared default, positional
    /// value coerced to a collection, intrinsic type default. No parameter
    /// is ever left unbound; errors come only from hooks and from failing
    /// service resolutions.
    pub fn match_callable<'c>(&self, callable: &'c Callable, options: &MatchOptions<'_>) -> DiResult<ArgumentMatchedResult<'c>> {
        let params = callable.signature().params();
        let mut binding = Binding {
            options: *options,
            traverse: ArgumentTraverseContext::new(options.positional),
            used_names: SmallVec::new(),
        };

        let mut args = Vec::with_capacity(params.len());
        let mut qualities = Vec::with_capacity(params.len());
        for parameter in params {
            let (value, quality) = self.bind(parameter, &mut binding)?;
            args.push(value);
            qualities.push(quality);
        }

        let score = score_of(&qualities);
        Ok(ArgumentMatchedResult {
            callable,
            args,
            qualities,
            score,
            passed: true,
        })
    }

    fn bind(&self, parameter: &ParameterInfo, binding: &mut Binding<'_>) -> DiResult<(Option<Value>, MatchQuality)> {
        let ty = parameter.type_key();

        match parameter.kind() {
            ParameterKind::Variadic => return self.bind_variadic(parameter, binding).map(|v| (v, MatchQuality::Matched)),
            ParameterKind::Out => return Ok((self.catalog.type_default(ty), MatchQuality::Matched)),
            ParameterKind::Normal => {}
        }

        if let Some(value) = self.bind_named(parameter, binding)? {
            return Ok((Some(value), MatchQuality::Matched));
        }

        let mut matched = None;
        binding.traverse.find_and_consume(|candidate, _| {
            matched = self.match_value(ty, candidate)?;
            Ok(matched.is_some())
        })?;
        if matched.is_some() {
            return Ok((matched, MatchQuality::Matched));
        }

        if let Some(services) = binding.options.services {
            if let Some(service) = services.try_resolve(ty)? {
                return Ok((Some(service), MatchQuality::Matched));
            }
        }

        if let Some(value) = self.bind_from_hook(parameter, binding)? {
            return Ok((Some(value), MatchQuality::Matched));
        }

        if let Some(default) = parameter.default_value() {
            return Ok((Some(default.clone()), MatchQuality::DeclaredDefault));
        }

        binding.traverse.find_and_consume(|candidate, _| {
            matched = self.coerce_to_collection(candidate, ty, false)?;
            Ok(matched.is_some())
        })?;
        if matched.is_some() {
            return Ok((matched, MatchQuality::Matched));
        }

        Ok((self.catalog.type_default(ty), MatchQuality::TypeDefault))
    }

    fn bind_variadic(&self, parameter: &ParameterInfo, binding: &mut Binding<'_>) -> DiResult<Option<Value>> {
        let Some(info) = parameter.variadic_collection() else {
            return Ok(self.catalog.type_default(parameter.type_key()));
        };
        let element = info.element();
        let mut extras = Vec::new();

        if let Some(named) = binding.options.named {
            for (index, (_, value)) in named.iter().enumerate() {
                if binding.used_names.contains(&index) {
                    continue;
                }
                if let Some(matched) = self.match_element(element, value)? {
                    extras.push(matched);
                    binding.used_names.push(index);
                }
            }
        }

        binding.traverse.reset();
        while binding.traverse.advance(|candidate, _| {
            let matched = self.match_element(element, candidate)?;
            let hit = matched.is_some();
            extras.extend(matched);
            Ok(hit)
        })? {}

        Ok(info.build(&extras))
    }

    fn bind_named(&self, parameter: &ParameterInfo, binding: &mut Binding<'_>) -> DiResult<Option<Value>> {
        let Some(named) = binding.options.named else {
            return Ok(None);
        };
        let Some(index) = named.position(parameter.name(), self.case_insensitive) else {
            return Ok(None);
        };
        if binding.used_names.contains(&index) {
            return Ok(None);
        }
        let Some((_, value)) = named.entry(index) else {
            return Ok(None);
        };

        let ty = parameter.type_key();
        let mut bound = self.match_value(ty, value)?;
        if bound.is_none() {
            bound = self.coerce_to_collection(value, ty, true)?;
        }
        if bound.is_some() {
            binding.used_names.push(index);
        }
        Ok(bound)
    }

    fn bind_from_hook(&self, parameter: &ParameterInfo, binding: &mut Binding<'_>) -> DiResult<Option<Value>> {
        if self.hooks.is_empty() {
            return Ok(None);
        }
        binding.traverse.reset();
        let traverse = (!binding.traverse.is_empty()).then_some(&binding.traverse);
        let mut args = ParameterMatchingArgs::new(parameter, binding.options.services, binding.options.named, traverse);
        self.hooks.fire_parameter_matching(&mut args)?;
        let supplied = args.into_value();

        if let Some(value) = &supplied {
            binding.traverse.consume_identical(value);
        }
        Ok(supplied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::{Args, NamedArgs};
    use crate::catalog::TypeCatalog;
    use crate::matching::Hooks;
    use crate::signature::Signature;
    use std::sync::Arc;

    fn callable(signature: Signature) -> Callable {
        Callable::new("sample", signature, Arc::new(|_: Option<&Value>, _: &Args<'_>| Ok(None)))
    }

    #[test]
    fn parameterless_callable_scores_full_weight() {
        let catalog = TypeCatalog::new();
        let hooks = Hooks::new();
        let target = callable(Signature::new());
        let result = Matcher::new(&catalog, &hooks).match_callable(&target, &MatchOptions::new()).unwrap();
        assert_eq!(result.score(), SINGLE_PARAMETER_SCORE);
        assert!(result.is_passed());
    }

    #[test]
    fn tiers_average_over_parameters() {
        let catalog = TypeCatalog::new();
        let hooks = Hooks::new();
        let target = callable(Signature::new().param::<i32>("a").param_or("b", 1i32).param::<i32>("c"));
        let positional = [Value::from(5i32)];
        let options = MatchOptions::new().positional(&positional);

        let result = Matcher::new(&catalog, &hooks).match_callable(&target, &options).unwrap();
        assert_eq!(
            result.qualities(),
            &[MatchQuality::Matched, MatchQuality::DeclaredDefault, MatchQuality::TypeDefault]
        );
        assert!((result.score() - (10.0 + 7.5 + 5.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn hook_value_identical_to_candidate_consumes_it() {
        let catalog = TypeCatalog::new();
        let mut hooks = Hooks::new();
        hooks.on_parameter_matching(|args| {
            if args.parameter().name() == "first" {
                if let Some((_, picked)) = args.arguments().and_then(|ctx| ctx.remaining().last()) {
                    args.set_value(picked.clone())?;
                }
            }
            Ok(())
        });
        struct Marker;
        let target = callable(Signature::new().param::<Marker>("first").param::<Value>("second"));
        let positional = [Value::from("a"), Value::from("b")];
        let options = MatchOptions::new().positional(&positional);

        let result = Matcher::new(&catalog, &hooks).match_callable(&target, &options).unwrap();
        let args = result.args();
        assert!(args[0].as_ref().unwrap().ptr_eq(&positional[1]));
        assert!(args[1].as_ref().unwrap().ptr_eq(&positional[0]));
    }

    #[test]
    fn out_parameter_takes_type_default_without_consuming_inputs() {
        let catalog = TypeCatalog::new();
        let hooks = Hooks::new();
        let target = callable(Signature::new().out::<i32>("o").param::<i32>("x"));
        let named: NamedArgs = [("o", 5i32)].into_iter().collect();
        let positional = [Value::from(7i32)];
        let options = MatchOptions::new().named(&named).positional(&positional);

        let result = Matcher::new(&catalog, &hooks).match_callable(&target, &options).unwrap();
        let args = result.args();
        assert_eq!(args[0].as_ref().and_then(|v| v.cloned::<i32>()), Some(0));
        assert_eq!(args[1].as_ref().and_then(|v| v.cloned::<i32>()), Some(7));
        assert_eq!(result.qualities(), &[MatchQuality::Matched, MatchQuality::Matched]);
        assert_eq!(result.score(), SINGLE_PARAMETER_SCORE);
    }

    #[test]
    fn variadic_spends_named_values() {
        let catalog = TypeCatalog::new();
        let hooks = Hooks::new();
        let target = callable(Signature::new().variadic::<i32>("rest").param::<i32>("x"));
        let named: NamedArgs = [("x", 1i32)].into_iter().collect();
        let positional = [Value::from(2i32)];
        let options = MatchOptions::new().named(&named).positional(&positional);

        let result = Matcher::new(&catalog, &hooks).match_callable(&target, &options).unwrap();
        let rest = result.args()[0].as_ref().and_then(|v| v.downcast_ref::<Box<[i32]>>()).unwrap();
        assert_eq!(rest.to_vec(), vec![1, 2]);
        assert_eq!(result.qualities()[1], MatchQuality::TypeDefault);
    }
}
