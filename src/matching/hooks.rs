//! Container-owned extensibility hooks consulted when matching runs dry.

use std::fmt;
use std::sync::Arc;

use super::traverse::ArgumentTraverseContext;
use crate::arguments::NamedArgs;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::signature::ParameterInfo;
use crate::traits::ResolverCore;
use crate::value::Value;

/// Event data for the "parameter matching" hook.
///
/// Fired for a parameter that no named value, positional value or service
/// satisfied. A handler supplies a value with [`set_value`]; only one
/// value may be supplied per firing.
///
/// [`set_value`]: ParameterMatchingArgs::set_value
pub struct ParameterMatchingArgs<'a> {
    parameter: &'a ParameterInfo,
    services: Option<&'a dyn ResolverCore>,
    named: Option<&'a NamedArgs>,
    arguments: Option<&'a ArgumentTraverseContext<'a>>,
    value: Option<Value>,
    handled: bool,
}

impl<'a> ParameterMatchingArgs<'a> {
    pub(crate) fn new(
        parameter: &'a ParameterInfo,
        services: Option<&'a dyn ResolverCore>,
        named: Option<&'a NamedArgs>,
        arguments: Option<&'a ArgumentTraverseContext<'a>>,
    ) -> Self {
        Self {
            parameter,
            services,
            named,
            arguments,
            value: None,
            handled: false,
        }
    }

    pub fn parameter(&self) -> &ParameterInfo {
        self.parameter
    }

    /// Dependency lookup of the current resolution, if any.
    pub fn services(&self) -> Option<&'a dyn ResolverCore> {
        self.services
    }

    pub fn named(&self) -> Option<&'a NamedArgs> {
        self.named
    }

    /// Positional candidates and which of them are still unused.
    pub fn arguments(&self) -> Option<&'a ArgumentTraverseContext<'a>> {
        self.arguments
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Supplies the value for the parameter.
    ///
    /// # Errors
    ///
    /// [`DiError::DoubleHandledHook`] if a value was already supplied in
    /// this firing.
    pub fn set_value(&mut self, value: impl Into<Value>) -> DiResult<()> {
        if self.handled {
            return Err(DiError::DoubleHandledHook("parameter matching"));
        }
        self.value = Some(value.into());
        self.handled = true;
        Ok(())
    }

    pub(crate) fn into_value(self) -> Option<Value> {
        if self.handled {
            self.value
        } else {
            None
        }
    }
}

/// Event data for the "value matching" hook.
///
/// Fired when a value is neither assignable nor convertible to the target
/// type.
pub struct ValueMatchingArgs<'a> {
    target: TypeKey,
    source: &'a Value,
    value: Option<Value>,
    handled: bool,
}

impl<'a> ValueMatchingArgs<'a> {
    pub(crate) fn new(target: TypeKey, source: &'a Value) -> Self {
        Self {
            target,
            source,
            value: None,
            handled: false,
        }
    }

    pub fn target_type(&self) -> TypeKey {
        self.target
    }

    pub fn source_type(&self) -> TypeKey {
        self.source.type_key()
    }

    pub fn source(&self) -> &'a Value {
        self.source
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Supplies the converted value.
    ///
    /// # Errors
    ///
    /// [`DiError::DoubleHandledHook`] if a value was already supplied in
    /// this firing.
    pub fn set_value(&mut self, value: impl Into<Value>) -> DiResult<()> {
        if self.handled {
            return Err(DiError::DoubleHandledHook("value matching"));
        }
        self.value = Some(value.into());
        self.handled = true;
        Ok(())
    }

    pub(crate) fn into_value(self) -> Option<Value> {
        if self.handled {
            self.value
        } else {
            None
        }
    }
}

type ParameterHook = Arc<dyn Fn(&mut ParameterMatchingArgs<'_>) -> DiResult<()> + Send + Sync>;
type ValueHook = Arc<dyn Fn(&mut ValueMatchingArgs<'_>) -> DiResult<()> + Send + Sync>;

/// Subscribers of both hooks, owned by one container.
///
/// Every subscriber sees every firing, in subscription order. Containers
/// never share hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    parameter: Vec<ParameterHook>,
    value: Vec<ValueHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_parameter_matching<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ParameterMatchingArgs<'_>) -> DiResult<()> + Send + Sync + 'static,
    {
        self.parameter.push(Arc::new(handler));
        self
    }

    pub fn on_value_matching<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ValueMatchingArgs<'_>) -> DiResult<()> + Send + Sync + 'static,
    {
        self.value.push(Arc::new(handler));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parameter.is_empty() && self.value.is_empty()
    }

    pub(crate) fn fire_parameter_matching(&self, args: &mut ParameterMatchingArgs<'_>) -> DiResult<()> {
        for handler in &self.parameter {
            handler(args)?;
        }
        Ok(())
    }

    pub(crate) fn fire_value_matching(&self, args: &mut ValueMatchingArgs<'_>) -> DiResult<()> {
        for handler in &self.value {
            handler(args)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("parameter_matching", &self.parameter.len())
            .field("value_matching", &self.value.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_value_in_one_firing_is_rejected() {
        let mut hooks = Hooks::new();
        hooks.on_value_matching(|args| args.set_value(1i32));
        hooks.on_value_matching(|args| args.set_value(2i32));

        let source = Value::from("x");
        let mut args = ValueMatchingArgs::new(TypeKey::of::<i32>(), &source);
        let err = hooks.fire_value_matching(&mut args).unwrap_err();
        assert!(matches!(err, DiError::DoubleHandledHook("value matching")));
    }

    #[test]
    fn unhandled_firing_yields_nothing() {
        let hooks = Hooks::new();
        let source = Value::from("x");
        let mut args = ValueMatchingArgs::new(TypeKey::of::<i32>(), &source);
        hooks.fire_value_matching(&mut args).unwrap();
        assert!(args.into_value().is_none());
    }
}
