//! Caller-supplied inputs and the resolved argument view handed to callables.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::signature::ParameterInfo;
use crate::value::Value;

/// Named input values, matched against parameter names.
///
/// Keys keep insertion order; inserting an existing key replaces its value.
/// Matching against parameter names ignores ASCII case unless the container
/// options say otherwise.
#[derive(Debug, Clone, Default)]
pub struct NamedArgs {
    entries: Vec<(String, Value)>,
}

impl NamedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder form of [`NamedArgs::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Index of the entry named `name`.
    pub(crate) fn position(&self, name: &str, case_insensitive: bool) -> Option<usize> {
        self.entries.iter().position(|(key, _)| {
            if case_insensitive {
                key.eq_ignore_ascii_case(name)
            } else {
                key == name
            }
        })
    }

    pub(crate) fn entry(&self, index: usize) -> Option<(&str, &Value)> {
        self.entries.get(index).map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for NamedArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut named = NamedArgs::new();
        for (key, value) in iter {
            named.insert(key, value);
        }
        named
    }
}

/// Inputs for one activation or invocation: an optional named map plus
/// ordered positional values.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::Arguments;
///
/// let args = Arguments::new()
///     .arg("match")
///     .arg(4)
///     .named("testb", 10);
///
/// assert_eq!(args.positional().len(), 2);
/// assert!(args.named_args().unwrap().get("testb").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    named: Option<NamedArgs>,
    positional: Vec<Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional values only.
    pub fn positional_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            named: None,
            positional: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends a positional value.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Adds a named value.
    pub fn named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.get_or_insert_with(NamedArgs::new).insert(key, value);
        self
    }

    /// Replaces the named map.
    pub fn with_named(mut self, named: NamedArgs) -> Self {
        self.named = Some(named);
        self
    }

    pub fn named_args(&self) -> Option<&NamedArgs> {
        self.named.as_ref()
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }
}

/// Resolved argument vector passed to a constructor or method body.
///
/// Slots line up with the declared parameters. A slot can be empty when a
/// parameter fell back to the intrinsic default of a type that has none.
pub struct Args<'a> {
    values: &'a [Option<Value>],
    params: &'a [ParameterInfo],
}

impl<'a> Args<'a> {
    pub(crate) fn new(values: &'a [Option<Value>], params: &'a [ParameterInfo]) -> Self {
        Self { values, params }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw slot.
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    fn required(&self, index: usize) -> DiResult<&Value> {
        self.value(index).ok_or_else(|| DiError::MissingArgument {
            index,
            name: self.params.get(index).map_or("?", ParameterInfo::name),
        })
    }

    /// Shared handle to a sized argument.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let value = self.required(index)?;
        value.get::<T>().ok_or_else(|| mismatch::<T>(value))
    }

    /// Shared handle to a trait-object argument.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let value = self.required(index)?;
        value.get_trait::<T>().ok_or_else(|| mismatch::<T>(value))
    }

    /// Owned copy of a sized argument.
    pub fn cloned<T: Clone + Send + Sync + 'static>(&self, index: usize) -> DiResult<T> {
        let value = self.required(index)?;
        value.cloned::<T>().ok_or_else(|| mismatch::<T>(value))
    }

    /// Like [`Args::get`], but an empty slot is `Ok(None)`.
    pub fn optional<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Option<Arc<T>>> {
        match self.value(index) {
            None => Ok(None),
            Some(value) => value.get::<T>().map(Some).ok_or_else(|| mismatch::<T>(value)),
        }
    }

    /// Elements of an array-shaped argument (variadic parameters included).
    pub fn array<T: Clone + Send + Sync + 'static>(&self, index: usize) -> DiResult<Vec<T>> {
        Ok(self.get::<Box<[T]>>(index)?.to_vec())
    }

    /// Elements of a list-shaped argument.
    pub fn list<T: Clone + Send + Sync + 'static>(&self, index: usize) -> DiResult<Vec<T>> {
        Ok(self.get::<Vec<T>>(index)?.as_ref().clone())
    }
}

fn mismatch<T: ?Sized + 'static>(found: &Value) -> DiError {
    DiError::TypeMismatch {
        expected: std::any::type_name::<T>(),
        found: found.type_key().name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Signature;

    #[test]
    fn named_insert_replaces_existing_key() {
        let mut named = NamedArgs::new();
        named.insert("a", 1).insert("a", 2);
        assert_eq!(named.len(), 1);
        assert_eq!(named.get("a").and_then(|v| v.cloned::<i32>()), Some(2));
    }

    #[test]
    fn named_position_honours_case_mode() {
        let named: NamedArgs = [("Match", "x")].into_iter().collect();
        assert_eq!(named.position("match", true), Some(0));
        assert_eq!(named.position("match", false), None);
    }

    #[test]
    fn args_report_missing_and_mismatched_slots() {
        let signature = Signature::new().param::<i32>("a").param::<String>("b");
        let values = vec![Some(Value::from(1)), None];
        let args = Args::new(&values, signature.params());

        assert_eq!(*args.get::<i32>(0).unwrap(), 1);
        assert!(matches!(args.get::<String>(0), Err(DiError::TypeMismatch { .. })));
        assert!(matches!(args.get::<String>(1), Err(DiError::MissingArgument { index: 1, name: "b" })));
        assert!(args.optional::<String>(1).unwrap().is_none());
    }
}
