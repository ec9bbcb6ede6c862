//! Declared parameter metadata and the callables it describes.

use std::fmt;
use std::sync::Arc;

use crate::arguments::Args;
use crate::catalog::CollectionInfo;
use crate::error::DiResult;
use crate::key::TypeKey;
use crate::value::Value;

/// How a parameter takes part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Bound from named values, positional values, services, hooks or defaults.
    Normal,
    /// Trailing rest parameter collecting every leftover matching candidate.
    Variadic,
    /// Output-only; always receives the intrinsic default of its type.
    Out,
}

/// One formal parameter of a constructor or method.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    name: &'static str,
    position: usize,
    ty: TypeKey,
    kind: ParameterKind,
    default: Option<Value>,
    variadic: Option<CollectionInfo>,
}

impl ParameterInfo {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Declared parameter type.
    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Declared default value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Collection built for a variadic parameter.
    pub(crate) fn variadic_collection(&self) -> Option<&CollectionInfo> {
        self.variadic.as_ref()
    }
}

/// Ordered parameter list of a callable.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{ParameterKind, Signature};
///
/// let signature = Signature::new()
///     .param::<String>("match")
///     .param_or("testint", 0i32)
///     .variadic::<i64>("rest");
///
/// assert_eq!(signature.len(), 3);
/// assert_eq!(signature.params()[1].name(), "testint");
/// assert!(signature.params()[1].has_default());
/// assert_eq!(signature.params()[2].kind(), ParameterKind::Variadic);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<ParameterInfo>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, name: &'static str, ty: TypeKey, kind: ParameterKind) -> Self {
        let position = self.params.len();
        self.params.push(ParameterInfo {
            name,
            position,
            ty,
            kind,
            default: None,
            variadic: None,
        });
        self
    }

    /// Required parameter of type `T` (sized or `dyn Trait`).
    pub fn param<T: ?Sized + 'static>(self, name: &'static str) -> Self {
        self.push(name, TypeKey::of::<T>(), ParameterKind::Normal)
    }

    /// Parameter of type `T` with a declared default.
    pub fn param_or<T: Send + Sync + 'static>(self, name: &'static str, default: T) -> Self {
        let mut this = self.push(name, TypeKey::of::<T>(), ParameterKind::Normal);
        if let Some(last) = this.params.last_mut() {
            last.default = Some(Value::new(default));
        }
        this
    }

    /// Rest parameter collecting `T` elements into a `Box<[T]>`.
    pub fn variadic<T: Clone + Send + Sync + 'static>(self, name: &'static str) -> Self {
        let collection = CollectionInfo::array::<T>();
        let mut this = self.push(name, collection.type_key(), ParameterKind::Variadic);
        if let Some(last) = this.params.last_mut() {
            last.variadic = Some(collection);
        }
        this
    }

    /// Output-only parameter of type `T`.
    pub fn out<T: ?Sized + 'static>(self, name: &'static str) -> Self {
        self.push(name, TypeKey::of::<T>(), ParameterKind::Out)
    }

    pub fn params(&self) -> &[ParameterInfo] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

pub(crate) type Invoker =
    Arc<dyn Fn(Option<&Value>, &Args<'_>) -> DiResult<Option<Value>> + Send + Sync>;

/// A constructor or method: name, declared signature and invoker.
///
/// Constructors ignore the target argument; methods receive the instance
/// they were invoked on.
#[derive(Clone)]
pub struct Callable {
    name: &'static str,
    signature: Signature,
    invoker: Invoker,
}

impl Callable {
    pub(crate) fn new(name: &'static str, signature: Signature, invoker: Invoker) -> Self {
        Self {
            name,
            signature,
            invoker,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn invoke(&self, target: Option<&Value>, values: &[Option<Value>]) -> DiResult<Option<Value>> {
        let args = Args::new(values, self.signature.params());
        (self.invoker)(target, &args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("params", &self.signature.params.iter().map(|p| p.name).collect::<Vec<_>>())
            .finish()
    }
}
