//! Fluent description of user types.

use std::marker::PhantomData;
use std::sync::Arc;

use super::{TypeDescriptor, TypeKind};
use crate::arguments::Args;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::signature::{Callable, Signature};
use crate::traits::Dispose;
use crate::value::Value;

/// Entry points for describing types to a [`TypeCatalog`](super::TypeCatalog).
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{DiError, Signature, TypeCatalog, TypeDef};
/// use std::sync::Arc;
///
/// trait Fake: Send + Sync { fn value(&self) -> i32; }
///
/// struct FakeA;
/// impl Fake for FakeA { fn value(&self) -> i32 { 1 } }
///
/// struct Int { value: i32 }
///
/// let mut catalog = TypeCatalog::new();
/// catalog
///     .register(TypeDef::interface::<dyn Fake>())
///     .register(
///         TypeDef::class::<FakeA>()
///             .constructor(Signature::new(), |_| Ok(FakeA))
///             .implements::<dyn Fake>(|a| a as Arc<dyn Fake>),
///     )
///     .register(
///         TypeDef::class::<Int>()
///             .constructor(Signature::new().param::<i32>("value"), |args| Ok(Int { value: args.cloned(0)? }))
///             .method("change", Signature::new().param::<i32>("delta"), |this, args| {
///                 Ok(this.value + args.cloned::<i32>(0)?)
///             })
///             .method("try_throw", Signature::new(), |_, _| -> Result<(), DiError> {
///                 Err(DiError::invocation("content defined"))
///             }),
///     );
/// ```
pub struct TypeDef;

impl TypeDef {
    /// Constructible reference type.
    pub fn class<T: Send + Sync + 'static>() -> ClassDef<T> {
        ClassDef::new(TypeKind::Class)
    }

    /// Constructible value type; its `Default` is the intrinsic default.
    pub fn value_type<T: Default + Send + Sync + 'static>() -> ClassDef<T> {
        let mut def = ClassDef::new(TypeKind::ValueType);
        def.descriptor.set_default(Arc::new(|| Value::new(T::default())));
        def
    }

    /// Trait-object service type; never activated directly.
    pub fn interface<T: ?Sized + 'static>() -> TypeDescriptor {
        TypeDescriptor::new(TypeKey::of::<T>(), TypeKind::Interface)
    }

    /// Abstract base; never activated directly.
    pub fn abstract_class<T: ?Sized + 'static>() -> TypeDescriptor {
        TypeDescriptor::new(TypeKey::of::<T>(), TypeKind::Abstract)
    }

    /// Enumeration; never activated, intrinsic default is `T::default()`.
    pub fn enumeration<T: Default + Send + Sync + 'static>() -> TypeDescriptor {
        let mut descriptor = TypeDescriptor::new(TypeKey::of::<T>(), TypeKind::Enum);
        descriptor.set_default(Arc::new(|| Value::new(T::default())));
        descriptor
    }

    /// Known type that is neither a class nor a value type (function
    /// pointers, raw handles).
    pub fn opaque<T: ?Sized + 'static>() -> TypeDescriptor {
        TypeDescriptor::new(TypeKey::of::<T>(), TypeKind::Opaque)
    }
}

/// Builder for a class or value type.
pub struct ClassDef<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ClassDef<T> {
    fn new(kind: TypeKind) -> Self {
        Self {
            descriptor: TypeDescriptor::new(TypeKey::of::<T>(), kind),
            _marker: PhantomData,
        }
    }

    /// Adds a public constructor. Overloads are added by calling this again.
    pub fn constructor<F>(mut self, signature: Signature, build: F) -> Self
    where
        F: Fn(&Args<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let invoker = Arc::new(move |_: Option<&Value>, args: &Args<'_>| build(args).map(|v| Some(Value::new(v))));
        self.descriptor.push_constructor(Callable::new("new", signature, invoker));
        self
    }

    /// Adds a public instance method. Methods returning `()` produce no
    /// value; methods returning [`Value`] pass it through unchanged.
    pub fn method<R, F>(mut self, name: &'static str, signature: Signature, body: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&T, &Args<'_>) -> DiResult<R> + Send + Sync + 'static,
    {
        let invoker = Arc::new(move |target: Option<&Value>, args: &Args<'_>| {
            let target = target.ok_or(DiError::MissingArgument { index: 0, name: "self" })?;
            let this = target.downcast_ref::<T>().ok_or(DiError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found: target.type_key().name(),
            })?;
            body(this, args).map(Value::from_return)
        });
        self.descriptor.push_method(Callable::new(name, signature, invoker));
        self
    }

    /// Declares that `T` can stand in for the service type `S`.
    pub fn implements<S>(mut self, cast: fn(Arc<T>) -> Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let upcast = Arc::new(move |value: &Value| value.get::<T>().map(|concrete| Value::from_trait(cast(concrete))));
        self.descriptor.insert_upcast(TypeKey::of::<S>(), upcast);
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

impl<T: Dispose> ClassDef<T> {
    /// Instances built by the factory run [`Dispose::dispose`] when the
    /// container releases them.
    pub fn disposable(mut self) -> Self {
        self.descriptor.set_disposer(Arc::new(|value: Value| match value.get::<T>() {
            Some(instance) => value.with_disposer(Arc::new(move || instance.dispose())),
            None => value,
        }));
        self
    }
}

impl<T: Send + Sync + 'static> From<ClassDef<T>> for TypeDescriptor {
    fn from(def: ClassDef<T>) -> Self {
        def.build()
    }
}
