//! Compile-time-registered type metadata: kinds, constructors, methods, upcasts and defaults.
//!
//! Every type the factory can build, match or convert is described once in
//! a [`TypeCatalog`]: what kind of type it is, its public constructors and
//! methods, which service types it can stand in for, and its intrinsic
//! default.

mod builder;
mod collection;
mod primitive;

pub use builder::{ClassDef, TypeDef};
pub use collection::{CollectionInfo, CollectionShape};
pub use primitive::{convert, PrimitiveKind};

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::error::{DiError, DiResult, Unresolvable};
use crate::key::TypeKey;
use crate::signature::Callable;
use crate::value::Value;

/// Converts an instance into a value of another (service) type.
pub(crate) type Upcast = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;
type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;
type AttachDisposer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// What kind of type a catalog entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Constructible reference type.
    Class,
    /// Constructible value type with an intrinsic default.
    ValueType,
    /// Built-in scalar.
    Primitive(PrimitiveKind),
    Enum,
    /// Trait object service type.
    Interface,
    Abstract,
    Array,
    List,
    /// [`Value`] itself; accepts anything.
    Dynamic,
    /// Known to the catalog but neither a class nor a value type.
    Opaque,
}

/// Catalog entry for one type.
#[derive(Clone)]
pub struct TypeDescriptor {
    key: TypeKey,
    kind: TypeKind,
    constructors: Vec<Callable>,
    methods: Vec<Callable>,
    upcasts: AHashMap<TypeKey, Upcast>,
    default: Option<DefaultFn>,
    collection: Option<CollectionInfo>,
    disposer: Option<AttachDisposer>,
}

impl TypeDescriptor {
    pub(crate) fn new(key: TypeKey, kind: TypeKind) -> Self {
        Self {
            key,
            kind,
            constructors: Vec::new(),
            methods: Vec::new(),
            upcasts: AHashMap::new(),
            default: None,
            collection: None,
            disposer: None,
        }
    }

    fn primitive(kind: PrimitiveKind) -> Self {
        let mut descriptor = Self::new(kind.type_key(), TypeKind::Primitive(kind));
        descriptor.default = Some(Arc::new(move || kind.default_value()));
        descriptor
    }

    fn collection(info: CollectionInfo) -> Self {
        let kind = match info.shape() {
            CollectionShape::Array => TypeKind::Array,
            CollectionShape::List => TypeKind::List,
        };
        let mut descriptor = Self::new(info.type_key(), kind);
        descriptor.collection = Some(info);
        descriptor
    }

    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn constructors(&self) -> &[Callable] {
        &self.constructors
    }

    /// Overloads of the method `name`, in declaration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Callable> + 'a {
        self.methods.iter().filter(move |m| m.name() == name)
    }

    /// Whether instances convert to `target` through a declared upcast.
    pub fn implements(&self, target: TypeKey) -> bool {
        self.upcasts.contains_key(&target)
    }

    pub fn collection_info(&self) -> Option<&CollectionInfo> {
        self.collection.as_ref()
    }

    pub fn is_disposable(&self) -> bool {
        self.disposer.is_some()
    }

    /// Intrinsic default: the zero value of value types and primitives,
    /// the empty collection for arrays and lists, otherwise none.
    pub fn default_value(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default());
        }
        self.collection.as_ref().and_then(CollectionInfo::empty)
    }

    pub(crate) fn attach_disposer(&self, value: Value) -> Value {
        match &self.disposer {
            Some(attach) => attach(value),
            None => value,
        }
    }

    pub(crate) fn push_constructor(&mut self, callable: Callable) {
        self.constructors.push(callable);
    }

    pub(crate) fn push_method(&mut self, callable: Callable) {
        self.methods.push(callable);
    }

    pub(crate) fn insert_upcast(&mut self, target: TypeKey, upcast: Upcast) {
        self.upcasts.insert(target, upcast);
    }

    pub(crate) fn set_default(&mut self, default: DefaultFn) {
        self.default = Some(default);
    }

    pub(crate) fn set_disposer(&mut self, attach: AttachDisposer) {
        self.disposer = Some(attach);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.key.name())
            .field("kind", &self.kind)
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .field("upcasts", &self.upcasts.keys().map(TypeKey::name).collect::<Vec<_>>())
            .finish()
    }
}

/// Registry of type metadata consulted by the matcher and the factory.
///
/// A new catalog already knows every primitive, `String`, the dynamic
/// [`Value`] type and the array (`Box<[T]>`) and list (`Vec<T>`) shapes
/// of all of them.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{Signature, TypeCatalog, TypeDef, TypeKey, TypeKind};
///
/// struct Point { x: i32 }
///
/// let mut catalog = TypeCatalog::new();
/// catalog.register(
///     TypeDef::class::<Point>()
///         .constructor(Signature::new().param::<i32>("x"), |args| Ok(Point { x: args.cloned(0)? })),
/// );
///
/// assert_eq!(catalog.kind(TypeKey::of::<Point>()), Some(TypeKind::Class));
/// assert_eq!(catalog.kind(TypeKey::of::<Vec<u8>>()), Some(TypeKind::List));
/// ```
#[derive(Clone)]
pub struct TypeCatalog {
    types: AHashMap<TypeKey, TypeDescriptor>,
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! register_builtin_collections {
    ($catalog:expr, $($ty:ty),* $(,)?) => {
        $( $catalog.register_collections::<$ty>(); )*
    };
}

impl TypeCatalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            types: AHashMap::new(),
        };
        for kind in primitive::ALL_PRIMITIVES {
            catalog.insert(TypeDescriptor::primitive(kind));
        }
        catalog.insert(TypeDescriptor::new(TypeKey::of::<Value>(), TypeKind::Dynamic));
        register_builtin_collections!(
            catalog, bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, Value,
        );
        catalog
    }

    fn insert(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.key, descriptor);
    }

    /// Adds or replaces the description of a type.
    pub fn register(&mut self, descriptor: impl Into<TypeDescriptor>) -> &mut Self {
        let descriptor = descriptor.into();
        let replaced = self.types.contains_key(&descriptor.key);
        tracing::debug!(
            type_name = descriptor.key.name(),
            kind = ?descriptor.kind,
            constructors = descriptor.constructors.len(),
            methods = descriptor.methods.len(),
            replaced,
            "registered type"
        );
        self.insert(descriptor);
        self
    }

    /// Makes `Box<[T]>` and `Vec<T>` known, so they can be coerced to,
    /// enumerated and defaulted.
    pub fn register_collections<T: Clone + Send + Sync + 'static>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor::collection(CollectionInfo::array::<T>()));
        self.insert(TypeDescriptor::collection(CollectionInfo::list::<T>()));
        self
    }

    pub fn get(&self, key: TypeKey) -> Option<&TypeDescriptor> {
        self.types.get(&key)
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.types.contains_key(&key)
    }

    pub fn kind(&self, key: TypeKey) -> Option<TypeKind> {
        self.types.get(&key).map(|d| d.kind)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Collection metadata for an array or list type.
    pub(crate) fn collection(&self, key: TypeKey) -> Option<&CollectionInfo> {
        self.types.get(&key).and_then(TypeDescriptor::collection_info)
    }

    /// Intrinsic default of `key`; `None` for types without one.
    pub fn type_default(&self, key: TypeKey) -> Option<Value> {
        self.types.get(&key).and_then(TypeDescriptor::default_value)
    }

    /// Converts `value` to `target` through the upcast table of its type.
    pub(crate) fn upcast(&self, value: &Value, target: TypeKey) -> Option<Value> {
        let upcast = self.types.get(&value.type_key())?.upcasts.get(&target)?;
        upcast(value).map(|converted| converted.inherit_disposer(value))
    }

    /// Whether `source` is `target` or upcasts to it.
    pub fn is_assignable(&self, target: TypeKey, source: TypeKey) -> bool {
        target == source
            || self.kind(target) == Some(TypeKind::Dynamic)
            || self.types.get(&source).is_some_and(|d| d.implements(target))
    }

    /// Rejects types that can never be activated, before any matching.
    ///
    /// Checked in order: array, enum, non-class/non-value, abstract,
    /// interface.
    pub(crate) fn check_instantiable(&self, key: TypeKey) -> DiResult<&TypeDescriptor> {
        let descriptor = self.types.get(&key).ok_or(DiError::Unresolvable {
            reason: Unresolvable::Undescribed,
            type_name: key.name(),
        })?;
        let reason = match descriptor.kind {
            TypeKind::Array => Some(Unresolvable::Array),
            TypeKind::Enum => Some(Unresolvable::Enum),
            TypeKind::Opaque | TypeKind::Dynamic => Some(Unresolvable::NonInstantiable),
            TypeKind::Abstract => Some(Unresolvable::Abstract),
            TypeKind::Interface => Some(Unresolvable::Interface),
            TypeKind::Class | TypeKind::ValueType | TypeKind::Primitive(_) | TypeKind::List => None,
        };
        match reason {
            Some(reason) => Err(DiError::Unresolvable {
                reason,
                type_name: key.name(),
            }),
            None => Ok(descriptor),
        }
    }

    /// Human-readable listing of every described type.
    #[cfg(feature = "diagnostics")]
    pub fn dump(&self) -> String {
        let mut lines: Vec<String> = self
            .types
            .values()
            .map(|d| format!("{} [{:?}] ctors={} methods={}", d.key.name(), d.kind, d.constructors.len(), d.methods.len()))
            .collect();
        lines.sort();
        lines.join("\n")
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCatalog").field("types", &self.types.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {}
    struct Square;
    impl Shape for Square {}

    #[test]
    fn builtins_are_described() {
        let catalog = TypeCatalog::new();
        assert_eq!(catalog.kind(TypeKey::of::<i32>()), Some(TypeKind::Primitive(PrimitiveKind::I32)));
        assert_eq!(catalog.kind(TypeKey::of::<Box<[String]>>()), Some(TypeKind::Array));
        assert_eq!(catalog.kind(TypeKey::of::<Value>()), Some(TypeKind::Dynamic));
        assert_eq!(catalog.type_default(TypeKey::of::<f64>()).and_then(|v| v.cloned::<f64>()), Some(0.0));
        let empty = catalog.type_default(TypeKey::of::<Vec<i32>>()).unwrap();
        assert_eq!(empty.downcast_ref::<Vec<i32>>().map(Vec::len), Some(0));
    }

    #[test]
    fn rejections_carry_distinct_reasons() {
        let mut catalog = TypeCatalog::new();
        catalog.register(TypeDef::interface::<dyn Shape>());
        let reason = |key| match catalog.check_instantiable(key) {
            Err(DiError::Unresolvable { reason, .. }) => Some(reason),
            _ => None,
        };
        assert_eq!(reason(TypeKey::of::<Box<[i32]>>()), Some(Unresolvable::Array));
        assert_eq!(reason(TypeKey::of::<dyn Shape>()), Some(Unresolvable::Interface));
        assert_eq!(reason(TypeKey::of::<Square>()), Some(Unresolvable::Undescribed));
        assert_eq!(reason(TypeKey::of::<Value>()), Some(Unresolvable::NonInstantiable));
        assert_eq!(reason(TypeKey::of::<i32>()), None);
    }

    #[test]
    fn upcasts_drive_assignability() {
        let mut catalog = TypeCatalog::new();
        catalog.register(TypeDef::class::<Square>().implements::<dyn Shape>(|s| s as Arc<dyn Shape>));

        let square = TypeKey::of::<Square>();
        let shape = TypeKey::of::<dyn Shape>();
        assert!(catalog.is_assignable(shape, square));
        assert!(!catalog.is_assignable(square, shape));
        assert!(catalog.is_assignable(TypeKey::of::<Value>(), square));

        let converted = catalog.upcast(&Value::new(Square), shape).unwrap();
        assert!(converted.get_trait::<dyn Shape>().is_some());
    }
}
