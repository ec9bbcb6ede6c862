//! Type-erased instances flowing through the matcher and the container.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::TypeKey;
use crate::traits::Dispose;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Disposal hook captured when a disposable instance is wrapped.
pub(crate) type Disposer = Arc<dyn Fn() -> DiResult<()> + Send + Sync>;

/// A reference-counted, type-erased instance.
///
/// Every value knows the [`TypeKey`] it was created as. Sized types are
/// stored directly; trait objects are stored as `Arc<Arc<dyn Trait>>` and
/// read back with [`Value::get_trait`]. Cloning a `Value` clones the `Arc`,
/// so clones are reference-identical ([`Value::ptr_eq`]).
///
/// A value may carry a disposal hook (see [`Value::disposable`]); lifetime
/// management invokes it when a cached instance is released.
///
/// `Value` doubles as the dynamic "any" type: a parameter declared as
/// `Value` accepts every candidate unchanged.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::Value;
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn hi(&self) -> &'static str; }
/// struct English;
/// impl Greeter for English { fn hi(&self) -> &'static str { "hello" } }
///
/// let number = Value::from(42i32);
/// assert_eq!(number.cloned::<i32>(), Some(42));
/// assert!(number.get::<String>().is_none());
///
/// let greeter = Value::from_trait::<dyn Greeter>(Arc::new(English));
/// assert_eq!(greeter.get_trait::<dyn Greeter>().unwrap().hi(), "hello");
///
/// let copy = greeter.clone();
/// assert!(copy.ptr_eq(&greeter));
/// ```
#[derive(Clone)]
pub struct Value {
    inner: AnyArc,
    key: TypeKey,
    disposer: Option<Disposer>,
}

impl Value {
    /// Wraps a sized value.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an existing `Arc` without re-allocating.
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            key: TypeKey::of::<T>(),
            disposer: None,
        }
    }

    /// Wraps a trait object under the key of the trait itself.
    pub fn from_trait<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            inner: Arc::new(value),
            key: TypeKey::of::<T>(),
            disposer: None,
        }
    }

    /// Wraps a value whose [`Dispose`] implementation runs when the
    /// container releases it.
    pub fn disposable<T: Dispose>(value: T) -> Self {
        let shared = Arc::new(value);
        let hook = shared.clone();
        Self::from_arc(shared).with_disposer(Arc::new(move || hook.dispose()))
    }

    /// Array-shaped collection (`Box<[T]>`).
    pub fn array<T: Send + Sync + 'static>(items: Vec<T>) -> Self {
        Self::new(items.into_boxed_slice())
    }

    /// List-shaped collection (`Vec<T>`).
    pub fn list<T: Send + Sync + 'static>(items: Vec<T>) -> Self {
        Self::new(items)
    }

    /// Converts one collection element back into a value.
    ///
    /// Elements that already are `Value`s are returned as-is, so dynamic
    /// collections keep the identity of their items.
    pub(crate) fn from_element<T: Clone + Send + Sync + 'static>(item: &T) -> Self {
        match (item as &dyn Any).downcast_ref::<Value>() {
            Some(value) => value.clone(),
            None => Value::new(item.clone()),
        }
    }

    /// Wraps the return value of a method body.
    ///
    /// `()` yields no value and a returned `Value` is passed through.
    pub(crate) fn from_return<R: Send + Sync + 'static>(returned: R) -> Option<Self> {
        let mut slot = Some(returned);
        if let Some(value) = (&mut slot as &mut dyn Any).downcast_mut::<Option<Value>>() {
            return value.take();
        }
        if TypeId::of::<R>() == TypeId::of::<()>() {
            return None;
        }
        slot.map(Value::new)
    }

    /// The key this value was created as.
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    /// Whether this value was created as `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.key.is::<T>()
    }

    /// Shared handle to a sized value.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }

    /// Shared handle to a trait object stored with [`Value::from_trait`].
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.downcast_ref::<Arc<T>>().cloned()
    }

    /// Borrow of a sized value.
    pub fn downcast_ref<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Owned copy of a sized value.
    ///
    /// Asking for `Value` itself yields a clone of `self`.
    pub fn cloned<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        if let Some(this) = (self as &dyn Any).downcast_ref::<T>() {
            return Some(this.clone());
        }
        self.downcast_ref::<T>().cloned()
    }

    /// Reference identity.
    #[inline]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether releasing this value runs a disposal hook.
    pub fn is_disposable(&self) -> bool {
        self.disposer.is_some()
    }

    pub(crate) fn with_disposer(mut self, disposer: Disposer) -> Self {
        self.disposer = Some(disposer);
        self
    }

    /// Carries the disposal hook of `origin` over to a converted value.
    pub(crate) fn inherit_disposer(mut self, origin: &Value) -> Self {
        if self.disposer.is_none() {
            self.disposer = origin.disposer.clone();
        }
        self
    }

    pub(crate) fn dispose(&self) -> DiResult<()> {
        match &self.disposer {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.key.name())
            .field("disposable", &self.disposer.is_some())
            .finish()
    }
}

macro_rules! value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::new(value)
                }
            }
        )*
    };
}

value_from!(bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::new(value.to_string())
    }
}

impl<T: Send + Sync + 'static> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::list(items)
    }
}

impl<T: Send + Sync + 'static> From<Box<[T]>> for Value {
    fn from(items: Box<[T]>) -> Self {
        Value::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tracked(Arc<AtomicUsize>);

    impl Dispose for Tracked {
        fn dispose(&self) -> DiResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn cloned_value_of_value_is_identity() {
        let original = Value::from("x");
        let copy = original.cloned::<Value>().unwrap();
        assert!(copy.ptr_eq(&original));
    }

    #[test]
    fn disposer_survives_inheritance() {
        let counter = Arc::new(AtomicUsize::new(0));
        let tracked = Value::disposable(Tracked(counter.clone()));
        let converted = Value::new(5u8).inherit_disposer(&tracked);

        assert!(converted.is_disposable());
        converted.dispose().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn from_element_keeps_dynamic_items() {
        let inner = Value::from(3i64);
        let back = Value::from_element(&inner);
        assert!(back.ptr_eq(&inner));

        let plain = Value::from_element(&7u16);
        assert_eq!(plain.cloned::<u16>(), Some(7));
    }

    #[test]
    fn return_values_unwrap_unit_and_values() {
        assert!(Value::from_return(()).is_none());
        let inner = Value::from(1u8);
        assert!(Value::from_return(inner.clone()).unwrap().ptr_eq(&inner));
        assert_eq!(Value::from_return(9i32).and_then(|v| v.cloned::<i32>()), Some(9));
    }

    #[test]
    fn collections_have_distinct_shapes() {
        let array = Value::array(vec![1, 2, 3]);
        let list = Value::list(vec![1, 2, 3]);
        assert!(array.is::<Box<[i32]>>());
        assert!(list.is::<Vec<i32>>());
        assert_ne!(array.type_key(), list.type_key());
    }
}
