//! Array and list shapes known to the catalog.

use std::fmt;
use std::sync::Arc;

use crate::key::TypeKey;
use crate::value::Value;

/// Which container a collection type builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionShape {
    /// `Box<[T]>`
    Array,
    /// `Vec<T>`
    List,
}

type BuildFn = Arc<dyn Fn(&[Value]) -> Option<Value> + Send + Sync>;
type ItemsFn = Arc<dyn Fn(&Value) -> Option<Vec<Value>> + Send + Sync>;

/// How to build a collection from matched elements and how to enumerate
/// an existing one.
///
/// Collection coercion produces exactly the shape requested: an array
/// parameter receives a `Box<[T]>`, a list parameter a `Vec<T>`.
#[derive(Clone)]
pub struct CollectionInfo {
    element: TypeKey,
    key: TypeKey,
    shape: CollectionShape,
    build: BuildFn,
    items: ItemsFn,
}

impl CollectionInfo {
    /// `Box<[T]>`
    pub fn array<T: Clone + Send + Sync + 'static>() -> Self {
        Self {
            element: TypeKey::of::<T>(),
            key: TypeKey::of::<Box<[T]>>(),
            shape: CollectionShape::Array,
            build: Arc::new(|elements| {
                elements
                    .iter()
                    .map(Value::cloned::<T>)
                    .collect::<Option<Vec<T>>>()
                    .map(Value::array)
            }),
            items: Arc::new(|value| {
                value
                    .downcast_ref::<Box<[T]>>()
                    .map(|items| items.iter().map(Value::from_element).collect())
            }),
        }
    }

    /// `Vec<T>`
    pub fn list<T: Clone + Send + Sync + 'static>() -> Self {
        Self {
            element: TypeKey::of::<T>(),
            key: TypeKey::of::<Vec<T>>(),
            shape: CollectionShape::List,
            build: Arc::new(|elements| {
                elements
                    .iter()
                    .map(Value::cloned::<T>)
                    .collect::<Option<Vec<T>>>()
                    .map(Value::list)
            }),
            items: Arc::new(|value| {
                value
                    .downcast_ref::<Vec<T>>()
                    .map(|items| items.iter().map(Value::from_element).collect())
            }),
        }
    }

    /// Element type.
    pub fn element(&self) -> TypeKey {
        self.element
    }

    /// The collection type itself.
    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    pub fn shape(&self) -> CollectionShape {
        self.shape
    }

    /// Builds the collection from elements already matched to the element
    /// type. Returns `None` if any element has a different type.
    pub(crate) fn build(&self, elements: &[Value]) -> Option<Value> {
        (self.build)(elements)
    }

    /// Enumerates `value` if it is this collection type.
    pub(crate) fn items(&self, value: &Value) -> Option<Vec<Value>> {
        (self.items)(value)
    }

    /// The empty collection, used as the intrinsic default.
    pub(crate) fn empty(&self) -> Option<Value> {
        self.build(&[])
    }
}

impl fmt::Debug for CollectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionInfo")
            .field("type", &self.key.name())
            .field("element", &self.element.name())
            .field("shape", &self.shape)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_enumerates_arrays() {
        let info = CollectionInfo::array::<i32>();
        let built = info.build(&[Value::from(1), Value::from(2)]).unwrap();
        assert_eq!(built.downcast_ref::<Box<[i32]>>().map(|b| b.len()), Some(2));

        let items = info.items(&built).unwrap();
        assert_eq!(items[1].cloned::<i32>(), Some(2));
    }

    #[test]
    fn rejects_foreign_elements() {
        let info = CollectionInfo::list::<i32>();
        assert!(info.build(&[Value::from("x")]).is_none());
        assert!(info.items(&Value::array(vec![1])).is_none());
    }

    #[test]
    fn dynamic_lists_keep_item_identity() {
        let info = CollectionInfo::list::<Value>();
        let item = Value::from("shared");
        let built = info.build(&[item.clone()]).unwrap();
        let items = info.items(&built).unwrap();
        assert!(items[0].ptr_eq(&item));
    }
}
