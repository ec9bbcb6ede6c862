//! Service registry: one descriptor per service type.

use std::sync::Arc;

use ahash::AHashMap;

use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::lifetime::Lifetime;

/// Registry entry with its runtime slot
struct Entry {
    descriptor: Arc<ServiceDescriptor>,
    /// Scoped slot index for O(1) scoped service resolution
    scoped_slot: Option<usize>,
}

/// Map from service type to descriptor.
///
/// Keys are unique: adding a second descriptor for a registered service
/// type is refused unless replacement is requested. Enumeration follows
/// registration order.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{ServiceDescriptor, ServiceRegistry, TypeKey};
/// use std::sync::Arc;
///
/// let mut registry = ServiceRegistry::new();
/// assert!(registry.add(Arc::new(ServiceDescriptor::instance(1u32)), false));
/// assert!(!registry.add(Arc::new(ServiceDescriptor::instance(2u32)), false));
/// assert!(registry.add(Arc::new(ServiceDescriptor::instance(3u32)), true));
///
/// let current = registry.get(TypeKey::of::<u32>()).unwrap();
/// assert!(registry.remove(&current));
/// assert!(registry.try_get(TypeKey::of::<u32>()).is_none());
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    entries: Vec<Entry>,
    index: AHashMap<TypeKey, usize>,
    /// Total count of scoped registrations for slot allocation
    scoped_count: usize,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `descriptor`; returns `false` when its service type is already
    /// registered and `replace` is not set.
    pub fn add(&mut self, descriptor: Arc<ServiceDescriptor>, replace: bool) -> bool {
        let key = descriptor.service_type();
        let entry = Entry {
            descriptor,
            scoped_slot: None,
        };
        match self.index.get(&key) {
            Some(&position) if replace => {
                tracing::debug!(service = key.name(), "replaced registration");
                self.entries[position] = entry;
                true
            }
            Some(_) => {
                tracing::debug!(service = key.name(), "duplicate registration refused");
                false
            }
            None => {
                tracing::debug!(service = key.name(), lifetime = %entry.descriptor.lifetime(), "added registration");
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
                true
            }
        }
    }

    /// Removes exactly this descriptor (reference identity); returns
    /// whether it was registered.
    pub fn remove(&mut self, descriptor: &Arc<ServiceDescriptor>) -> bool {
        let Some(position) = self
            .entries
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.descriptor, descriptor))
        else {
            return false;
        };
        self.entries.remove(position);
        self.reindex();
        tracing::debug!(service = descriptor.service_type().name(), "removed registration");
        true
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.descriptor.service_type(), position))
            .collect();
    }

    /// Descriptor for `key`.
    ///
    /// # Errors
    ///
    /// [`DiError::NotFound`] if nothing is registered for `key`.
    pub fn get(&self, key: TypeKey) -> DiResult<Arc<ServiceDescriptor>> {
        self.try_get(key).ok_or(DiError::NotFound(key.name()))
    }

    pub fn try_get(&self, key: TypeKey) -> Option<Arc<ServiceDescriptor>> {
        self.lookup(key).cloned()
    }

    #[inline]
    pub(crate) fn lookup(&self, key: TypeKey) -> Option<&Arc<ServiceDescriptor>> {
        self.index.get(&key).map(|&position| &self.entries[position].descriptor)
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.index.contains_key(&key)
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Arc<ServiceDescriptor>> {
        self.entries.iter().map(|entry| &entry.descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finalizes registry by assigning scoped slot indices
    pub(crate) fn finalize(&mut self) {
        let mut next_scoped_slot = 0;
        for entry in &mut self.entries {
            entry.scoped_slot = if entry.descriptor.lifetime() == Lifetime::Scoped {
                next_scoped_slot += 1;
                Some(next_scoped_slot - 1)
            } else {
                None
            };
        }
        self.scoped_count = next_scoped_slot;
    }

    /// Slot of a Scoped registration, valid after [`finalize`](Self::finalize).
    #[inline]
    pub(crate) fn scoped_slot(&self, key: TypeKey) -> Option<usize> {
        self.index.get(&key).and_then(|&position| self.entries[position].scoped_slot)
    }

    pub(crate) fn scoped_count(&self) -> usize {
        self.scoped_count
    }

    /// Human-readable listing of every registration.
    #[cfg(feature = "diagnostics")]
    pub fn dump(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{:?}", entry.descriptor))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Clone for ServiceRegistry {
    fn clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|entry| Entry {
                    descriptor: entry.descriptor.clone(),
                    scoped_slot: entry.scoped_slot,
                })
                .collect(),
            index: self.index.clone(),
            scoped_count: self.scoped_count,
        }
    }
}
