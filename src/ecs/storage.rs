//! Component Storage
//!
//! One `ComponentStorage<T>` exists per component type, mapping entity slot
//! indices to component values. Storage is a sparse set: a sparse array
//! (entity index -> dense slot) over dense, tightly packed component and
//! entity-index arrays. Insert, remove and lookup are O(1); iteration walks
//! only the components that actually exist, which keeps single-type queries
//! proportional to the number of matches rather than the number of entities.
//!
//! The `AnyStorage` trait is the type-erased face of a storage: the world
//! keeps `Box<dyn AnyStorage>` columns keyed by `TypeId` and downcasts for
//! typed access.

use std::any::Any;

/// Sparse-set storage for a single component type.
pub struct ComponentStorage<T> {
    /// Entity slot index -> position in the dense arrays.
    sparse: Vec<Option<u32>>,
    /// Entity slot index for each dense position (parallel to `data`).
    entities: Vec<u32>,
    /// Component values, tightly packed.
    data: Vec<T>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Attach a component to an entity slot, replacing any existing one.
    pub fn insert(&mut self, index: u32, component: T) {
        let idx = index as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }
        match self.sparse[idx] {
            Some(dense) => self.data[dense as usize] = component,
            None => {
                self.sparse[idx] = Some(self.entities.len() as u32);
                self.entities.push(index);
                self.data.push(component);
            }
        }
    }

    /// Detach and return the component, if present.
    ///
    /// Uses swap-remove on the dense arrays, so the last element's sparse
    /// entry is patched to its new position.
    pub fn remove(&mut self, index: u32) -> Option<T> {
        let dense = self.sparse.get(index as usize).copied().flatten()? as usize;
        self.sparse[index as usize] = None;

        let value = self.data.swap_remove(dense);
        self.entities.swap_remove(dense);
        if dense < self.entities.len() {
            let moved = self.entities[dense];
            self.sparse[moved as usize] = Some(dense as u32);
        }
        Some(value)
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        let dense = self.sparse.get(index as usize).copied().flatten()?;
        self.data.get(dense as usize)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        let dense = self.sparse.get(index as usize).copied().flatten()?;
        self.data.get_mut(dense as usize)
    }

    pub fn contains(&self, index: u32) -> bool {
        self.sparse
            .get(index as usize)
            .copied()
            .flatten()
            .is_some()
    }

    /// Iterate over `(entity_index, component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entities.iter().copied().zip(self.data.iter())
    }

    /// Mutable variant of [`ComponentStorage::iter`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.entities.iter().copied().zip(self.data.iter_mut())
    }

    /// Number of components stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a component column, as stored by the world.
pub(crate) trait AnyStorage {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Drop the component for an entity slot, if present.
    fn clear_slot(&mut self, index: u32);
    fn contains_index(&self, index: u32) -> bool;
    /// Entity slot indices holding this component, in dense order.
    fn indices(&self) -> Vec<u32>;
    fn count(&self) -> usize;
}

impl<T: 'static> AnyStorage for ComponentStorage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clear_slot(&mut self, index: u32) {
        self.remove(index);
    }

    fn contains_index(&self, index: u32) -> bool {
        self.contains(index)
    }

    fn indices(&self) -> Vec<u32> {
        self.entities.clone()
    }

    fn count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        storage.insert(5, 42);
        assert_eq!(storage.get(5), Some(&42));
        assert!(storage.contains(5));

        assert_eq!(storage.remove(5), Some(42));
        assert!(!storage.contains(5));
        assert_eq!(storage.remove(5), None);
    }

    #[test]
    fn insert_replaces_existing() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new();
        storage.insert(0, "old");
        storage.insert(0, "new");
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(0), Some(&"new"));
    }

    #[test]
    fn swap_remove_keeps_sparse_links_valid() {
        let mut storage: ComponentStorage<u8> = ComponentStorage::new();
        storage.insert(0, 10);
        storage.insert(1, 11);
        storage.insert(2, 12);

        // Removing the first dense element moves the last one into its place.
        storage.remove(0);
        assert_eq!(storage.get(1), Some(&11));
        assert_eq!(storage.get(2), Some(&12));
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn sparse_indices_far_apart() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        storage.insert(100, 999);
        assert_eq!(storage.get(100), Some(&999));
        assert!(!storage.contains(50));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn iteration_visits_only_present_components() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new();
        storage.insert(0, "zero");
        storage.insert(4, "four");
        storage.insert(9, "nine");
        storage.remove(4);

        let mut seen: Vec<(u32, &str)> = storage.iter().map(|(i, s)| (i, *s)).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![(0, "zero"), (9, "nine")]);
    }
}
