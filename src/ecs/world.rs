//! Game World
//!
//! The World owns entity identity and every component attached to an entity.
//! Components live in one type-erased column per component type, keyed by
//! `TypeId` and downcast back to `ComponentStorage<T>` for typed access.
//! Any `'static` type can be a component; there is no registration step.
//!
//! Failure model: operating on a dead or never-issued entity is a no-op
//! (`None` / `false` / empty result), never an error. Gameplay systems
//! routinely check-then-use without transactions, and a stale handle simply
//! stops matching anything once the entity is gone.

use std::any::TypeId;
use std::collections::HashMap;

use super::entity::{Entity, EntityAllocator};
use super::storage::{AnyStorage, ComponentStorage};

/// A tuple of component types usable as a query filter.
///
/// Implemented for tuples of one to four `'static` types, which covers every
/// query the gameplay layer makes.
pub trait ComponentSet {
    fn type_ids() -> Vec<TypeId>;
}

macro_rules! impl_component_set {
    ($($ty:ident),+) => {
        impl<$($ty: 'static),+> ComponentSet for ($($ty,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$ty>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);

/// Container for all entities and their components.
pub struct World {
    entities: EntityAllocator,
    columns: HashMap<TypeId, Box<dyn AnyStorage>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            columns: HashMap::new(),
        }
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    /// Create a new empty entity. O(1).
    pub fn spawn(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Destroy an entity and every component attached to it.
    ///
    /// All columns are cleared in one pass, so there is never a component
    /// left referencing a dead entity. No-op if the handle is already dead.
    pub fn despawn(&mut self, entity: Entity) {
        if !self.entities.free(entity) {
            return;
        }
        for column in self.columns.values_mut() {
            column.clear_slot(entity.index());
        }
    }

    /// Check whether a handle refers to a live entity.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> u32 {
        self.entities.live_count()
    }

    /// Remove every entity and component, keeping allocated columns around.
    pub fn clear(&mut self) {
        for column in self.columns.values_mut() {
            for index in column.indices() {
                column.clear_slot(index);
            }
        }
        self.entities.clear();
    }

    // =========================================================================
    // Component Access
    // =========================================================================

    /// Attach a component to an entity, replacing any existing component of
    /// the same type. No-op if the entity is dead.
    pub fn insert<T: 'static>(&mut self, entity: Entity, component: T) {
        if !self.entities.is_alive(entity) {
            return;
        }
        self.column_mut::<T>().insert(entity.index(), component);
    }

    /// Detach and return a component. `None` if absent or the entity is dead.
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.typed_column_mut::<T>()?.remove(entity.index())
    }

    /// Borrow an entity's component.
    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.typed_column::<T>()?.get(entity.index())
    }

    /// Mutably borrow an entity's component.
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.typed_column_mut::<T>()?.get_mut(entity.index())
    }

    /// Does the entity hold a component of this type?
    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
            && self
                .typed_column::<T>()
                .is_some_and(|c| c.contains(entity.index()))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every live entity holding **all** of the component types in `S`.
    ///
    /// The smallest column drives the scan and the rest are membership
    /// checks, so the cost tracks the narrowest component's population.
    /// Order is unspecified; callers must not rely on it.
    pub fn query<S: ComponentSet>(&self) -> Vec<Entity> {
        let ids = S::type_ids();

        let mut columns = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.columns.get(id) {
                Some(column) => columns.push(column.as_ref()),
                // A type nothing ever had matches nothing.
                None => return Vec::new(),
            }
        }

        let (driver_pos, driver) = columns
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.count())
            .expect("component sets are non-empty");

        let mut matches = Vec::new();
        'candidates: for index in driver.indices() {
            for (pos, column) in columns.iter().enumerate() {
                if pos != driver_pos && !column.contains_index(index) {
                    continue 'candidates;
                }
            }
            if let Some(entity) = self.entities.entity_at(index) {
                matches.push(entity);
            }
        }
        matches
    }

    // =========================================================================
    // Column plumbing
    // =========================================================================

    fn typed_column<T: 'static>(&self) -> Option<&ComponentStorage<T>> {
        self.columns
            .get(&TypeId::of::<T>())
            .and_then(|c| c.as_any().downcast_ref())
    }

    fn typed_column_mut<T: 'static>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.columns
            .get_mut(&TypeId::of::<T>())
            .and_then(|c| c.as_any_mut().downcast_mut())
    }

    /// Get or lazily create the column for `T`.
    fn column_mut<T: 'static>(&mut self) -> &mut ComponentStorage<T> {
        self.columns
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut()
            .expect("column type matches its TypeId key")
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Pos(f32, f32);
    struct Vel(f32, f32);
    struct Marker;

    #[test]
    fn spawn_returns_distinct_entities() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        assert_ne!(a, b);
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn insert_then_has_then_remove() {
        let mut world = World::new();
        let e = world.spawn();

        world.insert(e, Pos(1.0, 2.0));
        assert!(world.has::<Pos>(e));
        assert_eq!(world.get::<Pos>(e), Some(&Pos(1.0, 2.0)));

        world.remove::<Pos>(e);
        assert!(!world.has::<Pos>(e));
        assert_eq!(world.get::<Pos>(e), None);
    }

    #[test]
    fn insert_overwrites_same_type() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Pos(0.0, 0.0));
        world.insert(e, Pos(5.0, 5.0));
        assert_eq!(world.get::<Pos>(e), Some(&Pos(5.0, 5.0)));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Pos(1.0, 1.0));
        world.get_mut::<Pos>(e).unwrap().0 = 9.0;
        assert_eq!(world.get::<Pos>(e), Some(&Pos(9.0, 1.0)));
    }

    #[test]
    fn query_without_component_excludes_entity() {
        let mut world = World::new();
        let with = world.spawn();
        let without = world.spawn();
        world.insert(with, Marker);

        let found = world.query::<(Marker,)>();
        assert!(found.contains(&with));
        assert!(!found.contains(&without));
    }

    #[test]
    fn multi_type_query_intersects() {
        let mut world = World::new();
        let both = world.spawn();
        let only_pos = world.spawn();
        world.insert(both, Pos(0.0, 0.0));
        world.insert(both, Vel(1.0, 0.0));
        world.insert(only_pos, Pos(3.0, 3.0));

        let found = world.query::<(Pos, Vel)>();
        assert_eq!(found, vec![both]);
    }

    #[test]
    fn query_has_no_duplicates() {
        let mut world = World::new();
        for _ in 0..8 {
            let e = world.spawn();
            world.insert(e, Pos(0.0, 0.0));
            world.insert(e, Vel(0.0, 0.0));
        }
        let found = world.query::<(Pos, Vel)>();
        assert_eq!(found.len(), 8);
        let mut dedup = found.clone();
        dedup.sort_by_key(|e| e.index());
        dedup.dedup();
        assert_eq!(dedup.len(), 8);
    }

    #[test]
    fn despawn_removes_from_every_query() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Pos(0.0, 0.0));
        world.insert(e, Vel(0.0, 0.0));
        world.insert(e, Marker);

        world.despawn(e);

        assert!(world.query::<(Pos,)>().is_empty());
        assert!(world.query::<(Vel,)>().is_empty());
        assert!(world.query::<(Marker,)>().is_empty());
        assert!(world.query::<(Pos, Vel)>().is_empty());
        assert!(world.query::<(Pos, Vel, Marker)>().is_empty());
    }

    #[test]
    fn stale_handle_operations_are_noops() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Pos(0.0, 0.0));
        world.despawn(e);

        // Every operation degrades rather than panicking.
        world.despawn(e);
        world.insert(e, Pos(1.0, 1.0));
        assert_eq!(world.get::<Pos>(e), None);
        assert_eq!(world.get_mut::<Pos>(e), None);
        assert_eq!(world.remove::<Pos>(e), None);
        assert!(!world.has::<Pos>(e));
    }

    #[test]
    fn recycled_slot_does_not_leak_old_components() {
        let mut world = World::new();
        let old = world.spawn();
        world.insert(old, Pos(7.0, 7.0));
        world.despawn(old);

        // New entity reuses the slot but must start empty.
        let new = world.spawn();
        assert_eq!(new.index(), old.index());
        assert!(!world.has::<Pos>(new));
        assert!(world.query::<(Pos,)>().is_empty());
    }

    #[test]
    fn clear_empties_the_world() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Pos(0.0, 0.0));
        world.clear();
        assert_eq!(world.entity_count(), 0);
        assert!(!world.is_alive(e));
        assert!(world.query::<(Pos,)>().is_empty());
    }
}
