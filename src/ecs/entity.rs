//! Entity Handles and Allocation
//!
//! Entities are lightweight identifiers with no data of their own; all state
//! lives in components attached to them. Handles use the generational index
//! pattern:
//! - each slot carries a generation counter
//! - despawning bumps the generation before the slot is reused
//! - a stale handle therefore never matches a newer entity in the same slot
//!
//! That property is what lets the rest of the world API treat operations on
//! dead entities as harmless no-ops instead of errors.

use serde::{Deserialize, Serialize};

/// A unique identifier for a game entity.
///
/// The index says which slot the entity occupies; the generation says which
/// incarnation of that slot it is. Two handles with the same index but
/// different generations refer to different entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Build a handle. Only the allocator hands these out.
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index, used to address component storage.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Incarnation counter for this slot.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Allocates entity slots and tracks which are alive.
///
/// Freed slots go on a free list and are reused with a bumped generation,
/// so a handle to a despawned entity can never be mistaken for its
/// replacement.
pub struct EntityAllocator {
    /// Current generation of every slot ever allocated.
    generations: Vec<u32>,
    /// Whether the slot currently holds a live entity.
    alive: Vec<bool>,
    /// Slots available for reuse.
    free: Vec<u32>,
    /// Number of live entities.
    live_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            alive: Vec::new(),
            free: Vec::new(),
            live_count: 0,
        }
    }

    /// Allocate a fresh entity. O(1).
    pub fn allocate(&mut self) -> Entity {
        self.live_count += 1;

        if let Some(index) = self.free.pop() {
            // Generation was already bumped when the slot was freed.
            self.alive[index as usize] = true;
            Entity::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            Entity::new(index, 0)
        }
    }

    /// Free an entity's slot. Returns false if the handle was already dead.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let idx = entity.index as usize;
        self.generations[idx] += 1;
        self.alive[idx] = false;
        self.free.push(entity.index);
        self.live_count -= 1;
        true
    }

    /// Is this exact handle (index + generation) currently alive?
    pub fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.index as usize;
        idx < self.generations.len()
            && self.alive[idx]
            && self.generations[idx] == entity.generation
    }

    /// Recover the live handle occupying a slot, if any.
    ///
    /// Component storage keys on the slot index; queries use this to turn
    /// those indices back into full handles.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        let idx = index as usize;
        if idx < self.alive.len() && self.alive[idx] {
            Some(Entity::new(index, self.generations[idx]))
        } else {
            None
        }
    }

    /// Number of live entities.
    pub fn live_count(&self) -> u32 {
        self.live_count
    }

    /// Free every slot, invalidating all outstanding handles.
    pub fn clear(&mut self) {
        for (idx, alive) in self.alive.iter_mut().enumerate() {
            if *alive {
                *alive = false;
                self.generations[idx] += 1;
                self.free.push(idx as u32);
            }
        }
        self.live_count = 0;
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
