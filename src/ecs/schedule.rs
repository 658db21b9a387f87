//! System Scheduling
//!
//! Systems are behavior; components are data. The schedule runs every
//! registered system exactly once per tick, in registration order, on a
//! single thread. There is no implicit parallelism and no suspension: a
//! system runs to completion with exclusive access to the world.

use super::world::World;

/// A unit of game logic run once per tick.
pub trait System {
    fn update(&mut self, world: &mut World, dt: f32);
}

/// Runs systems in a fixed order each tick.
///
/// Lives outside the [`World`] so systems can take `&mut World` without
/// aliasing the container that owns them.
pub struct Schedule {
    systems: Vec<Box<dyn System>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Append a system. Order of registration is order of execution.
    pub fn add_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    /// Advance every system by one tick.
    pub fn run(&mut self, world: &mut World, dt: f32) {
        for system in &mut self.systems {
            system.update(world, dt);
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tally(u32);
    struct CountingSystem;

    impl System for CountingSystem {
        fn update(&mut self, world: &mut World, _dt: f32) {
            let entities = world.query::<(Tally,)>();
            for e in entities {
                if let Some(t) = world.get_mut::<Tally>(e) {
                    t.0 += 1;
                }
            }
        }
    }

    /// Appends its tag so tests can observe execution order.
    struct TagSystem(&'static str);
    struct Trace(Vec<&'static str>);

    impl System for TagSystem {
        fn update(&mut self, world: &mut World, _dt: f32) {
            for e in world.query::<(Trace,)>() {
                if let Some(trace) = world.get_mut::<Trace>(e) {
                    trace.0.push(self.0);
                }
            }
        }
    }

    #[test]
    fn systems_run_each_tick() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Tally(0));

        let mut schedule = Schedule::new();
        schedule.add_system(CountingSystem);

        schedule.run(&mut world, 1.0 / 60.0);
        schedule.run(&mut world, 1.0 / 60.0);
        assert_eq!(world.get::<Tally>(e).unwrap().0, 2);
    }

    #[test]
    fn systems_run_in_registration_order() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Trace(Vec::new()));

        let mut schedule = Schedule::new();
        schedule.add_system(TagSystem("first"));
        schedule.add_system(TagSystem("second"));
        schedule.add_system(TagSystem("third"));
        schedule.run(&mut world, 0.0);

        assert_eq!(world.get::<Trace>(e).unwrap().0, vec!["first", "second", "third"]);
    }
}
