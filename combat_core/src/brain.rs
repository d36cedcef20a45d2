//! Decision sources and steering contracts
//!
//! A [`Brain`] looks at the arena and returns a [`CombatIntent`] once per
//! frame, before its entity's state machine ticks. It never mutates entities;
//! free movement goes through the [`Mover`] it is handed.

use crate::entity::Entity;
use crate::library::CombatLibrary;
use crate::machine::{CombatIntent, FirstReadySkillSelector, SkillSelector};
use crate::types::{EntityId, Position};
use glam::DVec2;

/// Steering requests from a decision source
pub trait Mover {
    fn set_desired_move(&mut self, direction: DVec2);
    fn stop(&mut self);
}

/// Stores the last steering request for the arena to apply
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Steering {
    desired: Option<DVec2>,
}

impl Steering {
    pub fn desired(&self) -> Option<DVec2> {
        self.desired
    }
}

impl Mover for Steering {
    fn set_desired_move(&mut self, direction: DVec2) {
        self.desired = Some(direction.normalize_or_zero()).filter(|d| *d != DVec2::ZERO);
    }

    fn stop(&mut self) {
        self.desired = None;
    }
}

/// Read-only view of the arena handed to decision sources
#[derive(Clone, Copy)]
pub struct ArenaView<'a> {
    entities: &'a [Entity],
    library: &'a CombatLibrary,
}

impl<'a> ArenaView<'a> {
    pub fn new(entities: &'a [Entity], library: &'a CombatLibrary) -> Self {
        ArenaView { entities, library }
    }

    pub fn library(&self) -> &'a CombatLibrary {
        self.library
    }

    pub fn entities(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.iter()
    }

    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Closest targetable entity of another kind within `max_distance` (zero = unlimited)
    pub fn nearest_enemy(&self, me: &Entity, max_distance: f64) -> Option<&'a Entity> {
        self.entities
            .iter()
            .filter(|other| other.id() != me.id() && other.kind() != me.kind())
            .filter(|other| other.is_targetable())
            .map(|other| (other, me.distance_to(other)))
            .filter(|(_, distance)| max_distance <= 0.0 || *distance <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.id().cmp(&b.0.id())))
            .map(|(other, _)| other)
    }
}

/// Per-frame decision source for one entity
pub trait Brain {
    fn decide(&mut self, me: &Entity, view: &ArenaView<'_>, mover: &mut dyn Mover) -> CombatIntent;
}

impl<B: Brain + ?Sized> Brain for Box<B> {
    fn decide(&mut self, me: &Entity, view: &ArenaView<'_>, mover: &mut dyn Mover) -> CombatIntent {
        (**self).decide(me, view, mover)
    }
}

/// Never engages
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveBrain;

impl Brain for PassiveBrain {
    fn decide(&mut self, _me: &Entity, _view: &ArenaView<'_>, mover: &mut dyn Mover) -> CombatIntent {
        mover.stop();
        CombatIntent::idle()
    }
}

/// Engages the nearest enemy and requests the first usable skill
///
/// Without a target it walks back toward its spawn point.
#[derive(Debug, Clone)]
pub struct NearestEnemyBrain {
    /// Zero means unlimited
    pub aggro_range: f64,
    pub use_skills: bool,
    /// Distance from spawn that counts as home
    pub leash_tolerance: f64,
}

impl Default for NearestEnemyBrain {
    fn default() -> Self {
        NearestEnemyBrain {
            aggro_range: 0.0,
            use_skills: true,
            leash_tolerance: 0.5,
        }
    }
}

impl NearestEnemyBrain {
    pub fn new(aggro_range: f64) -> Self {
        NearestEnemyBrain {
            aggro_range,
            ..Self::default()
        }
    }

    pub fn without_skills(mut self) -> Self {
        self.use_skills = false;
        self
    }

    fn head_home(&self, me: &Entity, mover: &mut dyn Mover) {
        let home: Position = me.spawn_position();
        if me.position().distance(home) > self.leash_tolerance {
            mover.set_desired_move(home - me.position());
        } else {
            mover.stop();
        }
    }
}

impl Brain for NearestEnemyBrain {
    fn decide(&mut self, me: &Entity, view: &ArenaView<'_>, mover: &mut dyn Mover) -> CombatIntent {
        let Some(target) = view.nearest_enemy(me, self.aggro_range) else {
            self.head_home(me, mover);
            return CombatIntent::idle();
        };
        mover.stop();

        let mut intent = CombatIntent::engage(target.id());
        if self.use_skills {
            intent.skill = FirstReadySkillSelector
                .select(me, target, None, view.library())
                .map(|skill| skill.id.clone());
        }
        intent
    }
}
