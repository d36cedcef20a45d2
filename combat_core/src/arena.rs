//! Arena - Composition layer for the single-threaded combat loop
//!
//! Each frame:
//!
//! 1. The [`SimulationClock`] converts the frame delta into fixed steps; every
//!    active entity advances status expiry, cooldowns and regeneration.
//! 2. Every active entity's [`Brain`] produces an intent.
//! 3. Every active entity's state machine ticks against that intent.
//! 4. Death events are published on the [`DeathBus`] in the order they occurred.
//!
//! Entities join and leave through [`Arena::spawn`] / [`Arena::despawn`].

use crate::brain::{ArenaView, Brain, Steering};
use crate::clock::SimulationClock;
use crate::entity::{DeathBus, DeathEvent, DeathListener, Entity, EntitySpec, ListenerId};
use crate::library::CombatLibrary;
use crate::machine::{
    CombatIntent, CombatState, CombatStateMachine, MachineConfig, Movement, RespawnService,
    StraightLineMovement, TickContext, TickReport,
};
use crate::types::{EntityId, Position, SimTime};
use tracing::{debug, info, trace, warn};

/// Per-entity controller state kept alongside the entity
struct Controller {
    machine: CombatStateMachine,
    brain: Box<dyn Brain>,
    steering: Steering,
    intent: CombatIntent,
}

/// What one call to [`Arena::advance`] did
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub sim_steps: u32,
    pub time: SimTime,
    pub expired_effects: Vec<(EntityId, String)>,
    pub combat: TickReport,
}

pub struct Arena {
    library: CombatLibrary,
    entities: Vec<Entity>,
    controllers: Vec<Controller>,
    clock: SimulationClock,
    movement: Box<dyn Movement>,
    respawn: Option<Box<dyn RespawnService>>,
    deaths: DeathBus,
    next_id: u32,
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("entities", &self.entities.len())
            .field("time", &self.clock.time())
            .field("death_listeners", &self.deaths.len())
            .finish_non_exhaustive()
    }
}

impl Arena {
    pub fn new(library: CombatLibrary) -> Self {
        let clock = SimulationClock::from_constants(&library.constants.simulation);
        Arena {
            library,
            entities: Vec::new(),
            controllers: Vec::new(),
            clock,
            movement: Box::new(StraightLineMovement),
            respawn: None,
            deaths: DeathBus::new(),
            next_id: 1,
        }
    }

    pub fn with_respawn_service(mut self, service: impl RespawnService + 'static) -> Self {
        self.respawn = Some(Box::new(service));
        self
    }

    pub fn with_movement(mut self, movement: impl Movement + 'static) -> Self {
        self.movement = Box::new(movement);
        self
    }

    pub fn library(&self) -> &CombatLibrary {
        &self.library
    }

    pub fn time(&self) -> SimTime {
        self.clock.time()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    // === Membership ===

    /// Add an entity with the default machine (respawns when a service allows it)
    pub fn spawn(&mut self, spec: EntitySpec, position: Position, brain: impl Brain + 'static) -> EntityId {
        let config = MachineConfig::from_constants(&self.library.constants.lifecycle, true);
        self.spawn_with_machine(spec, position, brain, CombatStateMachine::new(config))
    }

    pub fn spawn_with_machine(
        &mut self,
        spec: EntitySpec,
        position: Position,
        brain: impl Brain + 'static,
        machine: CombatStateMachine,
    ) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        for skill in &spec.skills {
            if self.library.skills.get(skill).is_none() {
                debug!(entity = %id, skill = %skill, "entity knows an unregistered skill");
            }
        }
        let entity = Entity::new(id, spec, position, &self.library.constants);
        info!(entity = %id, name = %entity.name, kind = ?entity.kind(), hp = entity.max_hp(), "entity spawned");

        self.entities.push(entity);
        self.controllers.push(Controller {
            machine,
            brain: Box::new(brain),
            steering: Steering::default(),
            intent: CombatIntent::idle(),
        });
        id
    }

    /// Remove an entity; it stops ticking immediately
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        self.controllers.remove(index);
        let entity = self.entities.remove(index);
        info!(entity = %id, "entity despawned");
        Some(entity)
    }

    pub fn subscribe_deaths(&mut self, listener: impl DeathListener + 'static) -> ListenerId {
        self.deaths.subscribe(Box::new(listener))
    }

    pub fn unsubscribe_deaths(&mut self, id: ListenerId) -> bool {
        self.deaths.unsubscribe(id)
    }

    // === Queries ===

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id() == id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Direct access for scripted events (applying effects, equipment changes)
    ///
    /// Deaths caused through this handle never reach the death bus; scripted
    /// damage goes through [`Arena::damage`] and [`Arena::kill`].
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Scripted damage; a resulting death is published like any other
    pub fn damage(&mut self, id: EntityId, amount: i64, source: Option<EntityId>) -> Option<DeathEvent> {
        let now = self.clock.time();
        let event = self.entity_mut(id)?.take_damage(amount, source, now)?;
        self.publish_death(&event);
        Some(event)
    }

    /// Scripted kill through the same death path as damage
    pub fn kill(&mut self, id: EntityId, by: Option<EntityId>) -> Option<DeathEvent> {
        let now = self.clock.time();
        let event = self.entity_mut(id)?.kill(by, now)?;
        self.publish_death(&event);
        Some(event)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn state_of(&self, id: EntityId) -> Option<CombatState> {
        self.index_of(id).map(|i| self.controllers[i].machine.state())
    }

    pub fn machine(&self, id: EntityId) -> Option<&CombatStateMachine> {
        self.index_of(id).map(|i| &self.controllers[i].machine)
    }

    pub fn intent_of(&self, id: EntityId) -> Option<&CombatIntent> {
        self.index_of(id).map(|i| &self.controllers[i].intent)
    }

    pub fn active_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_active()).count()
    }

    pub fn view(&self) -> ArenaView<'_> {
        ArenaView::new(&self.entities, &self.library)
    }

    // === Frame ===

    /// Run one frame of `frame_dt` seconds
    ///
    /// A non-finite or negative delta is ignored and the frame does nothing.
    pub fn advance(&mut self, frame_dt: f64) -> FrameReport {
        let mut report = FrameReport {
            time: self.clock.time(),
            ..FrameReport::default()
        };
        if !(frame_dt.is_finite() && frame_dt >= 0.0) {
            warn!(frame_dt, "invalid frame delta, frame skipped");
            return report;
        }

        report.sim_steps = self.clock.advance(frame_dt);
        let step = self.clock.step();
        for _ in 0..report.sim_steps {
            for entity in self.entities.iter_mut().filter(|e| e.is_active()) {
                for effect in entity.tick_simulation(step) {
                    debug!(entity = %entity.id(), effect = %effect, "effect expired");
                    report.expired_effects.push((entity.id(), effect));
                }
            }
        }
        report.time = self.clock.time();

        self.decide();
        for index in 0..self.entities.len() {
            let ticked = self.tick_machine(index, frame_dt, report.time);
            self.apply_steering(index, frame_dt);
            report.combat.merge(ticked);
        }

        for event in &report.combat.deaths {
            self.publish_death(event);
        }
        trace!(time = report.time, steps = report.sim_steps, "frame advanced");
        report
    }

    fn decide(&mut self) {
        let view = ArenaView::new(&self.entities, &self.library);
        for (entity, controller) in self.entities.iter().zip(self.controllers.iter_mut()) {
            controller.intent = if entity.is_active() && entity.is_alive() {
                controller
                    .brain
                    .decide(entity, &view, &mut controller.steering)
            } else {
                CombatIntent::idle()
            };
        }
    }

    fn tick_machine(&mut self, index: usize, dt: f64, now: SimTime) -> TickReport {
        if !self.entities[index].is_active() {
            return TickReport::default();
        }

        let controller = &mut self.controllers[index];
        let target_index = controller
            .intent
            .target
            .and_then(|id| self.entities.iter().position(|e| e.id() == id))
            .filter(|&t| t != index);

        let (me, target) = match target_index {
            Some(t) => {
                let (me, target) = pair_mut(&mut self.entities, index, t);
                (me, Some(target))
            }
            None => (&mut self.entities[index], None),
        };

        let mut ctx = TickContext::new(
            &controller.intent,
            &self.library,
            self.movement.as_mut(),
            dt,
            now,
        );
        if let Some(target) = target {
            ctx = ctx.with_target(target);
        }
        if let Some(respawn) = self.respawn.as_deref() {
            ctx = ctx.with_respawn(respawn);
        }
        controller.machine.tick(me, ctx)
    }

    /// Free movement requested by the brain; only honored while Idle
    fn apply_steering(&mut self, index: usize, dt: f64) {
        let controller = &self.controllers[index];
        let Some(direction) = controller.steering.desired() else {
            return;
        };
        let entity = &mut self.entities[index];
        if controller.machine.state() != CombatState::Idle
            || !entity.is_targetable()
            || !entity.can_move()
        {
            return;
        }
        let next = entity.position() + direction * entity.walk_speed() * dt;
        entity.set_position(next);
    }

    fn publish_death(&mut self, event: &DeathEvent) {
        debug!(entity = %event.entity, killer = ?event.killer, "publishing death");
        self.deaths.publish(event);
    }
}

/// Two distinct mutable entries of one slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::{NearestEnemyBrain, PassiveBrain};
    use crate::entity::DeathLog;
    use crate::machine::AlwaysRespawn;
    use crate::stat_table::GrowthProfile;
    use crate::types::{ElementFamily, EntityKind};

    fn knight() -> EntitySpec {
        EntitySpec::new(
            "knight",
            EntityKind::Player,
            GrowthProfile::new(10)
                .with_weight(ElementFamily::Fire, 3)
                .with_weight(ElementFamily::Earth, 2),
        )
    }

    fn slime() -> EntitySpec {
        EntitySpec::new(
            "slime",
            EntityKind::Monster,
            GrowthProfile::new(1).with_weight(ElementFamily::Earth, 1),
        )
    }

    #[test]
    fn test_pair_mut() {
        let mut values = [1, 2, 3];
        let (a, b) = pair_mut(&mut values, 2, 0);
        std::mem::swap(a, b);
        assert_eq!(values, [3, 2, 1]);
    }

    #[test]
    fn test_spawn_and_despawn() {
        let mut arena = Arena::new(CombatLibrary::defaults());
        let a = arena.spawn(knight(), Position::ZERO, PassiveBrain);
        let b = arena.spawn(slime(), Position::new(3.0, 0.0), PassiveBrain);
        assert_ne!(a, b);
        assert_eq!(arena.entities().len(), 2);
        assert_eq!(arena.state_of(a), Some(CombatState::Idle));

        let removed = arena.despawn(a).unwrap();
        assert_eq!(removed.id(), a);
        assert!(arena.entity(a).is_none());
        assert!(arena.despawn(a).is_none());
        arena.advance(0.1);
    }

    #[test]
    fn test_knight_kills_slime_and_death_is_published_once() {
        let mut arena = Arena::new(CombatLibrary::defaults());
        let log = DeathLog::new();
        arena.subscribe_deaths(log.clone());

        let knight = arena.spawn(knight(), Position::ZERO, NearestEnemyBrain::default());
        let slime = arena.spawn(slime(), Position::new(4.0, 0.0), PassiveBrain);

        for _ in 0..600 {
            arena.advance(1.0 / 60.0);
        }

        assert!(!arena.entity(slime).unwrap().is_active());
        let events = log.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity, slime);
        assert_eq!(events[0].killer, Some(knight));
        assert_eq!(arena.state_of(knight), Some(CombatState::Idle));
    }

    #[test]
    fn test_respawn_service_brings_entity_back() {
        let mut arena = Arena::new(CombatLibrary::defaults()).with_respawn_service(AlwaysRespawn);
        let slime = arena.spawn(slime(), Position::new(1.0, 0.0), PassiveBrain);
        assert!(arena.kill(slime, None).is_some());

        arena.advance(0.1);
        assert_eq!(arena.state_of(slime), Some(CombatState::Dead));

        for _ in 0..40 {
            arena.advance(0.1);
        }
        let entity = arena.entity(slime).unwrap();
        assert!(entity.is_alive());
        assert!(entity.is_active());
        assert_eq!(arena.state_of(slime), Some(CombatState::Idle));
    }

    #[test]
    fn test_simulation_steps_expire_effects() {
        let mut arena = Arena::new(CombatLibrary::defaults());
        let id = arena.spawn(knight(), Position::ZERO, PassiveBrain);
        let effects = arena.library().effects.clone();
        arena.entity_mut(id).unwrap().apply_effect(&effects, "stun");

        arena.advance(0.1);
        assert_eq!(arena.state_of(id), Some(CombatState::Stunned));

        let mut expired = Vec::new();
        for _ in 0..20 {
            expired.extend(arena.advance(0.1).expired_effects);
        }
        assert_eq!(expired, vec![(id, "stun".to_string())]);
        assert_eq!(arena.state_of(id), Some(CombatState::Idle));
    }

    #[test]
    fn test_invalid_frame_delta_is_ignored() {
        let mut arena = Arena::new(CombatLibrary::defaults());
        let knight = arena.spawn(knight(), Position::ZERO, NearestEnemyBrain::default().without_skills());
        let slime = arena.spawn(slime(), Position::new(1.0, 0.0), PassiveBrain);
        arena.advance(1.0 / 60.0);
        assert_eq!(arena.state_of(knight), Some(CombatState::AttackLoop));

        let hp = arena.entity(slime).unwrap().current_hp();
        let time = arena.time();
        for dt in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -1.0] {
            for _ in 0..10 {
                let report = arena.advance(dt);
                assert_eq!(report.sim_steps, 0);
                assert!(report.combat.attacks.is_empty());
                assert!(report.combat.transitions.is_empty());
            }
        }
        assert_eq!(arena.entity(slime).unwrap().current_hp(), hp);
        assert_eq!(arena.time(), time);
        assert_eq!(arena.state_of(knight), Some(CombatState::AttackLoop));
    }

    #[test]
    fn test_invalid_frame_delta_does_not_move_chaser() {
        let mut arena = Arena::new(CombatLibrary::defaults());
        let knight = arena.spawn(knight(), Position::ZERO, NearestEnemyBrain::default().without_skills());
        arena.spawn(slime(), Position::new(100.0, 0.0), PassiveBrain);
        arena.advance(1.0 / 60.0);
        assert_eq!(arena.state_of(knight), Some(CombatState::Chase));

        let before = arena.entity(knight).unwrap().position();
        arena.advance(f64::NAN);
        arena.advance(-0.5);
        assert_eq!(arena.entity(knight).unwrap().position(), before);

        arena.advance(1.0 / 60.0);
        let moved = arena.entity(knight).unwrap().position().x - before.x;
        assert!(moved > 0.0 && moved < 1.0);
    }

    #[test]
    fn test_scripted_kill_is_published_once() {
        let mut arena = Arena::new(CombatLibrary::defaults()).with_respawn_service(AlwaysRespawn);
        let log = DeathLog::new();
        arena.subscribe_deaths(log.clone());
        let slime = arena.spawn(slime(), Position::ZERO, PassiveBrain);

        let event = arena.kill(slime, Some(EntityId(7))).unwrap();
        assert_eq!(event.entity, slime);
        assert_eq!(event.killer, Some(EntityId(7)));
        assert!(arena.kill(slime, None).is_none());
        assert!(arena.damage(slime, 10, None).is_none());
        assert_eq!(log.len(), 1);

        for _ in 0..200 {
            arena.advance(0.1);
        }
        assert!(arena.entity(slime).unwrap().is_alive());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_scripted_damage_publishes_lethal_hit() {
        let mut arena = Arena::new(CombatLibrary::defaults());
        let log = DeathLog::new();
        arena.subscribe_deaths(log.clone());
        let slime = arena.spawn(slime(), Position::ZERO, PassiveBrain);
        let hp = arena.entity(slime).unwrap().max_hp();

        assert!(arena.damage(slime, hp - 1, None).is_none());
        assert!(log.is_empty());
        let event = arena.damage(slime, 5, Some(EntityId(3))).unwrap();
        assert_eq!(event.killer, Some(EntityId(3)));
        assert_eq!(log.events(), vec![event]);
        assert!(arena.damage(EntityId(99), 5, None).is_none());
    }
}
