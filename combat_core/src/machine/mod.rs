//! CombatStateMachine - Intent, range and status driven behavior
//!
//! Evaluated once per decision tick, in this order:
//!
//! 1. Liveness: a dead entity is forced into `Dead`.
//! 2. Forced state: an active effect that forces a state wins over everything else.
//! 3. Intent: the decision source's [`CombatIntent`] plus distance and skill
//!    readiness drive the normal transitions.
//!
//! Timed waits (cast time, death grace) live inside the state's variant, so
//! leaving the state drops the timer with it.

mod intent;
mod movement;
mod respawn;
mod strategy;

pub use intent::CombatIntent;
pub use movement::{Movement, StraightLineMovement};
pub use respawn::{AlwaysRespawn, RespawnKind, RespawnService};
pub use strategy::{
    skill_gate, AttackStrategy, FirstReadySkillSelector, InstantDamageExecutor, MeleeAttack,
    RequestedSkillSelector, SkillExecutor, SkillSelector, Strike,
};

use crate::combat::AttackReport;
use crate::config::LifecycleConstants;
use crate::entity::{DeathEvent, Entity};
use crate::library::CombatLibrary;
use crate::skill::SkillDefinition;
use crate::status::ForcedState;
use crate::types::{DamageType, EntityId, SimTime, SkillId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Observable state of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatState {
    Idle,
    Chase,
    AttackLoop,
    CastSkill,
    Stunned,
    Dead,
    Respawn,
}

impl From<ForcedState> for CombatState {
    fn from(state: ForcedState) -> Self {
        match state {
            ForcedState::Stunned => CombatState::Stunned,
            ForcedState::Idle => CombatState::Idle,
        }
    }
}

impl fmt::Display for CombatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CombatState::Idle => "Idle",
            CombatState::Chase => "Chase",
            CombatState::AttackLoop => "AttackLoop",
            CombatState::CastSkill => "CastSkill",
            CombatState::Stunned => "Stunned",
            CombatState::Dead => "Dead",
            CombatState::Respawn => "Respawn",
        };
        f.write_str(name)
    }
}

/// Per-entity life-cycle settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Whether Dead may route to Respawn (still subject to the respawn service)
    #[serde(default = "default_respawn_on_death")]
    pub respawn_on_death: bool,
    #[serde(default = "default_death_grace_delay")]
    pub death_grace_delay: f64,
}

fn default_respawn_on_death() -> bool {
    true
}

fn default_death_grace_delay() -> f64 {
    3.0
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            respawn_on_death: default_respawn_on_death(),
            death_grace_delay: default_death_grace_delay(),
        }
    }
}

impl MachineConfig {
    pub fn from_constants(lifecycle: &LifecycleConstants, respawn_on_death: bool) -> Self {
        MachineConfig {
            respawn_on_death,
            death_grace_delay: lifecycle.death_grace_delay.max(0.0),
        }
    }
}

/// A recorded state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub entity: EntityId,
    pub from: CombatState,
    pub to: CombatState,
}

/// Everything one machine tick produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub transitions: Vec<Transition>,
    pub attacks: Vec<AttackReport>,
    pub deaths: Vec<DeathEvent>,
    /// Skill whose cast was abandoned this tick
    pub cancelled_cast: Option<SkillId>,
    /// The entity was permanently removed from combat this tick
    pub deactivated: bool,
}

impl TickReport {
    fn push_strike(&mut self, strike: Strike) {
        self.attacks.push(strike.report);
        self.deaths.extend(strike.death);
    }

    /// Append another report's contents
    pub fn merge(&mut self, other: TickReport) {
        self.transitions.extend(other.transitions);
        self.attacks.extend(other.attacks);
        self.deaths.extend(other.deaths);
        if other.cancelled_cast.is_some() {
            self.cancelled_cast = other.cancelled_cast;
        }
        self.deactivated |= other.deactivated;
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
            && self.attacks.is_empty()
            && self.deaths.is_empty()
            && self.cancelled_cast.is_none()
            && !self.deactivated
    }
}

/// Collaborators borrowed for one tick
pub struct TickContext<'a> {
    /// Entity named by `intent.target`, if it exists
    pub target: Option<&'a mut Entity>,
    pub intent: &'a CombatIntent,
    pub library: &'a CombatLibrary,
    pub movement: &'a mut dyn Movement,
    pub respawn: Option<&'a dyn RespawnService>,
    pub dt: f64,
    pub now: SimTime,
}

impl<'a> TickContext<'a> {
    pub fn new(
        intent: &'a CombatIntent,
        library: &'a CombatLibrary,
        movement: &'a mut dyn Movement,
        dt: f64,
        now: SimTime,
    ) -> Self {
        TickContext {
            target: None,
            intent,
            library,
            movement,
            respawn: None,
            dt,
            now,
        }
    }

    pub fn with_target(mut self, target: &'a mut Entity) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_respawn(mut self, respawn: &'a dyn RespawnService) -> Self {
        self.respawn = Some(respawn);
        self
    }

    /// The target if the intent engages it and it can still be fought
    fn engaged_target(&self, me: &Entity) -> Option<&Entity> {
        if !self.intent.engage {
            return None;
        }
        self.target.as_deref().filter(|target| {
            self.intent.target == Some(target.id())
                && target.id() != me.id()
                && target.is_targetable()
        })
    }
}

enum Phase {
    Idle,
    Chase,
    AttackLoop {
        timer: f64,
    },
    CastSkill {
        skill: Arc<SkillDefinition>,
        remaining: f64,
    },
    Stunned,
    Dead {
        grace: f64,
    },
    Respawn,
}

impl Phase {
    fn state(&self) -> CombatState {
        match self {
            Phase::Idle => CombatState::Idle,
            Phase::Chase => CombatState::Chase,
            Phase::AttackLoop { .. } => CombatState::AttackLoop,
            Phase::CastSkill { .. } => CombatState::CastSkill,
            Phase::Stunned => CombatState::Stunned,
            Phase::Dead { .. } => CombatState::Dead,
            Phase::Respawn => CombatState::Respawn,
        }
    }
}

/// Combat state machine for one entity
pub struct CombatStateMachine {
    phase: Phase,
    config: MachineConfig,
    attack: Box<dyn AttackStrategy>,
    selector: Box<dyn SkillSelector>,
    executor: Box<dyn SkillExecutor>,
}

impl fmt::Debug for CombatStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatStateMachine")
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for CombatStateMachine {
    fn default() -> Self {
        CombatStateMachine::new(MachineConfig::default())
    }
}

impl CombatStateMachine {
    /// Start in Idle with melee attacks, requested-skill selection and instant execution
    pub fn new(config: MachineConfig) -> Self {
        CombatStateMachine {
            phase: Phase::Idle,
            config,
            attack: Box::new(MeleeAttack),
            selector: Box::new(RequestedSkillSelector),
            executor: Box::new(InstantDamageExecutor),
        }
    }

    pub fn with_attack(mut self, attack: impl AttackStrategy + 'static) -> Self {
        self.attack = Box::new(attack);
        self
    }

    pub fn with_selector(mut self, selector: impl SkillSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn with_executor(mut self, executor: impl SkillExecutor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn state(&self) -> CombatState {
        self.phase.state()
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Skill being cast and its remaining cast time
    pub fn casting(&self) -> Option<(&SkillId, f64)> {
        match &self.phase {
            Phase::CastSkill { skill, remaining } => Some((&skill.id, *remaining)),
            _ => None,
        }
    }

    /// Time until the next basic attack, while in AttackLoop
    pub fn attack_timer(&self) -> Option<f64> {
        match self.phase {
            Phase::AttackLoop { timer } => Some(timer),
            _ => None,
        }
    }

    /// Remaining death grace, while Dead
    pub fn death_grace(&self) -> Option<f64> {
        match self.phase {
            Phase::Dead { grace } => Some(grace),
            _ => None,
        }
    }

    /// Drop back to Idle without reporting a transition
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Advance the machine by one decision tick
    pub fn tick(&mut self, me: &mut Entity, mut ctx: TickContext<'_>) -> TickReport {
        let mut report = TickReport::default();
        if !me.is_active() {
            return report;
        }

        if !me.is_alive() && !matches!(self.phase, Phase::Dead { .. }) {
            let grace = self.config.death_grace_delay.max(0.0);
            self.transition(me, Phase::Dead { grace }, &mut ctx, &mut report);
            return report;
        }
        if matches!(self.phase, Phase::Dead { .. }) {
            if me.is_alive() {
                // revived from outside the machine
                self.transition(me, Phase::Idle, &mut ctx, &mut report);
            } else {
                self.update_dead(me, &mut ctx, &mut report);
            }
            return report;
        }

        if let Some(forced) = me.forced_state() {
            let forced = CombatState::from(forced);
            if self.state() != forced {
                let next = match forced {
                    CombatState::Stunned => Phase::Stunned,
                    _ => Phase::Idle,
                };
                self.transition(me, next, &mut ctx, &mut report);
            }
            return report;
        }

        let was_attacking = matches!(self.phase, Phase::AttackLoop { .. });
        match self.phase {
            Phase::Idle => self.update_idle(me, &mut ctx, &mut report),
            Phase::Chase => self.update_chase(me, &mut ctx, &mut report),
            Phase::AttackLoop { .. } => {
                let elapsed = ctx.dt;
                self.update_attack_loop(me, &mut ctx, &mut report, elapsed)
            }
            Phase::CastSkill { .. } => self.update_cast(me, &mut ctx, &mut report),
            Phase::Stunned | Phase::Respawn => {
                self.transition(me, Phase::Idle, &mut ctx, &mut report)
            }
            Phase::Dead { .. } => {}
        }

        // entering AttackLoop swings at once, unless a skill takes priority
        if !was_attacking && matches!(self.phase, Phase::AttackLoop { .. }) {
            self.update_attack_loop(me, &mut ctx, &mut report, 0.0);
        }
        report
    }

    /// Idle, Chase or AttackLoop, whichever the intent and range call for
    fn engagement(me: &Entity, ctx: &TickContext<'_>) -> Phase {
        match ctx.engaged_target(me) {
            Some(target) if me.in_attack_range(target) => Phase::AttackLoop { timer: 0.0 },
            Some(_) => Phase::Chase,
            None => Phase::Idle,
        }
    }

    /// A skill the selector wants cast at the engaged target
    fn select_skill(&self, me: &Entity, ctx: &TickContext<'_>) -> Option<Arc<SkillDefinition>> {
        let target = ctx.engaged_target(me)?;
        self.selector
            .select(me, target, ctx.intent.skill.as_ref(), ctx.library)
    }

    fn begin_cast(
        &mut self,
        me: &mut Entity,
        skill: Arc<SkillDefinition>,
        ctx: &mut TickContext<'_>,
        report: &mut TickReport,
    ) {
        let remaining = skill.cast_time.max(0.0);
        debug!(entity = %me.id(), skill = %skill.id, cast_time = remaining, "cast started");
        self.transition(me, Phase::CastSkill { skill, remaining }, ctx, report);
    }

    fn update_idle(&mut self, me: &mut Entity, ctx: &mut TickContext<'_>, report: &mut TickReport) {
        let next = Self::engagement(me, ctx);
        if !matches!(next, Phase::Idle) {
            self.transition(me, next, ctx, report);
        }
    }

    fn update_chase(&mut self, me: &mut Entity, ctx: &mut TickContext<'_>, report: &mut TickReport) {
        let destination = match ctx.engaged_target(me) {
            Some(target) => target.position(),
            None => return self.transition(me, Phase::Idle, ctx, report),
        };
        if let Some(skill) = self.select_skill(me, ctx) {
            return self.begin_cast(me, skill, ctx, report);
        }
        if matches!(Self::engagement(me, ctx), Phase::AttackLoop { .. }) {
            return self.transition(me, Phase::AttackLoop { timer: 0.0 }, ctx, report);
        }

        if me.can_move() {
            let (stop_distance, speed) = (me.attack_range(), me.walk_speed());
            ctx.movement
                .approach(me, destination, stop_distance, speed, ctx.dt);
        } else {
            ctx.movement.stop(me);
        }
    }

    fn update_attack_loop(
        &mut self,
        me: &mut Entity,
        ctx: &mut TickContext<'_>,
        report: &mut TickReport,
        elapsed: f64,
    ) {
        match Self::engagement(me, ctx) {
            Phase::AttackLoop { .. } => {}
            other => return self.transition(me, other, ctx, report),
        }
        if let Some(skill) = self.select_skill(me, ctx) {
            return self.begin_cast(me, skill, ctx, report);
        }

        let Phase::AttackLoop { timer } = &mut self.phase else {
            return;
        };
        *timer -= elapsed;
        if *timer > 0.0 {
            return;
        }
        if !me.can_basic_attack() || !me.can_use_damage_type(DamageType::Physical) {
            // stay primed until the restriction lifts
            *timer = 0.0;
            return;
        }
        *timer = me.attack_interval();

        if let Some(target) = ctx.target.as_deref_mut() {
            let strike = self.attack.basic_attack(me, target, ctx.now);
            report.push_strike(strike);
        }
    }

    fn update_cast(&mut self, me: &mut Entity, ctx: &mut TickContext<'_>, report: &mut TickReport) {
        if ctx.engaged_target(me).is_none() || !me.can_cast_skill() {
            return self.transition(me, Phase::Idle, ctx, report);
        }

        let Phase::CastSkill { skill, remaining } = &mut self.phase else {
            return;
        };
        *remaining -= ctx.dt;
        if *remaining > 0.0 {
            return;
        }
        let skill = Arc::clone(skill);

        if let Some(target) = ctx.target.as_deref_mut() {
            let strike = self
                .executor
                .execute(me, target, &skill, ctx.library, ctx.now);
            report.push_strike(strike);
        }

        self.phase = Self::engagement(me, ctx);
        self.entered(me, CombatState::CastSkill, ctx, report);
    }

    fn update_dead(&mut self, me: &mut Entity, ctx: &mut TickContext<'_>, report: &mut TickReport) {
        let Phase::Dead { grace } = &mut self.phase else {
            return;
        };
        *grace -= ctx.dt;
        if *grace > 0.0 {
            return;
        }

        let permitted = self.config.respawn_on_death
            && ctx.respawn.map_or(false, |service| service.can_respawn(me));
        if permitted {
            self.transition(me, Phase::Respawn, ctx, report);
        } else {
            me.deactivate();
            report.deactivated = true;
        }
    }

    fn transition(
        &mut self,
        me: &mut Entity,
        next: Phase,
        ctx: &mut TickContext<'_>,
        report: &mut TickReport,
    ) {
        let previous = std::mem::replace(&mut self.phase, next);
        if let Phase::CastSkill { skill, remaining } = &previous {
            debug!(entity = %me.id(), skill = %skill.id, remaining, "cast cancelled");
            report.cancelled_cast = Some(skill.id.clone());
        }
        self.entered(me, previous.state(), ctx, report);
    }

    fn entered(
        &mut self,
        me: &mut Entity,
        from: CombatState,
        ctx: &mut TickContext<'_>,
        report: &mut TickReport,
    ) {
        let to = self.state();
        debug!(entity = %me.id(), %from, %to, "state transition");
        report.transitions.push(Transition {
            entity: me.id(),
            from,
            to,
        });
        if from == CombatState::Chase {
            ctx.movement.stop(me);
        }

        if let Phase::Respawn = self.phase {
            me.respawn_now();
            self.transition(me, Phase::Idle, ctx, report);
        }
    }
}
