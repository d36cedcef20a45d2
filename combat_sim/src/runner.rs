//! Drives an arena through a scenario at a fixed frame rate

use crate::scenario::{RespawnPolicy, Scenario, ScenarioError};
use combat_core::machine::{AlwaysRespawn, RespawnKind};
use combat_core::{
    ApplyOutcome, Arena, CombatLibrary, CombatStateMachine, DeathEvent, DeathLog, EntityId, EntityKind,
    MachineConfig, Position,
};
use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Per-entity totals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatantTally {
    pub name: String,
    pub kind: Option<EntityKind>,
    pub attacks: u32,
    pub hits: u32,
    pub damage_dealt: i64,
    pub kills: u32,
    pub deaths: u32,
}

/// Outcome of a scenario run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimSummary {
    pub name: String,
    pub frames: u64,
    pub sim_time: f64,
    pub tallies: BTreeMap<EntityId, CombatantTally>,
    pub deaths: Vec<DeathEvent>,
    /// (id, current hp, max hp) of entities still in combat
    pub survivors: Vec<(EntityId, i64, i64)>,
}

impl SimSummary {
    pub fn print(&self) {
        println!("\n{}", "=".repeat(60));
        println!("  {} ({} frames, {:.2}s simulated)", self.name, self.frames, self.sim_time);
        println!("{}\n", "=".repeat(60));

        println!(
            "  {:<6} {:<12} {:>7} {:>6} {:>8} {:>6} {:>6}",
            "id", "name", "attacks", "hits", "damage", "kills", "deaths"
        );
        for (id, tally) in &self.tallies {
            println!(
                "  {:<6} {:<12} {:>7} {:>6} {:>8} {:>6} {:>6}",
                id.to_string(),
                tally.name,
                tally.attacks,
                tally.hits,
                tally.damage_dealt,
                tally.kills,
                tally.deaths
            );
        }

        println!("\n  Survivors:");
        for (id, hp, max_hp) in &self.survivors {
            let name = self.tallies.get(id).map_or("?", |t| t.name.as_str());
            println!("    {} {}: {}/{} HP", id, name, hp, max_hp);
        }
    }
}

/// Random offset inside a square of half-width `jitter`
fn jitter(rng: &mut ChaCha8Rng, jitter: f64) -> DVec2 {
    if jitter <= 0.0 {
        return DVec2::ZERO;
    }
    DVec2::new(rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter))
}

fn build_arena(scenario: &Scenario, library: CombatLibrary) -> Arena {
    let arena = Arena::new(library);
    match scenario.respawn {
        RespawnPolicy::None => arena,
        RespawnPolicy::All => arena.with_respawn_service(AlwaysRespawn),
        RespawnPolicy::Players => arena.with_respawn_service(RespawnKind(EntityKind::Player)),
        RespawnPolicy::Monsters => arena.with_respawn_service(RespawnKind(EntityKind::Monster)),
    }
}

/// Spawn every combatant group, applying seeded jitter and opening effects
fn populate(arena: &mut Arena, scenario: &Scenario, rng: &mut ChaCha8Rng) {
    let effects = arena.library().effects.clone();
    let lifecycle = arena.library().constants.lifecycle.clone();

    for group in &scenario.combatants {
        for _ in 0..group.count {
            let position: Position = group.position + jitter(rng, scenario.spawn_jitter);
            let machine =
                CombatStateMachine::new(MachineConfig::from_constants(&lifecycle, group.respawn));
            let id = arena.spawn_with_machine(group.entity.clone(), position, group.brain.build(), machine);

            let Some(entity) = arena.entity_mut(id) else {
                continue;
            };
            for effect in &group.effects {
                let outcome = entity.apply_effect(&effects, effect);
                debug!(entity = %id, effect = %effect, ?outcome, "opening effect");
                if outcome == ApplyOutcome::UnknownEffect {
                    warn!(entity = %id, effect = %effect, "scenario references an unknown effect");
                }
            }
        }
    }
}

/// Run a scenario to completion
pub fn run(scenario: &Scenario, library: CombatLibrary) -> Result<SimSummary, ScenarioError> {
    let mut rng = ChaCha8Rng::seed_from_u64(scenario.seed);
    let mut arena = build_arena(scenario, library);

    let log = DeathLog::new();
    arena.subscribe_deaths(log.clone());
    let kills: Rc<RefCell<BTreeMap<EntityId, u32>>> = Rc::default();
    let kill_counter = Rc::clone(&kills);
    arena.subscribe_deaths(move |event: &DeathEvent| {
        if let Some(killer) = event.killer {
            *kill_counter.borrow_mut().entry(killer).or_insert(0) += 1;
        }
    });

    populate(&mut arena, scenario, &mut rng);
    info!(
        scenario = %scenario.name,
        entities = arena.entities().len(),
        seed = scenario.seed,
        "scenario started"
    );

    let mut summary = SimSummary {
        name: scenario.name.clone(),
        ..SimSummary::default()
    };
    for entity in arena.entities() {
        summary.tallies.insert(
            entity.id(),
            CombatantTally {
                name: entity.name.clone(),
                kind: Some(entity.kind()),
                ..CombatantTally::default()
            },
        );
    }

    let frame_dt = 1.0 / scenario.frame_rate;
    for _ in 0..scenario.total_frames() {
        let report = arena.advance(frame_dt);
        summary.frames += 1;

        for transition in &report.combat.transitions {
            debug!(
                entity = %transition.entity,
                from = %transition.from,
                to = %transition.to,
                "transition"
            );
        }
        for attack in &report.combat.attacks {
            debug!("{}", attack.summary());
            if let Some(tally) = summary.tallies.get_mut(&attack.attacker) {
                tally.attacks += 1;
                if attack.hit.is_hit {
                    tally.hits += 1;
                    tally.damage_dealt += attack.damage;
                }
            }
        }

        if arena.active_count() <= 1 {
            info!(time = arena.time(), "one combatant left, ending early");
            break;
        }
    }

    summary.sim_time = arena.time();
    summary.deaths = log.events();
    for event in &summary.deaths {
        if let Some(tally) = summary.tallies.get_mut(&event.entity) {
            tally.deaths += 1;
        }
    }
    for (killer, count) in kills.borrow().iter() {
        if let Some(tally) = summary.tallies.get_mut(killer) {
            tally.kills = *count;
        }
    }
    summary.survivors = arena
        .entities()
        .iter()
        .filter(|e| e.is_targetable())
        .map(|e| (e.id(), e.current_hp(), e.max_hp()))
        .collect();

    info!(
        scenario = %scenario.name,
        deaths = summary.deaths.len(),
        survivors = summary.survivors.len(),
        "scenario finished"
    );
    Ok(summary)
}
