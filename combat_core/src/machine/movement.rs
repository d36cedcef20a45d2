//! Movement abstraction used by the Chase state

use crate::entity::Entity;
use crate::types::Position;

/// Moves an entity toward a destination
pub trait Movement {
    /// Step toward `destination`, stopping `stop_distance` short of it
    fn approach(
        &mut self,
        entity: &mut Entity,
        destination: Position,
        stop_distance: f64,
        speed: f64,
        dt: f64,
    );

    /// Halt any ongoing movement
    fn stop(&mut self, entity: &mut Entity);
}

/// Straight-line approach at walk speed, no collision
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineMovement;

impl Movement for StraightLineMovement {
    fn approach(
        &mut self,
        entity: &mut Entity,
        destination: Position,
        stop_distance: f64,
        speed: f64,
        dt: f64,
    ) {
        let offset = destination - entity.position();
        let distance = offset.length();
        let travel = (speed.max(0.0) * dt).min(distance - stop_distance);
        if travel <= 0.0 {
            return;
        }
        entity.set_position(entity.position() + offset.normalize_or_zero() * travel);
    }

    fn stop(&mut self, _entity: &mut Entity) {}
}
