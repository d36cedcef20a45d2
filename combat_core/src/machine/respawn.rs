//! Respawn capability injected into the combat loop

use crate::entity::Entity;

/// Decides whether a dead entity may come back
pub trait RespawnService {
    fn can_respawn(&self, entity: &Entity) -> bool;
}

/// Every entity configured for respawn comes back
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRespawn;

impl RespawnService for AlwaysRespawn {
    fn can_respawn(&self, _entity: &Entity) -> bool {
        true
    }
}

/// Only entities of one kind respawn
#[derive(Debug, Clone, Copy)]
pub struct RespawnKind(pub crate::types::EntityKind);

impl RespawnService for RespawnKind {
    fn can_respawn(&self, entity: &Entity) -> bool {
        entity.kind() == self.0
    }
}
