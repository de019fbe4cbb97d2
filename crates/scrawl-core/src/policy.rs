//! Permission decisions.
//!
//! Pure functions of the actor's role and two configuration flags. Anything
//! the policy cannot place (unknown role, empty id) is denied.

use crate::actor::{Actor, Role};
use crate::config::SessionConfig;

/// Decides what an actor may do in the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub player_drawing_enabled: bool,
    pub persistence_allowed: bool,
}

impl SessionPolicy {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            player_drawing_enabled: config.player_drawing_enabled,
            persistence_allowed: config.persistence_allowed,
        }
    }

    pub fn can_draw(&self, actor: &Actor) -> bool {
        if !actor.is_known() {
            return false;
        }
        match actor.role {
            Role::Elevated => true,
            Role::Standard => self.player_drawing_enabled,
            Role::Unknown => false,
        }
    }

    pub fn can_erase_all(&self, actor: &Actor) -> bool {
        actor.is_elevated()
    }

    pub fn can_erase_own(&self, actor: &Actor) -> bool {
        self.can_draw(actor)
    }

    pub fn can_persist(&self, actor: &Actor) -> bool {
        actor.is_elevated() && self.persistence_allowed
    }

    /// Whether the expiry sweep may remove other actors' records.
    pub fn can_sweep_all(&self, actor: &Actor) -> bool {
        actor.is_elevated()
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
