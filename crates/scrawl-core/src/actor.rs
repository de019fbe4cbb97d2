//! Participants and their roles.

use crate::color::{HostColor, RgbColor};
use serde::{Deserialize, Serialize};

/// Privilege level of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrative (GM-equivalent) participant.
    Elevated,
    /// Regular participant.
    Standard,
    /// Identity could not be established. Every permission check denies.
    #[default]
    Unknown,
}

/// A participant as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    /// For display and logging only, never for authorization.
    pub display_name: String,
    pub role: Role,
    /// Default drawing color.
    pub color: RgbColor,
}

impl Actor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            color: RgbColor::black(),
        }
    }

    pub fn elevated(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, Role::Elevated)
    }

    pub fn standard(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, Role::Standard)
    }

    pub fn with_color(mut self, color: RgbColor) -> Self {
        self.color = color;
        self
    }

    /// Whether this actor has a usable identity.
    pub fn is_known(&self) -> bool {
        !self.id.is_empty() && self.role != Role::Unknown
    }

    pub fn is_elevated(&self) -> bool {
        self.is_known() && self.role == Role::Elevated
    }
}

/// Identity as reported by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostIdentity {
    pub id: String,
    pub name: String,
    pub is_gm: bool,
    #[serde(default)]
    pub color: Option<HostColor>,
}

impl From<HostIdentity> for Actor {
    fn from(identity: HostIdentity) -> Self {
        let role = if identity.id.is_empty() {
            Role::Unknown
        } else if identity.is_gm {
            Role::Elevated
        } else {
            Role::Standard
        };
        let color = match identity.color.as_ref().map(HostColor::normalize) {
            Some(Some((rgb, _))) => rgb,
            Some(None) => {
                log::warn!("Unparseable color for {}, using black", identity.name);
                RgbColor::black()
            }
            None => RgbColor::black(),
        };
        Actor {
            id: identity.id,
            display_name: identity.name,
            role,
            color,
        }
    }
}
