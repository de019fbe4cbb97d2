//! Input events and the activation-key adapter.
//!
//! Pointer positions arrive already converted to world coordinates by the
//! host. Key events are turned into tool intents here, so the state machine
//! never sees raw keys.

use crate::config::{ActivationKeyMode, SessionConfig};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Key that aborts an in-progress stroke or box.
pub const CANCEL_KEY: &str = "Escape";

/// Pointer event in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Up { position: Point },
    Move { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position }
            | PointerEvent::Up { position }
            | PointerEvent::Move { position } => *position,
        }
    }
}

/// Keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed {
        key: String,
        /// Auto-repeat from a held key.
        #[serde(default)]
        repeat: bool,
        /// Focus is in a text input.
        #[serde(default)]
        typing: bool,
    },
    Released {
        key: String,
    },
}

impl KeyEvent {
    /// A plain, non-repeat key-down outside of text input.
    pub fn pressed(key: impl Into<String>) -> Self {
        KeyEvent::Pressed {
            key: key.into(),
            repeat: false,
            typing: false,
        }
    }

    pub fn released(key: impl Into<String>) -> Self {
        KeyEvent::Released { key: key.into() }
    }
}

/// What a key event asks the tool to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolIntent {
    Arm,
    Disarm,
    Cancel,
}

/// Maps the activation key to arm / disarm intents.
#[derive(Debug, Clone)]
pub struct ActivationKeys {
    key: String,
    mode: ActivationKeyMode,
    ignore_while_typing: bool,
    /// Hold mode: the activation key is currently down.
    held: bool,
}

impl ActivationKeys {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            key: config.activation_key.clone(),
            mode: config.activation_key_mode,
            ignore_while_typing: config.ignore_while_typing,
            held: false,
        }
    }

    /// Pick up a new configuration. A held key stays held only if the
    /// binding and hold mode are unchanged.
    pub fn rebind(&mut self, config: &SessionConfig) {
        let held = self.held
            && self.key == config.activation_key
            && config.activation_key_mode == ActivationKeyMode::Hold;
        *self = Self::from_config(config);
        self.held = held;
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mode(&self) -> ActivationKeyMode {
        self.mode
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Translate a key event. `armed` is the tool's current state, which
    /// toggle mode flips.
    pub fn handle(&mut self, event: &KeyEvent, armed: bool) -> Option<ToolIntent> {
        match event {
            KeyEvent::Pressed { key, repeat, typing } => {
                if *typing && self.ignore_while_typing {
                    return None;
                }
                if key == CANCEL_KEY {
                    return Some(ToolIntent::Cancel);
                }
                if *key != self.key || *repeat {
                    return None;
                }
                match self.mode {
                    ActivationKeyMode::Hold => {
                        if self.held {
                            return None;
                        }
                        self.held = true;
                        Some(ToolIntent::Arm)
                    }
                    ActivationKeyMode::Toggle if armed => Some(ToolIntent::Disarm),
                    ActivationKeyMode::Toggle => Some(ToolIntent::Arm),
                }
            }
            // Releases are honored while typing so a held key can't leave
            // the tool stuck armed.
            KeyEvent::Released { key } => {
                if *key != self.key || self.mode != ActivationKeyMode::Hold || !self.held {
                    return None;
                }
                self.held = false;
                Some(ToolIntent::Disarm)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(mode: ActivationKeyMode) -> ActivationKeys {
        ActivationKeys::from_config(&SessionConfig {
            activation_key_mode: mode,
            ..SessionConfig::default()
        })
    }

    fn typing(key: &str) -> KeyEvent {
        KeyEvent::Pressed {
            key: key.into(),
            repeat: false,
            typing: true,
        }
    }

    #[test]
    fn test_hold_mode() {
        let mut keys = keys(ActivationKeyMode::Hold);
        assert_eq!(keys.handle(&KeyEvent::pressed("KeyD"), false), Some(ToolIntent::Arm));
        assert!(keys.is_held());
        assert_eq!(keys.handle(&KeyEvent::released("KeyD"), true), Some(ToolIntent::Disarm));
        assert!(!keys.is_held());
        assert_eq!(keys.handle(&KeyEvent::released("KeyD"), false), None);
    }

    #[test]
    fn test_hold_ignores_repeat() {
        let mut keys = keys(ActivationKeyMode::Hold);
        keys.handle(&KeyEvent::pressed("KeyD"), false);
        let repeat = KeyEvent::Pressed {
            key: "KeyD".into(),
            repeat: true,
            typing: false,
        };
        assert_eq!(keys.handle(&repeat, true), None);
        assert_eq!(keys.handle(&KeyEvent::pressed("KeyD"), true), None);
    }

    #[test]
    fn test_toggle_mode() {
        let mut keys = keys(ActivationKeyMode::Toggle);
        assert_eq!(keys.handle(&KeyEvent::pressed("KeyD"), false), Some(ToolIntent::Arm));
        assert_eq!(keys.handle(&KeyEvent::released("KeyD"), true), None);
        assert_eq!(keys.handle(&KeyEvent::pressed("KeyD"), true), Some(ToolIntent::Disarm));
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut keys = keys(ActivationKeyMode::Hold);
        assert_eq!(keys.handle(&KeyEvent::pressed("KeyA"), false), None);
        assert_eq!(keys.handle(&KeyEvent::released("KeyA"), false), None);
    }

    #[test]
    fn test_escape_cancels() {
        let mut keys = keys(ActivationKeyMode::Hold);
        assert_eq!(keys.handle(&KeyEvent::pressed(CANCEL_KEY), true), Some(ToolIntent::Cancel));
    }

    #[test]
    fn test_typing_ignored_but_release_honored() {
        let mut keys = keys(ActivationKeyMode::Hold);
        assert_eq!(keys.handle(&typing("KeyD"), false), None);
        assert!(!keys.is_held());

        keys.handle(&KeyEvent::pressed("KeyD"), false);
        // Focus moved into a text field while holding: the release still disarms.
        assert_eq!(keys.handle(&KeyEvent::released("KeyD"), true), Some(ToolIntent::Disarm));
    }

    #[test]
    fn test_typing_allowed_when_configured() {
        let mut keys = ActivationKeys::from_config(&SessionConfig {
            ignore_while_typing: false,
            ..SessionConfig::default()
        });
        assert_eq!(keys.handle(&typing("KeyD"), false), Some(ToolIntent::Arm));
    }

    #[test]
    fn test_rebind() {
        let mut keys = keys(ActivationKeyMode::Hold);
        keys.handle(&KeyEvent::pressed("KeyD"), false);
        keys.rebind(&SessionConfig {
            activation_key: "KeyQ".into(),
            activation_key_mode: ActivationKeyMode::Toggle,
            ..SessionConfig::default()
        });
        assert!(!keys.is_held());
        assert_eq!(keys.key(), "KeyQ");
        assert_eq!(keys.mode(), ActivationKeyMode::Toggle);
        assert_eq!(keys.handle(&KeyEvent::pressed("KeyQ"), false), Some(ToolIntent::Arm));
    }

    #[test]
    fn test_rebind_same_key_keeps_hold() {
        let mut keys = keys(ActivationKeyMode::Hold);
        keys.handle(&KeyEvent::pressed("KeyD"), false);
        keys.rebind(&SessionConfig::default());
        assert!(keys.is_held());
        assert_eq!(keys.handle(&KeyEvent::released("KeyD"), true), Some(ToolIntent::Disarm));
    }
}
