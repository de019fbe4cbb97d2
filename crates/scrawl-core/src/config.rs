//! Session configuration.
//!
//! Loaded from JSON with camelCase keys; any missing key takes its default.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Shortest allowed timed-erase timeout.
pub const MIN_TIMED_ERASE_SECS: u64 = 5;
/// Longest allowed timed-erase timeout.
pub const MAX_TIMED_ERASE_SECS: u64 = 120;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the activation key arms the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKeyMode {
    /// Armed while the key is held down.
    #[default]
    Hold,
    /// Each press flips between armed and disarmed.
    Toggle,
}

/// All tunables the engine consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Standard participants may draw.
    pub player_drawing_enabled: bool,
    /// Normal drawing lifetime. 0 = never expires.
    pub drawing_timeout_seconds: u64,
    /// Lifetime while timed erase is active.
    pub timed_erase_timeout_seconds: u64,
    /// Elevated participants may persist drawings.
    pub persistence_allowed: bool,
    pub activation_key_mode: ActivationKeyMode,
    /// Activation key presses from a text input are ignored.
    pub ignore_while_typing: bool,
    /// Key code that arms the tool.
    pub activation_key: String,
    pub min_stroke_width: u32,
    pub max_stroke_width: u32,
    pub default_stroke_width: u32,
    /// Expiry sweep interval in normal operation.
    pub slow_sweep_seconds: u64,
    /// Expiry sweep interval while timed erase is active.
    pub fast_sweep_millis: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_drawing_enabled: true,
            drawing_timeout_seconds: 3600,
            timed_erase_timeout_seconds: 30,
            persistence_allowed: true,
            activation_key_mode: ActivationKeyMode::Hold,
            ignore_while_typing: true,
            activation_key: "KeyD".to_string(),
            min_stroke_width: 1,
            max_stroke_width: 40,
            default_stroke_width: 4,
            slow_sweep_seconds: 10,
            fast_sweep_millis: 1000,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validated()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp soft ranges and reject contradictory values.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.min_stroke_width == 0 {
            return Err(ConfigError::Invalid("minStrokeWidth must be positive".into()));
        }
        if self.min_stroke_width > self.max_stroke_width {
            return Err(ConfigError::Invalid(format!(
                "minStrokeWidth {} exceeds maxStrokeWidth {}",
                self.min_stroke_width, self.max_stroke_width
            )));
        }
        if self.activation_key.is_empty() {
            return Err(ConfigError::Invalid("activationKey must not be empty".into()));
        }
        if self.slow_sweep_seconds == 0 || self.fast_sweep_millis == 0 {
            return Err(ConfigError::Invalid("sweep intervals must be positive".into()));
        }
        self.timed_erase_timeout_seconds = self
            .timed_erase_timeout_seconds
            .clamp(MIN_TIMED_ERASE_SECS, MAX_TIMED_ERASE_SECS);
        self.default_stroke_width = self.clamp_width(self.default_stroke_width);
        Ok(self)
    }

    /// Clamp a stroke width into the configured range.
    pub fn clamp_width(&self, width: u32) -> u32 {
        width.clamp(self.min_stroke_width, self.max_stroke_width.max(self.min_stroke_width))
    }

    /// Normal drawing lifetime, `None` if drawings never expire.
    pub fn drawing_timeout(&self) -> Option<Duration> {
        (self.drawing_timeout_seconds > 0).then(|| Duration::from_secs(self.drawing_timeout_seconds))
    }

    pub fn timed_erase_timeout(&self) -> Duration {
        Duration::from_secs(self.timed_erase_timeout_seconds)
    }

    pub fn slow_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.slow_sweep_seconds.max(1))
    }

    pub fn fast_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.fast_sweep_millis.max(1))
    }
}
