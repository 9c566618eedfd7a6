use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::bridge::tracks::ExternalLoopPolicy;
use crate::foundation::error::{ScenecraftError, ScenecraftResult};

/// Environment variable overriding [`ExportConfig::ready_timeout_ms`].
pub const ENV_READY_TIMEOUT_MS: &str = "SCENECRAFT_READY_TIMEOUT_MS";
/// Environment variable overriding [`ExportConfig::ready_poll_ms`].
pub const ENV_READY_POLL_MS: &str = "SCENECRAFT_READY_POLL_MS";
/// Environment variable overriding [`ExportConfig::overwrite`].
pub const ENV_OVERWRITE: &str = "SCENECRAFT_OVERWRITE";

/// Tunables for export drivers and the compositing bridge.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// How often to re-check an encoder that is not ready for more data.
    pub ready_poll_ms: u64,
    /// How long to wait for a busy encoder before dropping the frame.
    pub ready_timeout_ms: u64,
    /// Straight RGBA colour that translucent pixels are flattened over for video output.
    pub background_rgba: [u8; 4],
    /// Replace existing output files.
    pub overwrite: bool,
    /// How externally fed video tracks behave past the end of their clip.
    pub loop_policy: ExternalLoopPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            ready_poll_ms: 5,
            ready_timeout_ms: 2_000,
            background_rgba: [0, 0, 0, 255],
            overwrite: true,
            loop_policy: ExternalLoopPolicy::Loop,
        }
    }
}

impl ExportConfig {
    /// Encoder readiness poll interval.
    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_ms)
    }

    /// Encoder readiness timeout.
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> ScenecraftResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ScenecraftError::serde(format!("invalid export config: {e}")))
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: &Path) -> ScenecraftResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read export config '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Apply `SCENECRAFT_*` overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ms) = parse_override::<u64>(&lookup, ENV_READY_TIMEOUT_MS) {
            self.ready_timeout_ms = ms;
        }
        if let Some(ms) = parse_override::<u64>(&lookup, ENV_READY_POLL_MS).filter(|&ms| ms > 0) {
            self.ready_poll_ms = ms;
        }
        if let Some(raw) = lookup(ENV_OVERWRITE) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.overwrite = true,
                "0" | "false" | "no" => self.overwrite = false,
                _ => tracing::warn!(var = ENV_OVERWRITE, value = %raw, "ignoring invalid override"),
            }
        }
        self
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = key, value = %raw, "ignoring invalid override");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/config.rs"]
mod tests;
