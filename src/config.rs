//! User-tunable engine configuration.
//!
//! Volume sliders are stored as 0-100 integers to match the values users
//! see in the host's settings UI; the engine converts to factors when
//! applying them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

use crate::entity::SourceCategory;

const DEFAULT_CONFIG_PATH: &str = "config/footfall.toml";

/// Engine configuration, persisted as TOML.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FootfallConfig {
    /// Master switch for the whole engine.
    pub enabled: bool,
    /// Whether the engine also runs on multiplayer servers.
    pub enabled_multiplayer: bool,
    /// Global volume, 0-100.
    pub global_volume: u32,
    /// Volume slider for the camera player's own steps, 0-100.
    pub client_player_volume: u32,
    /// Volume slider for other players' steps, 0-100.
    pub other_player_volume: u32,
    /// Volume slider for hostile entities, 0-100.
    pub hostile_volume: u32,
    /// Volume slider for passive entities, 0-100.
    pub passive_volume: u32,
    /// Extra volume at full sprint, 0-100 (percent added at ratio 1).
    pub running_volume_increase: u32,
    /// Upper bound on entities producing steps in one frame.
    pub max_stepping_entities: usize,
    /// Horizontal distance between walking footsteps, in blocks.
    pub stride_length: f32,
    /// Horizontal distance between sprinting footsteps, in blocks.
    pub running_stride_length: f32,
}

impl Default for FootfallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_multiplayer: true,
            global_volume: 100,
            client_player_volume: 100,
            other_player_volume: 100,
            hostile_volume: 100,
            passive_volume: 100,
            running_volume_increase: 0,
            max_stepping_entities: 16,
            stride_length: 1.5,
            running_stride_length: 1.0,
        }
    }
}

impl FootfallConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<FootfallConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    FootfallConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                FootfallConfig::default()
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Global volume as a 0.0-1.0 factor.
    pub fn global_volume_factor(&self) -> f32 {
        percentage(self.global_volume)
    }

    /// Category slider as a 0.0-1.0 factor.
    pub fn category_volume_factor(&self, category: SourceCategory) -> f32 {
        let slider = match category {
            SourceCategory::ClientPlayer => self.client_player_volume,
            SourceCategory::OtherPlayer => self.other_player_volume,
            SourceCategory::Hostile => self.hostile_volume,
            SourceCategory::Passive => self.passive_volume,
        };
        percentage(slider)
    }

    /// Running boost as a 0.0-1.0 factor (added in full at sprint).
    pub fn running_increase_factor(&self) -> f32 {
        percentage(self.running_volume_increase)
    }

    /// Stride length at the given walk-to-sprint ratio.
    ///
    /// Running steps land more often than walking ones.
    pub fn stride_for_ratio(&self, speed_ratio: f32) -> f32 {
        self.stride_length + (self.running_stride_length - self.stride_length) * speed_ratio
    }
}

fn percentage(slider: u32) -> f32 {
    slider.min(100) as f32 / 100.0
}
