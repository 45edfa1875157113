use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::Color;
use crate::sheet::Behavior;

/// Startup settings stored in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Initial background, `#RRGGBB` or a color name
    pub color: String,
    /// Initial transparency level, alpha = level / 10
    pub alpha_level: f32,
    pub width_ratio: f32,
    pub height_ratio: f32,
    pub move_step: i32,
    pub micro_move_step: i32,
    pub min_size: i32,
    pub debug_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            color: "#FF0000".into(),
            alpha_level: 7.5,
            width_ratio: 0.5,
            height_ratio: 0.4,
            move_step: 25,
            micro_move_step: 3,
            min_size: 50,
            debug_logging: false,
        }
    }
}

impl AppConfig {
    /// Configured color, falling back to red when it does not parse.
    pub fn color(&self) -> Color {
        self.color.parse().unwrap_or_else(|err| {
            tracing::warn!(color = %self.color, %err, "invalid color in config, using red");
            Color::RED
        })
    }

    pub fn behavior(&self) -> Behavior {
        let defaults = Behavior::default();
        let ratio = |r: f32, fallback: f32| if r > 0.0 && r <= 1.0 { r } else { fallback };

        Behavior {
            width_ratio: ratio(self.width_ratio, defaults.width_ratio),
            height_ratio: ratio(self.height_ratio, defaults.height_ratio),
            move_step: self.move_step.max(1),
            micro_move_step: self.micro_move_step.max(1),
            min_size: self.min_size.max(1),
            ..defaults
        }
    }
}

pub fn config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("RedSheet").join("config.json")
}

pub fn load_from(path: &Path) -> anyhow::Result<AppConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_to(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(config)?;
    fs::write(path, data).with_context(|| format!("writing config {}", path.display()))
}

/// Load the config, writing defaults on first run.
pub fn load_config() -> anyhow::Result<AppConfig> {
    load_or_init(&config_path())
}

fn load_or_init(path: &Path) -> anyhow::Result<AppConfig> {
    if !path.exists() {
        let config = AppConfig::default();
        save_to(path, &config)?;
        return Ok(config);
    }
    load_from(path)
}
