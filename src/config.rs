use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Physics tuning. Defaults follow the usual d3-style constants.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub velocity_decay: f32,
    pub max_ticks: usize,
    pub drag_alpha_target: f32,
    pub resize_alpha: f32,
    pub charge_strength: f32,
    pub theta: f32,
    pub link_distance: f32,
    pub link_strength: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub cluster_strength: f32,
    pub bounds_padding: f32,
    pub center_strength: f32,
    pub jitter_radius: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_decay: 0.02,
            alpha_min: 0.001,
            velocity_decay: 0.3,
            max_ticks: 1000,
            drag_alpha_target: 0.3,
            resize_alpha: 0.3,
            charge_strength: 300.0,
            theta: 0.9,
            link_distance: 150.0,
            link_strength: 0.3,
            collision_padding: 10.0,
            collision_strength: 0.9,
            cluster_strength: 0.3,
            bounds_padding: 100.0,
            center_strength: 1.0,
            jitter_radius: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    pub primary_radius: [f32; 2],
    pub secondary_radius: [f32; 2],
    pub degree_radius: [f32; 2],
    pub stroke_width: [f32; 2],
    pub label_quantile: f32,
    pub label_min_count: usize,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            primary_radius: [25.0, 80.0],
            secondary_radius: [20.0, 60.0],
            degree_radius: [4.0, 16.0],
            stroke_width: [1.0, 8.0],
            label_quantile: 0.2,
            label_min_count: 5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub sizing: SizingConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [simulation]
            link_distance = 90.0
            max_ticks = 400

            [sizing]
            label_min_count = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.link_distance, 90.0);
        assert_eq!(config.simulation.max_ticks, 400);
        assert_eq!(config.simulation.alpha_decay, 0.02);
        assert_eq!(config.sizing.label_min_count, 3);
        assert_eq!(config.sizing.primary_radius, [25.0, 80.0]);
    }

    #[test]
    fn load_reports_missing_file() {
        let error = Config::load(Path::new("/definitely/missing/forces.toml")).unwrap_err();
        assert!(format!("{error:#}").contains("forces.toml"));
    }
}
