use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Vec2, vec2};

const ORBIT_FRACTION: f32 = 0.25;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClusterKey {
    Category(String),
    /// Shared region for every secondary node, regardless of its category.
    Secondary,
}

/// One target point per primary category plus one for secondary nodes, spaced
/// evenly on a circle around the viewport center starting at the top.
#[derive(Clone, Debug)]
pub struct ClusterAnchors {
    categories: Vec<String>,
    points: Vec<Vec2>,
    center: Vec2,
    orbit_radius: f32,
}

impl ClusterAnchors {
    pub fn compute(categories: &[String], viewport: Vec2) -> Self {
        let center = viewport * 0.5;
        let orbit_radius = viewport.min_elem() * ORBIT_FRACTION;
        let slots = categories.len() + 1;
        let step = TAU / slots as f32;

        let points = (0..slots)
            .map(|slot| {
                let angle = slot as f32 * step - FRAC_PI_2;
                center + vec2(angle.cos(), angle.sin()) * orbit_radius
            })
            .collect();

        Self {
            categories: categories.to_vec(),
            points,
            center,
            orbit_radius,
        }
    }

    pub fn slot(&self, key: &ClusterKey) -> Option<usize> {
        match key {
            ClusterKey::Category(label) => self.categories.iter().position(|known| known == label),
            ClusterKey::Secondary => Some(self.categories.len()),
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn orbit_radius(&self) -> f32 {
        self.orbit_radius
    }
}
