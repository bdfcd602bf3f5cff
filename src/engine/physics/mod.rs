mod anchors;
mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::config::SimulationConfig;
use crate::util::stable_pair;

pub use anchors::{ClusterAnchors, ClusterKey};
use forces::{
    CollisionParams, accumulate_bounds, accumulate_cluster, accumulate_collisions,
    accumulate_links, accumulate_repulsion, centering_shift,
};
use quadtree::QuadNode;

#[derive(Clone, Debug)]
pub struct SimNode {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Slot into the cluster anchor list.
    pub cluster: usize,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
}

impl SimNode {
    pub fn new(id: impl Into<String>, radius: f32, cluster: usize) -> Self {
        Self {
            id: id.into(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius,
            cluster,
            fx: None,
            fy: None,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
    /// Share of the spring correction applied to the target.
    pub bias: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForceKind {
    Repulsion,
    Link,
    Collision,
    Cluster,
    Bounds,
    Center,
}

impl ForceKind {
    pub const ALL: [Self; 6] = [
        Self::Repulsion,
        Self::Link,
        Self::Collision,
        Self::Cluster,
        Self::Bounds,
        Self::Center,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Repulsion => "repulsion",
            Self::Link => "link springs",
            Self::Collision => "collision",
            Self::Cluster => "cluster pull",
            Self::Bounds => "viewport bounds",
            Self::Center => "centering",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForceSet(u8);

impl ForceSet {
    pub fn all() -> Self {
        let mut set = Self::none();
        for kind in ForceKind::ALL {
            set.set(kind, true);
        }
        set
    }

    pub fn none() -> Self {
        Self(0)
    }

    pub fn contains(self, kind: ForceKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn set(&mut self, kind: ForceKind, enabled: bool) {
        if enabled {
            self.0 |= kind.bit();
        } else {
            self.0 &= !kind.bit();
        }
    }
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Default)]
struct PhysicsScratch {
    deltas: Vec<Vec2>,
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    radii: Vec<f32>,
}

/// Owns node and link state and advances the layout one tick at a time.
///
/// Hosts drive it through [`Simulation::step`]; a frame callback, a timer and
/// a test loop all look the same from here.
pub struct Simulation {
    config: SimulationConfig,
    forces: ForceSet,
    viewport: Vec2,
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    anchors: ClusterAnchors,
    alpha: f32,
    alpha_target: f32,
    ticks: usize,
    running: bool,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub fn new(
        mut nodes: Vec<SimNode>,
        links: Vec<SimLink>,
        categories: &[String],
        viewport: Vec2,
        config: SimulationConfig,
    ) -> Self {
        let center = viewport * 0.5;
        let single = nodes.len() == 1;
        for node in &mut nodes {
            let (jx, jy) = stable_pair(&node.id);
            node.position = if single {
                center
            } else {
                center + vec2(jx, jy) * config.jitter_radius
            };
            node.velocity = Vec2::ZERO;
        }

        let mut simulation = Self {
            config,
            forces: ForceSet::all(),
            viewport,
            nodes,
            links,
            anchors: ClusterAnchors::compute(categories, viewport),
            alpha: 1.0,
            alpha_target: 0.0,
            ticks: 0,
            running: false,
            scratch: PhysicsScratch::default(),
        };
        simulation.running = simulation.can_simulate();

        tracing::debug!(
            nodes = simulation.nodes.len(),
            links = simulation.links.len(),
            clusters = simulation.anchors.points().len(),
            "simulation initialised"
        );
        simulation
    }

    fn can_simulate(&self) -> bool {
        self.nodes.len() >= 2
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SimulationConfig) {
        self.config = config;
    }

    pub fn forces(&self) -> ForceSet {
        self.forces
    }

    pub fn set_forces(&mut self, forces: ForceSet) {
        self.forces = forces;
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub fn node(&self, index: usize) -> Option<&SimNode> {
        self.nodes.get(index)
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn anchors(&self) -> &ClusterAnchors {
        &self.anchors
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    /// Resumes ticking from the current positions.
    pub fn restart(&mut self) {
        self.ticks = 0;
        self.running = self.can_simulate();
    }

    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.restart();
    }

    /// Reheats to `alpha` unless the run is already hotter.
    pub fn reheat_at_least(&mut self, alpha: f32) {
        self.reheat(self.alpha.max(alpha));
    }

    pub fn resize(&mut self, viewport: Vec2) {
        if viewport == self.viewport {
            return;
        }

        self.viewport = viewport;
        self.anchors = ClusterAnchors::compute(self.anchors.categories(), viewport);
        if !self.can_simulate() {
            let center = viewport * 0.5;
            for node in self.nodes.iter_mut().filter(|node| !node.is_pinned()) {
                node.position = center;
            }
        }
        tracing::debug!(width = viewport.x, height = viewport.y, "viewport resized");
        self.reheat_at_least(self.config.resize_alpha);
    }

    pub fn pin(&mut self, index: usize, position: Vec2) {
        let Some(node) = self.nodes.get_mut(index) else {
            return;
        };
        node.fx = Some(position.x);
        node.fy = Some(position.y);
        node.position = position;
        node.velocity = Vec2::ZERO;
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.fx = None;
            node.fy = None;
        }
    }

    /// Nearest node whose circle contains `point`.
    pub fn hit_test(&self, point: Vec2) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let distance = (node.position - point).length();
                (distance <= node.radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Advances at most one tick. Returns whether a tick ran.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.tick();

        let settled = self.alpha < self.config.alpha_min;
        let exhausted =
            self.ticks >= self.config.max_ticks && self.alpha_target < self.config.alpha_min;
        if settled || exhausted {
            self.running = false;
            tracing::debug!(
                ticks = self.ticks,
                alpha = self.alpha,
                exhausted,
                "simulation stopped"
            );
        }
        true
    }

    pub fn run_to_convergence(&mut self) -> usize {
        let mut ticks = 0;
        while self.step() {
            ticks += 1;
        }
        ticks
    }

    /// One integration step, regardless of whether the run has settled.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.ticks += 1;

        let node_count = self.nodes.len();
        if node_count == 0 {
            return;
        }

        self.compose_forces();
        self.integrate();
    }

    fn compose_forces(&mut self) {
        let config = self.config;
        let alpha = self.alpha;
        let node_count = self.nodes.len();

        let scratch = &mut self.scratch;
        scratch.deltas.clear();
        scratch.deltas.resize(node_count, Vec2::ZERO);
        scratch.positions.clear();
        scratch.predicted.clear();
        scratch.radii.clear();
        let mut max_radius = 0.0_f32;
        for node in &self.nodes {
            let radius = node.radius + config.collision_padding;
            scratch.positions.push(node.position);
            scratch.predicted.push(node.position + node.velocity);
            scratch.radii.push(radius);
            max_radius = max_radius.max(radius);
        }

        let deltas = &mut scratch.deltas;

        if self.forces.contains(ForceKind::Repulsion)
            && let Some(tree) = QuadNode::build(&scratch.positions)
        {
            let strength = config.charge_strength * alpha;
            for (index, delta) in deltas.iter_mut().enumerate() {
                accumulate_repulsion(&tree, index, &scratch.positions, strength, config.theta, delta);
            }
        }

        if self.forces.contains(ForceKind::Link) {
            accumulate_links(
                &self.links,
                &scratch.predicted,
                config.link_distance,
                config.link_strength * alpha,
                deltas,
            );
        }

        if self.forces.contains(ForceKind::Collision)
            && max_radius > 0.0
            && let Some(tree) = QuadNode::build(&scratch.predicted)
        {
            let max_reach = max_radius * 2.0;
            accumulate_collisions(
                &tree,
                &tree,
                true,
                &scratch.predicted,
                &scratch.radii,
                CollisionParams {
                    strength: config.collision_strength,
                    max_reach_sq: max_reach * max_reach,
                },
                deltas,
            );
        }

        if self.forces.contains(ForceKind::Cluster) {
            accumulate_cluster(
                &self.nodes,
                self.anchors.points(),
                config.cluster_strength * alpha,
                deltas,
            );
        }

        if self.forces.contains(ForceKind::Bounds) {
            accumulate_bounds(&self.nodes, self.viewport, config.bounds_padding, alpha, deltas);
        }

        if self.forces.contains(ForceKind::Center) {
            let shift = centering_shift(&self.nodes, self.viewport * 0.5, config.center_strength);
            for node in &mut self.nodes {
                node.position += shift;
            }
        }
    }

    fn integrate(&mut self) {
        let retain = 1.0 - self.config.velocity_decay.clamp(0.0, 1.0);
        let fallback = self.viewport * 0.5;

        for (index, node) in self.nodes.iter_mut().enumerate() {
            let last_good = self.scratch.positions[index];
            let delta = self.scratch.deltas[index];

            match node.fx {
                Some(x) => {
                    node.position.x = x;
                    node.velocity.x = 0.0;
                }
                None => {
                    node.velocity.x = (node.velocity.x + delta.x) * retain;
                    node.position.x += node.velocity.x;
                }
            }
            match node.fy {
                Some(y) => {
                    node.position.y = y;
                    node.velocity.y = 0.0;
                }
                None => {
                    node.velocity.y = (node.velocity.y + delta.y) * retain;
                    node.position.y += node.velocity.y;
                }
            }

            if !node.position.is_finite() || !node.velocity.is_finite() {
                tracing::warn!(id = %node.id, "non-finite layout state, restoring last position");
                node.position = if last_good.is_finite() {
                    last_good
                } else {
                    fallback
                };
                node.velocity = Vec2::ZERO;
            }
        }
    }
}
