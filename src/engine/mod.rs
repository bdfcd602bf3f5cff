mod frame;
pub mod interaction;
pub mod labels;
pub mod metrics;
pub mod palette;
pub mod physics;

use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;

use crate::config::{Config, SizingConfig};
use crate::payload::{GraphPayload, NodeKind};
use crate::util::weight_label;

pub use frame::{FrameView, LinkView, NodeView};
use labels::{TextMeasure, declutter};
use metrics::{DegreeIndex, MetricScale, ScaleKind, SizeMetric, aggregate_weights};
use palette::{Palettes, SECONDARY_NODE_COLOR, UNLABELED_EDGE_COLOR};
use physics::{ClusterAnchors, ClusterKey, SimLink, SimNode, Simulation};

#[derive(Clone, Debug)]
pub struct NodeVisual {
    pub name: String,
    pub kind: NodeKind,
    pub category: String,
    /// Magnitude after aggregation fallback for secondary nodes.
    pub magnitude: f64,
    pub degree: usize,
    pub color: &'static str,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LinkVisual {
    pub weight: f64,
    pub stroke_width: f32,
    pub color: &'static str,
    pub label_text: String,
}

/// Visual attributes derived from one payload plus the live simulation they
/// feed. Rebuilt from scratch on every data load.
pub struct Scene {
    pub simulation: Simulation,
    pub nodes: Vec<NodeVisual>,
    pub links: Vec<LinkVisual>,
    pub metric: SizeMetric,
    pub dropped_links: usize,
    sizing: SizingConfig,
    labels_assigned: bool,
}

impl Scene {
    pub fn build(
        payload: &GraphPayload,
        viewport: Vec2,
        config: &Config,
        metric: Option<SizeMetric>,
        palettes: &mut Palettes,
    ) -> Self {
        let index_by_id = payload
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect::<HashMap<_, _>>();

        let valid_links = payload
            .links
            .iter()
            .filter_map(|link| {
                let source = *index_by_id.get(link.source_id.as_str())?;
                let target = *index_by_id.get(link.target_id.as_str())?;
                Some((link, source, target))
            })
            .collect::<Vec<_>>();

        let dropped_links = payload.links.len() - valid_links.len();
        if dropped_links > 0 {
            tracing::warn!(dropped_links, "dropped links with unknown endpoints");
        }

        let degrees = DegreeIndex::from_links(
            valid_links
                .iter()
                .map(|(link, _, _)| (link.source_id.as_str(), link.target_id.as_str())),
        );
        debug_assert_eq!(degrees.total(), 2 * valid_links.len());
        let aggregated = aggregate_weights(valid_links.iter().map(|(link, _, _)| {
            (link.source_id.as_str(), link.target_id.as_str(), link.weight)
        }));

        let magnitudes = payload
            .nodes
            .iter()
            .map(|node| match node.kind {
                NodeKind::Secondary if node.magnitude <= 0.0 => {
                    aggregated.get(&node.id).copied().unwrap_or(0.0)
                }
                _ => node.magnitude,
            })
            .collect::<Vec<_>>();

        let metric = metric.unwrap_or_else(|| SizeMetric::auto(&magnitudes));
        let radii = node_radii(payload, &magnitudes, &degrees, metric, &config.sizing);

        let mut categories = Vec::new();
        let mut seen = HashSet::new();
        for node in &payload.nodes {
            if node.kind == NodeKind::Primary && seen.insert(node.category.as_str()) {
                categories.push(node.category.clone());
            }
        }

        let nodes = payload
            .nodes
            .iter()
            .zip(&magnitudes)
            .map(|(node, &magnitude)| NodeVisual {
                name: node.name.clone(),
                kind: node.kind,
                category: node.category.clone(),
                magnitude,
                degree: degrees.degree(&node.id),
                color: match node.kind {
                    NodeKind::Primary => palettes.nodes.color(&node.category),
                    NodeKind::Secondary => SECONDARY_NODE_COLOR,
                },
                label: None,
            })
            .collect::<Vec<_>>();

        let stroke_scale = MetricScale::linear(
            valid_links.iter().map(|(link, _, _)| link.weight),
            config.sizing.stroke_width,
        );
        let links = valid_links
            .iter()
            .map(|(link, _, _)| LinkVisual {
                weight: link.weight,
                stroke_width: stroke_scale.apply(link.weight),
                color: match link.label.as_deref() {
                    Some(label) if !label.is_empty() => palettes.edges.color(label),
                    _ => UNLABELED_EDGE_COLOR,
                },
                label_text: if link.weight > 0.0 {
                    weight_label(link.weight)
                } else {
                    link.label.clone().unwrap_or_default()
                },
            })
            .collect::<Vec<_>>();

        let anchors = ClusterAnchors::compute(&categories, viewport);
        let sim_nodes = payload
            .nodes
            .iter()
            .zip(&radii)
            .map(|(node, &radius)| {
                let key = match node.kind {
                    NodeKind::Primary => ClusterKey::Category(node.category.clone()),
                    NodeKind::Secondary => ClusterKey::Secondary,
                };
                let slot = anchors.slot(&key).unwrap_or(categories.len());
                SimNode::new(node.id.clone(), radius, slot)
            })
            .collect::<Vec<_>>();

        let sim_links = valid_links
            .iter()
            .map(|&(link, source, target)| {
                let source_degree = degrees.degree(&link.source_id) as f32;
                let target_degree = degrees.degree(&link.target_id) as f32;
                SimLink {
                    source,
                    target,
                    bias: source_degree / (source_degree + target_degree).max(1.0),
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(
            nodes = nodes.len(),
            links = links.len(),
            categories = categories.len(),
            metric = metric.label(),
            "scene built"
        );

        Self {
            simulation: Simulation::new(sim_nodes, sim_links, &categories, viewport, config.simulation),
            nodes,
            links,
            metric,
            dropped_links,
            sizing: config.sizing,
            labels_assigned: false,
        }
    }

    pub fn needs_labels(&self) -> bool {
        !self.labels_assigned
    }

    /// Picks and truncates labels once per data load; radii do not change
    /// during a run.
    pub fn assign_labels(&mut self, measure: &impl TextMeasure) {
        let entries = self
            .nodes
            .iter()
            .zip(self.simulation.nodes())
            .map(|(visual, node)| (visual.name.as_str(), node.radius))
            .collect::<Vec<_>>();

        let labels = declutter(
            &entries,
            self.sizing.label_quantile,
            self.sizing.label_min_count,
            measure,
        );
        for (visual, label) in self.nodes.iter_mut().zip(labels) {
            visual.label = label;
        }
        self.labels_assigned = true;
    }

    pub fn categories(&self) -> &[String] {
        self.simulation.anchors().categories()
    }

    /// Color key in cluster order, with secondary nodes last.
    pub fn legend(&self) -> Vec<(&str, &'static str)> {
        let mut entries = self
            .categories()
            .iter()
            .filter_map(|category| {
                self.nodes
                    .iter()
                    .find(|node| node.kind == NodeKind::Primary && node.category == *category)
                    .map(|node| (category.as_str(), node.color))
            })
            .collect::<Vec<_>>();

        if let Some(secondary) = self.nodes.iter().find(|node| node.kind == NodeKind::Secondary) {
            entries.push((secondary.category.as_str(), SECONDARY_NODE_COLOR));
        }
        entries
    }
}

fn node_radii(
    payload: &GraphPayload,
    magnitudes: &[f64],
    degrees: &DegreeIndex,
    metric: SizeMetric,
    sizing: &SizingConfig,
) -> Vec<f32> {
    match metric {
        SizeMetric::Magnitude => {
            let of_kind = |kind: NodeKind| {
                payload
                    .nodes
                    .iter()
                    .zip(magnitudes)
                    .filter(move |(node, _)| node.kind == kind)
                    .map(|(_, &magnitude)| magnitude)
            };
            let primary = MetricScale::sqrt(of_kind(NodeKind::Primary), sizing.primary_radius);
            let secondary = MetricScale::sqrt(of_kind(NodeKind::Secondary), sizing.secondary_radius);

            payload
                .nodes
                .iter()
                .zip(magnitudes)
                .map(|(node, &magnitude)| match node.kind {
                    NodeKind::Primary => primary.apply(magnitude),
                    NodeKind::Secondary => secondary.apply(magnitude),
                })
                .collect()
        }
        SizeMetric::Degree => {
            let scale = MetricScale::with_domain(
                ScaleKind::Linear,
                0.0,
                degrees.max_degree() as f64,
                sizing.degree_radius,
            );
            payload
                .nodes
                .iter()
                .map(|node| scale.apply(degrees.degree(&node.id) as f64))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::interaction::{DragController, DragEvent, PointerEvent};
    use crate::engine::labels::EstimatedMeasure;
    use crate::payload::{LinkRecord, NodeRecord};
    use eframe::egui::vec2;

    fn node(id: &str, category: &str, kind: NodeKind, magnitude: f64) -> NodeRecord {
        NodeRecord {
            id: id.to_owned(),
            name: id.to_owned(),
            category: category.to_owned(),
            kind,
            magnitude,
        }
    }

    fn link(source: &str, target: &str, weight: f64) -> LinkRecord {
        LinkRecord {
            source_id: source.to_owned(),
            target_id: target.to_owned(),
            weight,
            label: None,
        }
    }

    fn portfolio() -> GraphPayload {
        GraphPayload {
            nodes: vec![
                node("Stripe", "Fintech", NodeKind::Primary, 95e9),
                node("Plaid", "Fintech", NodeKind::Primary, 13e9),
                node("Airbnb", "Travel", NodeKind::Primary, 75e9),
                node("Sequoia", "VC", NodeKind::Secondary, 2e9),
                node("Accel", "VC", NodeKind::Secondary, 0.0),
            ],
            links: vec![
                link("Sequoia", "Stripe", 150e6),
                link("Sequoia", "Airbnb", 60e6),
                link("Accel", "Plaid", 40e6),
                link("Accel", "Stripe", 1.2e9),
            ],
        }
    }

    fn build(payload: &GraphPayload, palettes: &mut Palettes) -> Scene {
        Scene::build(payload, vec2(1280.0, 800.0), &Config::default(), None, palettes)
    }

    #[test]
    fn dangling_links_are_dropped() {
        let mut payload = portfolio();
        payload.links.push(link("Sequoia", "Ghost", 1.0));
        payload.links.push(link("Nobody", "Stripe", 1.0));

        let scene = build(&payload, &mut Palettes::default());
        assert_eq!(scene.dropped_links, 2);
        assert_eq!(scene.links.len(), 4);
        assert_eq!(scene.simulation.links().len(), 4);

        let degree_sum = scene.nodes.iter().map(|node| node.degree).sum::<usize>();
        assert_eq!(degree_sum, 2 * scene.simulation.links().len());
    }

    #[test]
    fn colors_follow_category_and_kind() {
        let scene = build(&portfolio(), &mut Palettes::default());
        assert_eq!(scene.nodes[0].color, palette::NODE_COLORS[0]);
        assert_eq!(scene.nodes[1].color, palette::NODE_COLORS[0]);
        assert_eq!(scene.nodes[2].color, palette::NODE_COLORS[1]);
        assert_eq!(scene.nodes[3].color, SECONDARY_NODE_COLOR);
        assert_eq!(scene.links[0].color, UNLABELED_EDGE_COLOR);
    }

    #[test]
    fn palette_state_survives_reloads() {
        let mut palettes = Palettes::default();
        build(&portfolio(), &mut palettes);

        let mut reordered = portfolio();
        reordered.nodes.swap(0, 2);
        let scene = build(&reordered, &mut palettes);
        assert_eq!(scene.nodes[0].category, "Travel");
        assert_eq!(scene.nodes[0].color, palette::NODE_COLORS[1]);
    }

    #[test]
    fn secondary_nodes_fall_back_to_aggregated_weight() {
        let scene = build(&portfolio(), &mut Palettes::default());
        assert_eq!(scene.metric, SizeMetric::Magnitude);
        assert_eq!(scene.nodes[4].magnitude, 40e6 + 1.2e9);

        let radii = scene
            .simulation
            .nodes()
            .iter()
            .map(|node| node.radius)
            .collect::<Vec<_>>();
        assert_eq!(radii[0], 80.0);
        assert_eq!(radii[1], 25.0);
        assert!(radii[3] == 20.0 || radii[3] == 60.0);
        assert!(radii.iter().all(|radius| (20.0..=80.0).contains(radius)));
    }

    #[test]
    fn degree_metric_when_no_magnitudes() {
        let payload = GraphPayload {
            nodes: vec![
                node("a", "x", NodeKind::Primary, 0.0),
                node("b", "x", NodeKind::Primary, 0.0),
                node("c", "y", NodeKind::Primary, 0.0),
            ],
            links: vec![link("a", "b", 0.0), link("a", "c", 0.0)],
        };
        let scene = build(&payload, &mut Palettes::default());
        assert_eq!(scene.metric, SizeMetric::Degree);

        let radii = scene
            .simulation
            .nodes()
            .iter()
            .map(|node| node.radius)
            .collect::<Vec<_>>();
        assert_eq!(radii, vec![16.0, 10.0, 10.0]);
        assert_eq!(scene.links[0].stroke_width, 4.5);
    }

    #[test]
    fn link_labels_prefer_weight_then_label() {
        let mut payload = portfolio();
        payload.links.push(LinkRecord {
            label: Some("board seat".to_owned()),
            ..link("Accel", "Airbnb", 0.0)
        });
        let mut palettes = Palettes::default();
        let scene = build(&payload, &mut palettes);

        assert_eq!(scene.links[0].label_text, "$150M");
        assert_eq!(scene.links[3].label_text, "$1.2B");
        assert_eq!(scene.links[4].label_text, "board seat");
        assert_eq!(scene.links[4].color, palette::EDGE_COLORS[0]);
        assert_eq!(scene.links[3].stroke_width, 8.0);
    }

    #[test]
    fn clusters_use_first_seen_categories_plus_secondary() {
        let scene = build(&portfolio(), &mut Palettes::default());
        assert_eq!(scene.categories(), ["Fintech".to_owned(), "Travel".to_owned()]);

        let slots = scene
            .simulation
            .nodes()
            .iter()
            .map(|node| node.cluster)
            .collect::<Vec<_>>();
        assert_eq!(slots, vec![0, 0, 1, 2, 2]);
        assert_eq!(scene.simulation.anchors().points().len(), 3);
    }

    #[test]
    fn legend_lists_categories_then_secondary() {
        let scene = build(&portfolio(), &mut Palettes::default());
        assert_eq!(
            scene.legend(),
            vec![
                ("Fintech", palette::NODE_COLORS[0]),
                ("Travel", palette::NODE_COLORS[1]),
                ("VC", SECONDARY_NODE_COLOR),
            ]
        );
    }

    #[test]
    fn labels_are_assigned_once() {
        let mut scene = build(&portfolio(), &mut Palettes::default());
        assert!(scene.needs_labels());
        scene.assign_labels(&EstimatedMeasure::default());
        assert!(!scene.needs_labels());
        assert!(scene.nodes.iter().all(|node| node.label.is_some()));
    }

    #[test]
    fn end_to_end_layout_and_drag() {
        let payload = GraphPayload {
            nodes: vec![
                node("A", "alpha", NodeKind::Primary, 10.0),
                node("B", "alpha", NodeKind::Primary, 20.0),
                node("C", "alpha", NodeKind::Primary, 30.0),
                node("D", "beta", NodeKind::Primary, 40.0),
                node("E", "beta", NodeKind::Primary, 50.0),
            ],
            links: vec![
                link("A", "D", 1.0),
                link("B", "D", 2.0),
                link("C", "E", 3.0),
                link("A", "E", 4.0),
            ],
        };
        let mut scene = build(&payload, &mut Palettes::default());
        scene.simulation.run_to_convergence();
        assert!(
            scene
                .simulation
                .nodes()
                .iter()
                .all(|node| node.position.is_finite())
        );

        let mut drag = DragController::default();
        let a = 0;
        let grab = scene.simulation.nodes()[a].position;
        assert_eq!(
            drag.handle(PointerEvent::Down(grab), &mut scene.simulation),
            Some(DragEvent::Started("A".to_owned()))
        );
        drag.handle(PointerEvent::Move(vec2(500.0, 500.0)), &mut scene.simulation);
        scene.simulation.step();
        assert_eq!(scene.simulation.nodes()[a].position, vec2(500.0, 500.0));

        assert_eq!(
            drag.handle(PointerEvent::Up, &mut scene.simulation),
            Some(DragEvent::Ended("A".to_owned()))
        );
        scene.simulation.step();
        assert_ne!(scene.simulation.nodes()[a].position, vec2(500.0, 500.0));
    }
}
