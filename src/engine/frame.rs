use serde::Serialize;

use super::Scene;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    pub source_x: f32,
    pub source_y: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub stroke_width: f32,
    pub color: String,
    pub label_text: String,
}

/// Everything a renderer needs for one frame, in layout coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameView {
    pub alpha: f32,
    pub tick: usize,
    pub nodes: Vec<NodeView>,
    pub links: Vec<LinkView>,
}

impl Scene {
    pub fn frame(&self) -> FrameView {
        let sim_nodes = self.simulation.nodes();

        let nodes = sim_nodes
            .iter()
            .zip(&self.nodes)
            .map(|(node, visual)| NodeView {
                id: node.id.clone(),
                x: node.position.x,
                y: node.position.y,
                radius: node.radius,
                color: visual.color.to_owned(),
                label: visual.label.clone(),
            })
            .collect();

        let links = self
            .simulation
            .links()
            .iter()
            .zip(&self.links)
            .map(|(link, visual)| {
                let source = sim_nodes[link.source].position;
                let target = sim_nodes[link.target].position;
                LinkView {
                    source_x: source.x,
                    source_y: source.y,
                    target_x: target.x,
                    target_y: target.y,
                    stroke_width: visual.stroke_width,
                    color: visual.color.to_owned(),
                    label_text: visual.label_text.clone(),
                }
            })
            .collect();

        FrameView {
            alpha: self.simulation.alpha(),
            tick: self.simulation.ticks(),
            nodes,
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::config::Config;
    use crate::engine::Scene;
    use crate::engine::labels::EstimatedMeasure;
    use crate::engine::palette::Palettes;
    use crate::payload::parse_payload;

    const PAYLOAD: &str = r#"{
        "nodes": [
            {"id": "stripe", "name": "Stripe", "category": "Fintech", "magnitude": 95e9},
            {"id": "lyft", "name": "Lyft", "category": "Mobility", "magnitude": 15e9},
            {"id": "a16z", "name": "Andreessen Horowitz", "category": "VC", "kind": "secondary"}
        ],
        "links": [
            {"sourceId": "a16z", "targetId": "stripe", "weight": 250e6},
            {"sourceId": "a16z", "targetId": "lyft", "label": "seed"}
        ]
    }"#;

    fn scene() -> Scene {
        let payload = parse_payload(PAYLOAD).unwrap();
        let mut scene = Scene::build(
            &payload,
            vec2(1000.0, 700.0),
            &Config::default(),
            None,
            &mut Palettes::default(),
        );
        scene.assign_labels(&EstimatedMeasure::default());
        scene
    }

    #[test]
    fn endpoints_follow_node_positions() {
        let mut scene = scene();
        scene.simulation.run_to_convergence();
        let frame = scene.frame();

        assert_eq!(frame.nodes.len(), 3);
        assert_eq!(frame.links.len(), 2);
        assert_eq!(frame.tick, scene.simulation.ticks());

        let a16z = &frame.nodes[2];
        let stripe = &frame.nodes[0];
        let link = &frame.links[0];
        assert_eq!((link.source_x, link.source_y), (a16z.x, a16z.y));
        assert_eq!((link.target_x, link.target_y), (stripe.x, stripe.y));
        assert_eq!(link.label_text, "$250M");
        assert_eq!(frame.links[1].label_text, "seed");
    }

    #[test]
    fn serializes_with_camel_case_link_fields() {
        let frame = scene().frame();
        let json = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["tick"], 0);
        assert!(json["links"][0]["sourceX"].is_number());
        assert!(json["links"][0]["strokeWidth"].is_number());
        assert_eq!(json["links"][1]["labelText"], "seed");
        assert_eq!(json["nodes"][2]["color"], "#ea4335");
        let label = json["nodes"][2]["label"].as_str().unwrap();
        assert!(label.starts_with("Andr"));
        assert!(label.ends_with('\u{2026}'));
    }
}
