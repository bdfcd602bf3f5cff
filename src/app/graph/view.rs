use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::engine::labels::{TextMeasure, label_font_size};
use crate::payload::NodeKind;
use crate::util::format_currency;

use super::super::render_utils::{
    arrow_head, circle_visible, dim_color, draw_background, edge_visible, parse_color,
    world_to_screen,
};
use super::super::{SearchMatchCache, ViewModel};

const LINK_LABEL_MIN_ZOOM: f32 = 0.6;
const ARROW_LENGTH: f32 = 6.0;

/// Measures label text with the same fonts the painter draws with.
struct PainterMeasure<'a> {
    painter: &'a Painter,
}

impl TextMeasure for PainterMeasure<'_> {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        self.painter
            .layout_no_wrap(text.to_owned(), FontId::proportional(font_size), Color32::WHITE)
            .size()
            .x
    }
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .scene
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.name, query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if rect.width() >= 1.0 && rect.height() >= 1.0 {
            self.scene.simulation.resize(rect.size());
        }
        if self.scene.needs_labels() {
            self.scene.assign_labels(&PainterMeasure { painter: &painter });
        }

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.handle_node_drag(ui, rect, &response);

        if self.live_physics && self.scene.simulation.step() {
            ui.ctx().request_repaint();
        }

        let search_matches = self.cached_search_matches();
        let search_active = search_matches.as_ref().is_some_and(|matches| !matches.is_empty());
        let world_center = self.world_center();
        let pan = self.pan;
        let zoom = self.zoom;

        let anchors = self.scene.simulation.anchors();
        painter.circle_stroke(
            world_to_screen(rect, world_center, pan, zoom, anchors.center()),
            anchors.orbit_radius() * zoom,
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(150, 160, 175, 60)),
        );
        for &anchor in anchors.points() {
            painter.circle_filled(
                world_to_screen(rect, world_center, pan, zoom, anchor),
                3.0,
                Color32::from_rgba_unmultiplied(150, 160, 175, 110),
            );
        }

        let sim_nodes = self.scene.simulation.nodes();
        let screen_positions = sim_nodes
            .iter()
            .map(|node| world_to_screen(rect, world_center, pan, zoom, node.position))
            .collect::<Vec<Pos2>>();
        let screen_radii = sim_nodes
            .iter()
            .map(|node| (node.radius * zoom).max(1.5))
            .collect::<Vec<_>>();
        let visible_indices = (0..sim_nodes.len())
            .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index]))
            .collect::<Vec<_>>();

        for (link, visual) in self.scene.simulation.links().iter().zip(&self.scene.links) {
            let start = screen_positions[link.source];
            let end = screen_positions[link.target];
            if !edge_visible(rect, start, end, visual.stroke_width) {
                continue;
            }

            let mut color = parse_color(visual.color);
            if search_active {
                color = dim_color(color, 0.3);
            }
            painter.line_segment(
                [start, end],
                Stroke::new((visual.stroke_width * zoom.sqrt()).max(0.5), color.gamma_multiply(0.6)),
            );
            if let Some(points) = arrow_head(start, end, screen_radii[link.target], ARROW_LENGTH * zoom) {
                painter.add(egui::Shape::convex_polygon(points.to_vec(), color, Stroke::NONE));
            }

            if self.show_link_labels && zoom >= LINK_LABEL_MIN_ZOOM && !visual.label_text.is_empty() {
                painter.text(
                    start + (end - start) * 0.5,
                    Align2::CENTER_CENTER,
                    &visual.label_text,
                    FontId::proportional(10.0 * zoom.sqrt()),
                    Color32::from_gray(90),
                );
            }
        }

        let hovered = Self::hovered_index(ui, &visible_indices, &screen_positions, &screen_radii);
        if hovered.is_some() || self.drag.dragged_index().is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::Grab;
            });
        }

        for &index in &visible_indices {
            let visual = &self.scene.nodes[index];
            let position = screen_positions[index];
            let radius = screen_radii[index];

            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));
            let is_dragged = self.drag.dragged_index() == Some(index);

            let base_color = parse_color(visual.color);
            let color = if search_active && !is_match {
                dim_color(base_color, 0.25)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            let outline = if is_dragged || hovered == Some(index) {
                Stroke::new(2.5, Color32::from_gray(30))
            } else {
                Stroke::new(1.5, Color32::WHITE)
            };
            painter.circle_stroke(position, radius, outline);
            if is_match {
                painter.circle_stroke(
                    position,
                    radius + 4.0,
                    Stroke::new(2.0, Color32::from_rgb(255, 196, 0)),
                );
            }

            if let Some(label) = &visual.label {
                let font_size = label_font_size(sim_nodes[index].radius) * zoom;
                if font_size >= 4.0 {
                    painter.text(
                        position,
                        Align2::CENTER_CENTER,
                        label,
                        FontId::proportional(font_size),
                        Color32::WHITE,
                    );
                }
            }
        }

        if let Some(index) = hovered {
            let visual = &self.scene.nodes[index];
            let magnitude = match visual.kind {
                NodeKind::Primary => format!("valuation {}", format_currency(visual.magnitude)),
                NodeKind::Secondary => format!("invested {}", format_currency(visual.magnitude)),
            };
            let panel_text = format!(
                "{}  |  {} ({})  |  {}  |  links {}",
                visual.name,
                visual.category,
                visual.kind.label(),
                magnitude,
                visual.degree
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(30),
            );
        }
    }
}
