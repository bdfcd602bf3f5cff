use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use crate::engine::interaction::PointerEvent;

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_center = self.world_center();
        let world_before = screen_to_world(rect, world_center, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 6.0);
        self.pan = pointer - rect.center() - ((world_before - world_center) * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Translates primary-button drags into engine pointer events.
    pub(in crate::app) fn handle_node_drag(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        let world_center = self.world_center();
        let (pan, zoom) = (self.pan, self.zoom);
        let to_world = |screen: Pos2| screen_to_world(rect, world_center, pan, zoom, screen);
        let pointer = response.interact_pointer_pos().map(to_world);

        let events = if response.drag_started_by(egui::PointerButton::Primary) {
            let origin = ui.input(|input| input.pointer.press_origin()).map(to_world);
            match (origin.or(pointer), pointer) {
                (Some(origin), Some(current)) => press_events(origin, current).to_vec(),
                _ => Vec::new(),
            }
        } else if response.drag_stopped_by(egui::PointerButton::Primary) {
            vec![PointerEvent::Up]
        } else if response.dragged_by(egui::PointerButton::Primary)
            && response.drag_delta() != egui::Vec2::ZERO
        {
            pointer.map(PointerEvent::Move).into_iter().collect()
        } else {
            Vec::new()
        };

        for event in events {
            if let Some(drag_event) = self.drag.handle(event, &mut self.scene.simulation) {
                tracing::info!(?drag_event, "node drag");
                self.last_drag_event = Some(drag_event);
            }
        }
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn world_center(&self) -> egui::Vec2 {
        self.scene.simulation.viewport() * 0.5
    }
}

/// egui only reports a drag once the pointer leaves its click radius, so the
/// grab is hit-tested where the button went down and then follows the pointer.
fn press_events(origin: Vec2, current: Vec2) -> [PointerEvent; 2] {
    [PointerEvent::Down(origin), PointerEvent::Move(current)]
}
