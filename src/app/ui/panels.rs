use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::config::Config;
use crate::engine::Scene;
use crate::engine::interaction::{DragController, DragEvent};
use crate::engine::metrics::SizeMetric;
use crate::engine::palette::Palettes;
use crate::payload::GraphPayload;

use super::super::ViewModel;

const REHEAT_ALPHA: f32 = 1.0;

impl ViewModel {
    pub(in crate::app) fn new(
        payload: GraphPayload,
        config: Config,
        metric: Option<SizeMetric>,
        viewport: Vec2,
        palettes: &mut Palettes,
    ) -> Self {
        let scene = Scene::build(&payload, viewport, &config, metric, palettes);
        Self {
            metric: scene.metric,
            payload,
            scene,
            config,
            drag: DragController::default(),
            last_drag_event: None,
            search: String::new(),
            search_match_cache: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            show_link_labels: true,
            rebuild_requested: false,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &Path,
        palettes: &mut Palettes,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.rebuild_requested {
            self.rebuild_scene(palettes);
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("venture-graph");
                    ui.separator();
                    ui.label(format!("source: {}", source.display()));
                    ui.label(format!("nodes: {}", self.scene.nodes.len()));
                    ui.label(format!("links: {}", self.scene.links.len()));
                    if self.scene.dropped_links > 0 {
                        ui.label(format!("dropped links: {}", self.scene.dropped_links))
                            .on_hover_text("Links whose endpoints are not in the node list.");
                    }

                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui
                        .button("Reheat")
                        .on_hover_text("Restart the layout from the current positions.")
                        .clicked()
                    {
                        self.scene.simulation.reheat(REHEAT_ALPHA);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let simulation = &self.scene.simulation;
                        let status = if simulation.is_running() {
                            "running"
                        } else {
                            "settled"
                        };
                        ui.label(format!(
                            "alpha {:.3}  |  tick {}  |  {status}",
                            simulation.alpha(),
                            simulation.ticks()
                        ));
                        if let Some(event) = &self.last_drag_event {
                            ui.label(match event {
                                DragEvent::Started(id) => format!("dragging {id}"),
                                DragEvent::Ended(id) => format!("released {id}"),
                            });
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading graph data...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    pub(in crate::app) fn cancel_drag(&mut self) {
        if let Some(event) = self.drag.cancel(&mut self.scene.simulation) {
            self.last_drag_event = Some(event);
        }
    }

    /// Re-derives the scene from the loaded payload after a metric change.
    fn rebuild_scene(&mut self, palettes: &mut Palettes) {
        self.rebuild_requested = false;
        self.cancel_drag();

        let viewport = self.scene.simulation.viewport();
        let forces = self.scene.simulation.forces();
        self.scene = Scene::build(&self.payload, viewport, &self.config, Some(self.metric), palettes);
        self.scene.simulation.set_forces(forces);
        self.search_match_cache = None;
        tracing::info!(metric = self.metric.label(), "scene rebuilt");
    }
}
