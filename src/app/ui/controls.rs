use eframe::egui::{self, RichText, Ui};

use crate::engine::metrics::SizeMetric;
use crate::engine::physics::ForceKind;

use super::super::ViewModel;
use super::super::render_utils::parse_color;

const SLIDER_REHEAT_ALPHA: f32 = 0.3;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search")
            .on_hover_text("Fuzzy-highlight nodes by name without changing the layout.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();
        ui.label("Node size");
        ui.horizontal_wrapped(|ui| {
            for metric in [SizeMetric::Magnitude, SizeMetric::Degree] {
                let hint = match metric {
                    SizeMetric::Magnitude => "Valuation for companies, total invested for investors.",
                    SizeMetric::Degree => "Number of links touching the node.",
                };
                if ui
                    .selectable_value(&mut self.metric, metric, metric.label())
                    .on_hover_text(hint)
                    .changed()
                {
                    self.rebuild_requested = true;
                }
            }
        });

        ui.separator();
        ui.checkbox(&mut self.live_physics, "Live physics")
            .on_hover_text("Pause ticking without losing the current layout.");
        ui.checkbox(&mut self.show_link_labels, "Link labels");

        ui.add_space(4.0);
        ui.label("Forces");
        let mut forces = self.scene.simulation.forces();
        let mut forces_changed = false;
        for kind in ForceKind::ALL {
            let mut enabled = forces.contains(kind);
            if ui.checkbox(&mut enabled, kind.label()).changed() {
                forces.set(kind, enabled);
                forces_changed = true;
            }
        }
        if forces_changed {
            self.scene.simulation.set_forces(forces);
            self.scene.simulation.reheat_at_least(SLIDER_REHEAT_ALPHA);
        }

        ui.add_space(4.0);
        let simulation = &mut self.config.simulation;
        let mut tuning_changed = false;
        tuning_changed |= ui
            .add(egui::Slider::new(&mut simulation.charge_strength, 0.0..=1500.0).text("repulsion"))
            .changed();
        tuning_changed |= ui
            .add(egui::Slider::new(&mut simulation.link_distance, 20.0..=400.0).text("link distance"))
            .changed();
        tuning_changed |= ui
            .add(egui::Slider::new(&mut simulation.link_strength, 0.0..=1.0).text("link strength"))
            .changed();
        tuning_changed |= ui
            .add(
                egui::Slider::new(&mut simulation.collision_strength, 0.0..=1.0)
                    .text("collision strength"),
            )
            .changed();
        tuning_changed |= ui
            .add(egui::Slider::new(&mut simulation.cluster_strength, 0.0..=1.0).text("cluster pull"))
            .changed();
        tuning_changed |= ui
            .add(egui::Slider::new(&mut simulation.velocity_decay, 0.05..=0.9).text("velocity decay"))
            .changed();
        if tuning_changed {
            self.scene.simulation.set_config(self.config.simulation);
            self.scene.simulation.reheat_at_least(SLIDER_REHEAT_ALPHA);
        }

        ui.separator();
        ui.label("Legend");
        for (label, color) in self.scene.legend() {
            ui.horizontal(|ui| {
                ui.label(RichText::new("\u{25cf}").color(parse_color(color)));
                ui.label(label);
            });
        }
    }
}
