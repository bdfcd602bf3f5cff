use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2, vec2};

use crate::config::Config;
use crate::engine::Scene;
use crate::engine::interaction::{DragController, DragEvent};
use crate::engine::metrics::SizeMetric;
use crate::engine::palette::Palettes;
use crate::payload::{GraphPayload, load_payload};

mod graph;
mod render_utils;
mod ui;

const DEFAULT_VIEWPORT: Vec2 = vec2(1280.0, 800.0);

pub struct GraphViewApp {
    source: PathBuf,
    config: Config,
    metric: Option<SizeMetric>,
    palettes: Palettes,
    last_viewport: Vec2,
    state: AppState,
    reload_rx: Option<Receiver<Result<GraphPayload, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<GraphPayload, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    payload: GraphPayload,
    scene: Scene,
    config: Config,
    metric: SizeMetric,
    drag: DragController,
    last_drag_event: Option<DragEvent>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    show_link_labels: bool,
    rebuild_requested: bool,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

impl GraphViewApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: PathBuf,
        config: Config,
        metric: Option<SizeMetric>,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            config,
            metric,
            palettes: Palettes::default(),
            last_viewport: DEFAULT_VIEWPORT,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: PathBuf) -> Receiver<Result<GraphPayload, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_payload(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: PathBuf) -> AppState {
        tracing::info!(path = %source.display(), "loading graph data");
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready_state(&mut self, result: Result<GraphPayload, String>) -> AppState {
        match result {
            Ok(payload) => AppState::Ready(Box::new(ViewModel::new(
                payload,
                self.config,
                self.metric,
                self.last_viewport,
                &mut self.palettes,
            ))),
            Err(error) => {
                tracing::error!(%error, "graph data failed to load");
                AppState::Error(error)
            }
        }
    }
}

impl eframe::App for GraphViewApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph data...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load graph data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut self.palettes, &mut reload_requested, is_reloading);
                self.last_viewport = model.scene.simulation.viewport();

                if reload_requested && self.reload_rx.is_none() {
                    tracing::info!(path = %self.source.display(), "reloading graph data");
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            model.cancel_drag();
                            transition = Some(result);
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(Err("background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.source.clone());
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready_state(result);
        }
    }
}
