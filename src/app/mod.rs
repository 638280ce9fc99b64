use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, info};

use crate::engine::{ForceSettings, PhaseController, Simulation};
use crate::graph::{GraphSource, KnowledgeGraph, RawGraph};

mod camera;
mod graph;
mod highlight;
mod navigation;
mod render_utils;
mod search;
mod ui;

use camera::Camera;
use highlight::HighlightState;
use navigation::PanelNavigator;

/// Everything the viewer needs before the data arrives.
#[derive(Clone, Debug)]
pub struct ViewOptions {
    pub source: GraphSource,
    pub settings: ForceSettings,
    /// Start fully bloomed instead of collapsed at the hub.
    pub expanded: bool,
    /// Prefix for relative node links such as `/billets/<slug>`.
    pub base_url: Option<String>,
}

pub struct GraphViewerApp {
    options: ViewOptions,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<RawGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Unavailable(String),
}

struct ViewModel {
    source_label: String,
    graph: KnowledgeGraph,
    simulation: Simulation,
    controller: PhaseController,
    settings: ForceSettings,
    camera: Camera,
    navigator: PanelNavigator,
    highlight: HighlightState,
    dragging: Option<usize>,
    search: String,
    search_missed: bool,
    night_mode: bool,
    show_labels: bool,
    paused: bool,
    pending_fit: Option<FitRequest>,
}

#[derive(Clone, Copy, Debug)]
struct FitRequest {
    padding: f32,
    duration_secs: f64,
}

impl GraphViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: ViewOptions) -> Self {
        let state = AppState::Loading {
            rx: Self::spawn_load(options.source.clone()),
        };
        Self { options, state }
    }

    fn spawn_load(source: GraphSource) -> Receiver<Result<RawGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }
}

impl eframe::App for GraphViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(raw)) => {
                        let model = ViewModel::new(&raw, &self.options);
                        transition = Some(AppState::Ready(Box::new(model)));
                    }
                    Ok(Err(message)) => {
                        error!(source = %self.options.source.describe(), %message, "graph data unavailable");
                        transition = Some(AppState::Unavailable(message));
                    }
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Unavailable("Background load worker disconnected".to_owned()));
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Unavailable(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Graph unavailable");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            if let AppState::Ready(model) = &next_state {
                info!(
                    source = %model.source_label,
                    nodes = model.graph.nodes.len(),
                    clusters = model.graph.cluster_count,
                    "graph view ready"
                );
            }
            self.state = next_state;
        }
    }
}
