use eframe::egui::{self, Align, Context, Layout};
use tracing::{debug, info};

use crate::engine::{ForceIntegrator, PhaseController, PhaseState, build_simulation, install_forces};
use crate::graph::{LayoutConfig, RawGraph, build_knowledge_graph};

use super::super::camera::{FIT_SECS, FOCUS_SECS, FOCUS_ZOOM};
use super::super::highlight::HighlightState;
use super::super::navigation::PanelNavigator;
use super::super::search::find_first_match;
use super::super::{Camera, FitRequest, ViewModel, ViewOptions};

const INITIAL_FIT_PADDING: f32 = 60.0;
const RESET_FIT_PADDING: f32 = 80.0;

fn phase_text(state: PhaseState) -> &'static str {
    match state {
        PhaseState::Collapsed => "collapsed",
        PhaseState::Blooming => "blooming",
        PhaseState::Expanded => "expanded",
        PhaseState::Collapsing => "collapsing",
    }
}

impl ViewModel {
    pub(in crate::app) fn new(raw: &RawGraph, options: &ViewOptions) -> Self {
        let layout = LayoutConfig {
            polygon_radius: options.settings.polygon_radius,
            ..LayoutConfig::default()
        };
        let graph = build_knowledge_graph(raw, &layout);
        let mut controller = if options.expanded {
            PhaseController::new_expanded(graph.isolated_count, graph.cluster_count)
        } else {
            PhaseController::new(graph.isolated_count, graph.cluster_count)
        };
        let mut simulation = build_simulation(&graph);
        install_forces(&mut simulation, &graph, &options.settings, &mut controller);

        Self {
            source_label: options.source.describe(),
            graph,
            simulation,
            controller,
            settings: options.settings,
            camera: Camera::default(),
            navigator: PanelNavigator::new(options.base_url.clone()),
            highlight: HighlightState::default(),
            dragging: None,
            search: String::new(),
            search_missed: false,
            night_mode: false,
            show_labels: true,
            paused: false,
            pending_fit: Some(FitRequest {
                padding: INITIAL_FIT_PADDING,
                duration_secs: 0.0,
            }),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Athanor");
                    ui.separator();
                    ui.label(format!("source: {}", self.source_label));
                    ui.label(format!("nodes: {}", self.graph.nodes.len()));
                    ui.label(format!("links: {}", self.graph.content_edge_count()));
                    ui.label(format!("clusters: {}", self.graph.cluster_count));
                    ui.label(format!("isolated: {}", self.graph.isolated_count));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let activity = if self.paused {
                            "paused".to_owned()
                        } else if self.simulation.is_active() {
                            format!("settling (alpha {:.3})", self.simulation.alpha())
                        } else {
                            "idle".to_owned()
                        };
                        ui.label(format!(
                            "{} | simulation {activity}",
                            phase_text(self.controller.state())
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));

        if let Some(url) = self.navigator.take_pending_url() {
            debug!(%url, "opening node link");
            ctx.open_url(egui::OpenUrl::new_tab(url));
        }
    }

    pub(in crate::app) fn toggle_bloom(&mut self, now_secs: f64) {
        let next = self.controller.toggle(now_secs);
        self.simulation.reheat();
        info!(phase = phase_text(next), "toggled bloom");
    }

    pub(in crate::app) fn request_reset_view(&mut self) {
        self.pending_fit = Some(FitRequest {
            padding: RESET_FIT_PADDING,
            duration_secs: FIT_SECS,
        });
    }

    pub(in crate::app) fn focus_node(&mut self, index: usize, now_secs: f64) {
        let Some(position) = self.simulation.position(index) else {
            return;
        };
        self.camera.focus(position, FOCUS_ZOOM, now_secs, FOCUS_SECS);
        self.set_hover(Some(index));
    }

    pub(in crate::app) fn run_search(&mut self, now_secs: f64) {
        match find_first_match(&self.graph, &self.search) {
            Some(index) => {
                self.search_missed = false;
                debug!(query = %self.search, id = %self.graph.nodes[index].id, "search hit");
                self.focus_node(index, now_secs);
            }
            None => {
                self.search_missed = !self.search.trim().is_empty();
            }
        }
    }

    /// Frames every node position, hidden ones included, so a later bloom
    /// stays on screen.
    pub(in crate::app) fn fit_view(&mut self, viewport: egui::Vec2, now_secs: f64) {
        let Some(fit) = self.pending_fit.take() else {
            return;
        };
        let points = self.simulation.positions();
        self.camera
            .fit(viewport, &points, fit.padding, now_secs, fit.duration_secs);
    }
}
