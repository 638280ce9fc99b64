use eframe::egui::{self, Pos2, Rect, Ui, Vec2};
use tracing::debug;

use crate::engine::{ForceIntegrator, PhaseSnapshot};

use super::super::highlight::HighlightState;
use super::super::navigation::{ClickAction, NavigationSink, classify_click};
use super::super::ViewModel;
use super::style::hit_radius;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
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
        self.camera.zoom_about(rect, pointer, scroll);
    }

    /// Closest visible node whose hit circle contains `pointer`.
    pub(in crate::app) fn node_at(
        &self,
        rect: Rect,
        snapshot: &PhaseSnapshot,
        positions: &[Vec2],
        pointer: Pos2,
    ) -> Option<usize> {
        self.graph
            .nodes
            .iter()
            .zip(positions)
            .enumerate()
            .filter(|(_, (node, _))| snapshot.is_visible(node.placement))
            .filter_map(|(index, (node, position))| {
                let screen = self.camera.to_screen(rect, *position);
                let distance = screen.distance(pointer);
                (distance <= hit_radius(node) * self.camera.zoom).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn set_hover(&mut self, hovered: Option<usize>) {
        if self.highlight.hovered == hovered {
            return;
        }
        self.highlight = HighlightState::for_hover(&self.graph, hovered);
    }

    /// Hands a non-hub node to the navigation sink.
    pub(in crate::app) fn activate_node(&mut self, index: usize) {
        if let Some(node) = self.graph.nodes.get(index) {
            self.navigator.open(node);
        }
    }

    fn handle_click(&mut self, index: usize, now_secs: f64) {
        let Some(node) = self.graph.nodes.get(index) else {
            return;
        };
        match classify_click(node) {
            ClickAction::ToggleBloom => self.toggle_bloom(now_secs),
            ClickAction::Navigate => self.activate_node(index),
            ClickAction::Nothing => {}
        }
    }

    fn toggle_pin(&mut self, index: usize, position: Vec2) {
        if self.simulation.is_pinned(index) {
            self.simulation.release(index);
            debug!(id = %self.graph.nodes[index].id, "unpinned node");
        } else {
            self.simulation.pin(index, position);
            debug!(id = %self.graph.nodes[index].id, "pinned node");
        }
        self.simulation.reheat();
    }

    /// Hover, clicks, node drags and background panning for one frame.
    pub(in crate::app) fn handle_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        positions: &[Vec2],
        now_secs: f64,
    ) {
        let snapshot = self.controller.snapshot();
        let pointer = response.hover_pos();
        let hovered = pointer.and_then(|pointer| self.node_at(rect, &snapshot, positions, pointer));

        if response.drag_started_by(egui::PointerButton::Primary) {
            let origin = ui.input(|input| input.pointer.press_origin());
            self.dragging = origin
                .and_then(|origin| self.node_at(rect, &snapshot, positions, origin))
                .filter(|&index| !self.graph.nodes[index].is_hub());
            if let Some(index) = self.dragging {
                self.simulation.pin(index, positions[index]);
                self.simulation.reheat();
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            match (self.dragging, response.interact_pointer_pos()) {
                (Some(index), Some(pointer)) => {
                    let world = self.camera.to_world(rect, pointer);
                    self.simulation.pin(index, world);
                }
                (None, _) => self.camera.pan_by(response.drag_delta()),
                _ => {}
            }
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.camera.pan_by(response.drag_delta());
        }

        if response.drag_stopped()
            && let Some(index) = self.dragging.take()
        {
            self.simulation.release(index);
            self.simulation.reheat();
        }

        self.set_hover(self.dragging.or(hovered));

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if let Some(index) = hovered {
            if response.clicked_by(egui::PointerButton::Primary) {
                self.handle_click(index, now_secs);
            } else if response.clicked_by(egui::PointerButton::Secondary)
                && !self.graph.nodes[index].is_hub()
            {
                self.toggle_pin(index, positions[index]);
            }
        }
    }
}
