use std::f32::consts::TAU;
use std::time::Duration;

use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, Vec2, vec2};

use crate::engine::{ForceIntegrator, PhaseSnapshot};
use crate::graph::{EdgeKind, GraphNode, Placement};
use crate::util::truncate_label;

use super::super::render_utils::{
    Palette, blend_color, circle_visible, draw_background, draw_glow, edge_visible, with_alpha,
};
use super::super::ViewModel;
use super::style::{
    HALO_EXTRA, HUB_RADIUS, HUB_RAY_COUNT, LabelEmphasis, label_font_size, label_max_chars,
    label_visible, node_radius, ray_length,
};

const IDLE_REPAINT: Duration = Duration::from_millis(50);
const HINT_TEXT: &str = "Click the sun to bloom the graph";

fn outlined_text(
    painter: &Painter,
    position: Pos2,
    anchor: Align2,
    text: &str,
    font: FontId,
    color: Color32,
    outline: Color32,
) {
    for offset in [vec2(-1.0, 0.0), vec2(1.0, 0.0), vec2(0.0, -1.0), vec2(0.0, 1.0)] {
        painter.text(position + offset, anchor, text, font.clone(), outline);
    }
    painter.text(position, anchor, text, font, color);
}

fn edge_stroke(kind: &EdgeKind, highlighted: bool, palette: &Palette) -> Stroke {
    match kind {
        EdgeKind::PolygonRing => Stroke::new(1.5, palette.polygon_link),
        EdgeKind::ClusterAnchor => Stroke::new(0.5, palette.anchor_link),
        EdgeKind::HubLink => Stroke::new(1.0, palette.hub_link),
        EdgeKind::Content(_) if highlighted => Stroke::new(2.0, palette.link_highlight),
        EdgeKind::Content(_) => Stroke::new(1.0, palette.link),
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let now = ui.input(|input| input.time);
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let palette = Palette::for_mode(self.night_mode);

        draw_background(&painter, rect, &palette);

        self.fit_view(rect.size(), now);
        if self.controller.advance(now) {
            self.simulation.reheat();
        }
        let camera_moving = self.camera.advance(now);

        self.handle_graph_zoom(ui, rect, &response);
        let positions = self.simulation.positions();
        self.handle_pointer(ui, rect, &response, &positions, now);

        let simulating = !self.paused && self.simulation.tick();
        let positions = self.simulation.positions();
        let snapshot = self.controller.snapshot();

        self.draw_edges(&painter, rect, &positions, &snapshot, &palette);
        self.draw_nodes(&painter, rect, &positions, &snapshot, &palette);
        self.draw_sun(&painter, rect, &positions, &palette, now);

        if simulating || camera_moving || self.controller.is_animating() || response.dragged() {
            ui.ctx().request_repaint();
        } else {
            ui.ctx().request_repaint_after(IDLE_REPAINT);
        }
    }

    fn draw_edges(
        &self,
        painter: &Painter,
        rect: Rect,
        positions: &[Vec2],
        snapshot: &PhaseSnapshot,
        palette: &Palette,
    ) {
        for edge in &self.graph.edges {
            let (Some(source), Some(target)) =
                (self.graph.nodes.get(edge.source), self.graph.nodes.get(edge.target))
            else {
                continue;
            };
            if !snapshot.is_visible(source.placement) || !snapshot.is_visible(target.placement) {
                continue;
            }

            let start = self.camera.to_screen(rect, positions[edge.source]);
            let end = self.camera.to_screen(rect, positions[edge.target]);
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }

            let highlighted = self.highlight.edge_highlighted(edge.source, edge.target);
            painter.line_segment([start, end], edge_stroke(&edge.kind, highlighted, palette));
        }
    }

    fn draw_nodes(
        &self,
        painter: &Painter,
        rect: Rect,
        positions: &[Vec2],
        snapshot: &PhaseSnapshot,
        palette: &Palette,
    ) {
        let zoom = self.camera.zoom;

        for (index, node) in self.graph.nodes.iter().enumerate() {
            if node.is_hub() || !snapshot.is_visible(node.placement) {
                continue;
            }

            let center = self.camera.to_screen(rect, positions[index]);
            let radius = node_radius(node) * zoom;
            if !circle_visible(rect, center, radius + HALO_EXTRA * zoom + 40.0) {
                continue;
            }

            if let Placement::PolygonVertex { .. } = node.placement {
                draw_glow(painter, center, radius, radius * 3.0, with_alpha(palette.vertex, 0.6));
                painter.circle_filled(center, radius, palette.vertex);
                continue;
            }

            let emphasis = self.highlight.emphasis(index);
            let base = if node.is_isolated() {
                palette.isolated
            } else {
                palette.node
            };
            let fill = if emphasis.hovered {
                palette.node_hover
            } else if self.highlight.is_active() && !emphasis.highlighted {
                with_alpha(base, 0.45)
            } else {
                base
            };

            painter.circle_filled(center, radius + HALO_EXTRA * zoom, with_alpha(fill, 0.15));
            painter.circle_filled(center, radius, fill);

            if emphasis.hovered {
                painter.circle_stroke(center, radius, Stroke::new(2.0, palette.text_hover));
            } else if emphasis.highlighted {
                painter.circle_stroke(
                    center,
                    radius + 3.0 * zoom,
                    Stroke::new(1.5, blend_color(fill, palette.link_highlight, 0.5)),
                );
            }

            if self.simulation.is_pinned(index) {
                painter.circle_filled(center, (2.0 * zoom).max(1.5), palette.pin);
            }

            if self.show_labels {
                self.draw_label(painter, node, center, radius, emphasis, palette);
            }
        }
    }

    fn draw_label(
        &self,
        painter: &Painter,
        node: &GraphNode,
        center: Pos2,
        screen_radius: f32,
        emphasis: LabelEmphasis,
        palette: &Palette,
    ) {
        let zoom = self.camera.zoom;
        if node.label.is_empty() || !label_visible(emphasis, node.weight, zoom) {
            return;
        }

        let text = truncate_label(&node.label, label_max_chars(emphasis, zoom));
        let font = FontId::proportional(label_font_size(emphasis, zoom) * zoom);
        let color = if emphasis.hovered {
            palette.text_hover
        } else {
            palette.text
        };
        outlined_text(
            painter,
            center + vec2(0.0, screen_radius + 4.0 * zoom),
            Align2::CENTER_TOP,
            &text,
            font,
            color,
            palette.text_outline,
        );
    }

    fn draw_sun(&self, painter: &Painter, rect: Rect, positions: &[Vec2], palette: &Palette, now: f64) {
        let hub = self.graph.hub();
        let Some(&world) = positions.get(self.graph.hub_index) else {
            return;
        };
        let zoom = self.camera.zoom;
        let center = self.camera.to_screen(rect, world);
        let radius = HUB_RADIUS * zoom;
        if !circle_visible(rect, center, radius * 3.0 + 80.0) {
            return;
        }

        let rotation = (now * 0.2) as f32;
        for ray in 0..HUB_RAY_COUNT {
            let angle = rotation + ray as f32 / HUB_RAY_COUNT as f32 * TAU;
            let direction = vec2(angle.cos(), angle.sin());
            let inner = center + direction * (radius + 3.0 * zoom);
            let outer = center + direction * ray_length(ray, now) * zoom;
            painter.line_segment([inner, outer], Stroke::new((2.0 * zoom).max(1.0), palette.sun_ray));
        }

        let pulse = 1.0 + ((now * 1.5).sin() as f32) * 0.06;
        draw_glow(painter, center, radius, radius * 2.2 * pulse, with_alpha(palette.sun, 0.5));
        painter.circle_filled(center, radius, palette.sun);
        painter.circle_filled(center, radius * 0.55, palette.sun_core);

        if self.highlight.hovered == Some(self.graph.hub_index) {
            painter.circle_stroke(center, radius + 2.0, Stroke::new(2.0, palette.text_hover));
        }

        if zoom > 0.3 {
            outlined_text(
                painter,
                center + vec2(0.0, radius + 18.0 * zoom),
                Align2::CENTER_TOP,
                &hub.label,
                FontId::proportional((14.0 * zoom.sqrt()).clamp(10.0, 22.0)),
                palette.text_hover,
                palette.text_outline,
            );
        }

        if !self.controller.toggled_once() {
            painter.text(
                center + vec2(0.0, radius + 40.0 * zoom.max(0.5)),
                Align2::CENTER_TOP,
                HINT_TEXT,
                FontId::proportional(12.0),
                with_alpha(palette.text, 0.8),
            );
        }
    }
}
