use eframe::egui::{self, RichText, Ui};

use crate::engine::ForceIntegrator;
use crate::graph::{EdgeKind, Placement};

use super::super::ViewModel;

fn placement_text(placement: Placement) -> String {
    match placement {
        Placement::Hub => "hub".to_owned(),
        Placement::PolygonVertex { vertex_index } => format!("anchor of cluster {vertex_index}"),
        Placement::ClusterMember { cluster_id } => format!("cluster {cluster_id}"),
        Placement::Isolated { isolated_index } => format!("isolated #{isolated_index}"),
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected) = self.navigator.selected() else {
            ui.label("Click a node in the graph to open it.");
            return;
        };
        let Some(&index) = self.graph.index_by_id.get(&selected.id) else {
            ui.label("Selected node no longer exists in the graph state.");
            return;
        };

        let node = &self.graph.nodes[index];
        ui.label(RichText::new(node.label.as_str()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        if let Some(kind) = &node.kind {
            ui.label(format!("Type: {kind}"));
        }
        ui.label(format!("Weight: {}", node.weight));
        ui.label(format!("Placement: {}", placement_text(node.placement)));
        if self.simulation.is_pinned(index) {
            ui.label("Pinned");
        }

        if let Some(url) = &node.url {
            match self.navigator.resolve(url) {
                Some(resolved) => {
                    ui.hyperlink_to(url.as_str(), resolved);
                }
                None => {
                    ui.label(format!("Link: {url}"));
                }
            }
        }

        let mut related = self
            .graph
            .edges
            .iter()
            .filter(|edge| matches!(edge.kind, EdgeKind::Content(_)))
            .filter_map(|edge| {
                if edge.source == index {
                    Some(edge.target)
                } else if edge.target == index {
                    Some(edge.source)
                } else {
                    None
                }
            })
            .filter(|&other| other != index)
            .collect::<Vec<_>>();
        related.sort_unstable();
        related.dedup();

        if ui.small_button("Close").clicked() {
            self.navigator.clear();
            return;
        }

        ui.separator();
        ui.label(RichText::new("Linked nodes").strong());
        if related.is_empty() {
            ui.label("No content links.");
            return;
        }

        let now = ui.input(|input| input.time);
        let mut focus = None;
        egui::ScrollArea::vertical()
            .id_salt("related_nodes_scroll")
            .max_height(320.0)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for &other in &related {
                    let other_node = &self.graph.nodes[other];
                    if ui
                        .link(other_node.label.as_str())
                        .on_hover_text(other_node.id.as_str())
                        .clicked()
                    {
                        focus = Some(other);
                    }
                }
            });

        if let Some(other) = focus {
            self.focus_node(other, now);
            self.activate_node(other);
        }
    }
}
