use std::sync::mpsc::Receiver;

use eframe::egui::Vec2;

use crate::graph::{KnowledgeGraph, Placement, isolated_ring_target, polygon_anchor};

use super::phase::PhaseSnapshot;
use super::simulation::{Body, Force};

const HUB_STRENGTH: f32 = 0.8;
const COLLAPSED_STRENGTH: f32 = 0.7;
const HIDDEN_STRENGTH: f32 = 0.5;
const VERTEX_STRENGTH: f32 = 0.4;
const MEMBER_STRENGTH: f32 = 0.35;
const ISOLATED_STRENGTH: f32 = 0.3;

/// Phase-dependent pull toward each node's bloom target.
///
/// Registered as the `cluster` force. Reads the latest [`PhaseSnapshot`] from
/// the controller channel at the start of every tick.
pub struct ForceField {
    placements: Vec<Placement>,
    hub: Vec2,
    anchors: Vec<Vec2>,
    ring: Vec<Vec2>,
    snapshot: PhaseSnapshot,
    updates: Receiver<PhaseSnapshot>,
}

impl ForceField {
    pub fn new(graph: &KnowledgeGraph, polygon_radius: f32, updates: Receiver<PhaseSnapshot>) -> Self {
        let hub = graph.hub().target;
        let anchors = (0..graph.cluster_count)
            .map(|cluster| polygon_anchor(hub, cluster, graph.cluster_count, polygon_radius))
            .collect();
        let ring = (0..graph.isolated_count)
            .map(|index| isolated_ring_target(hub, index, graph.isolated_count))
            .collect();
        let mut field = Self {
            placements: graph.placements(),
            hub,
            anchors,
            ring,
            snapshot: PhaseSnapshot::collapsed(0),
            updates,
        };
        field.sync();
        field
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> PhaseSnapshot {
        self.snapshot
    }

    fn sync(&mut self) {
        while let Ok(snapshot) = self.updates.try_recv() {
            self.snapshot = snapshot;
        }
    }

    /// Where a node of this placement is pulled, and how hard.
    pub fn target_for(&self, placement: Placement) -> (Vec2, f32) {
        if placement == Placement::Hub {
            return (self.hub, HUB_STRENGTH);
        }
        if !self.snapshot.expanded {
            return (self.hub, COLLAPSED_STRENGTH);
        }
        if !self.snapshot.is_revealed(placement) {
            return (self.hub, HIDDEN_STRENGTH);
        }

        match placement {
            Placement::PolygonVertex { vertex_index } => (
                self.anchors.get(vertex_index).copied().unwrap_or(self.hub),
                VERTEX_STRENGTH,
            ),
            Placement::ClusterMember { cluster_id } => (
                self.anchors.get(cluster_id).copied().unwrap_or(self.hub),
                MEMBER_STRENGTH,
            ),
            Placement::Isolated { isolated_index } => (
                self.ring.get(isolated_index).copied().unwrap_or(self.hub),
                ISOLATED_STRENGTH,
            ),
            Placement::Hub => (self.hub, HUB_STRENGTH),
        }
    }
}

impl Force for ForceField {
    fn apply(&mut self, bodies: &mut [Body], alpha: f32) {
        self.sync();
        for (body, &placement) in bodies.iter_mut().zip(&self.placements) {
            let (target, strength) = self.target_for(placement);
            body.velocity += (target - body.position) * strength * alpha;
        }
    }
}
