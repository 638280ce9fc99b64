use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Vec2, vec2};
use tracing::info;

use crate::util::stable_unit;

use super::cluster::Partition;
use super::model::{
    ContentGraph, EdgeKind, GraphEdge, GraphNode, KnowledgeGraph, Placement,
};

pub const DEFAULT_HUB_ID: &str = "__athanor_hub__";
pub const DEFAULT_HUB_LABEL: &str = "Athanor";

const MEMBER_RADIUS_BASE: f32 = 30.0;
const MEMBER_RADIUS_PER_NODE: f32 = 3.0;
const MEMBER_RADIUS_MAX: f32 = 80.0;
const ISOLATED_RADIUS_BASE: f32 = 50.0;
const ISOLATED_RADIUS_JITTER: f32 = 30.0;
const ISOLATED_RING_BASE: f32 = 100.0;
const ISOLATED_RING_STEP: f32 = 30.0;

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub hub_id: String,
    pub hub_label: String,
    pub hub_position: Vec2,
    pub polygon_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            hub_id: DEFAULT_HUB_ID.to_owned(),
            hub_label: DEFAULT_HUB_LABEL.to_owned(),
            hub_position: Vec2::ZERO,
            polygon_radius: 280.0,
        }
    }
}

pub fn vertex_id(vertex_index: usize) -> String {
    format!("__polygon_vertex_{vertex_index}__")
}

fn unit(angle: f32) -> Vec2 {
    vec2(angle.cos(), angle.sin())
}

/// Anchor of cluster `index` out of `count`, starting at the top of the polygon.
pub fn polygon_anchor(hub: Vec2, index: usize, count: usize, radius: f32) -> Vec2 {
    if count == 0 {
        return hub;
    }
    let angle = (index as f32 / count as f32) * TAU - FRAC_PI_2;
    hub + unit(angle) * radius.max(0.0)
}

pub fn member_radius(cluster_size: usize) -> f32 {
    (MEMBER_RADIUS_BASE + MEMBER_RADIUS_PER_NODE * cluster_size as f32).min(MEMBER_RADIUS_MAX)
}

pub fn member_position(anchor: Vec2, index: usize, cluster_size: usize) -> Vec2 {
    if cluster_size == 0 {
        return anchor;
    }
    let angle = (index as f32 / cluster_size as f32) * TAU;
    anchor + unit(angle) * member_radius(cluster_size)
}

/// Initial spot of an isolated node, 50 to 80 units from the hub.
pub fn isolated_seed_position(hub: Vec2, id: &str, index: usize, count: usize) -> Vec2 {
    if count == 0 {
        return hub;
    }
    let angle = (index as f32 / count as f32) * TAU;
    let radius = ISOLATED_RADIUS_BASE + stable_unit(id) * ISOLATED_RADIUS_JITTER;
    hub + unit(angle) * radius
}

/// Orbit an isolated node settles on once revealed.
pub fn isolated_ring_target(hub: Vec2, index: usize, count: usize) -> Vec2 {
    if count == 0 {
        return hub;
    }
    let angle = (index as f32 / count as f32) * TAU;
    let radius = ISOLATED_RING_BASE + (index % 3) as f32 * ISOLATED_RING_STEP;
    hub + unit(angle) * radius
}

/// Builds the hub-and-polygon arrangement for one data load.
pub fn compose(content: &ContentGraph, partition: &Partition, config: &LayoutConfig) -> KnowledgeGraph {
    let hub = config.hub_position;
    let cluster_count = partition.cluster_count();
    let isolated_count = partition.isolated_count();

    let mut nodes = content
        .nodes
        .iter()
        .map(|node| GraphNode {
            id: node.id.clone(),
            label: node.label.clone(),
            kind: node.kind.clone(),
            url: node.url.clone(),
            weight: node.weight,
            placement: Placement::Isolated { isolated_index: 0 },
            target: hub,
        })
        .collect::<Vec<_>>();

    let mut edges = content
        .edges
        .iter()
        .map(|edge| GraphEdge {
            source: edge.source,
            target: edge.target,
            kind: EdgeKind::Content(edge.kind.clone()),
        })
        .collect::<Vec<_>>();

    let first_vertex = nodes.len();
    for (cluster_id, members) in partition.clusters.iter().enumerate() {
        let anchor = polygon_anchor(hub, cluster_id, cluster_count, config.polygon_radius);
        let vertex_index = first_vertex + cluster_id;
        for (member_index, &member) in members.iter().enumerate() {
            let node = &mut nodes[member];
            node.placement = Placement::ClusterMember { cluster_id };
            node.target = member_position(anchor, member_index, members.len());
            edges.push(GraphEdge {
                source: vertex_index,
                target: member,
                kind: EdgeKind::ClusterAnchor,
            });
        }
    }

    for cluster_id in 0..cluster_count {
        nodes.push(GraphNode {
            id: vertex_id(cluster_id),
            label: String::new(),
            kind: None,
            url: None,
            weight: 0,
            placement: Placement::PolygonVertex {
                vertex_index: cluster_id,
            },
            target: polygon_anchor(hub, cluster_id, cluster_count, config.polygon_radius),
        });
    }

    for cluster_id in 0..cluster_count {
        let next = (cluster_id + 1) % cluster_count;
        if next == cluster_id || (cluster_count == 2 && cluster_id == 1) {
            continue;
        }
        edges.push(GraphEdge {
            source: first_vertex + cluster_id,
            target: first_vertex + next,
            kind: EdgeKind::PolygonRing,
        });
    }

    let hub_index = nodes.len();
    nodes.push(GraphNode {
        id: config.hub_id.clone(),
        label: config.hub_label.clone(),
        kind: None,
        url: None,
        weight: isolated_count as u32,
        placement: Placement::Hub,
        target: hub,
    });

    for (isolated_index, &member) in partition.isolated.iter().enumerate() {
        let node = &mut nodes[member];
        node.placement = Placement::Isolated { isolated_index };
        node.target = isolated_seed_position(hub, &node.id, isolated_index, isolated_count);
        edges.push(GraphEdge {
            source: hub_index,
            target: member,
            kind: EdgeKind::HubLink,
        });
    }

    let mut index_by_id = HashMap::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        index_by_id.entry(node.id.clone()).or_insert(index);
    }
    let neighbors = KnowledgeGraph::build_neighbors(nodes.len(), &edges);

    info!(
        nodes = nodes.len(),
        edges = edges.len(),
        clusters = cluster_count,
        isolated = isolated_count,
        "composed knowledge graph layout"
    );

    KnowledgeGraph {
        nodes,
        edges,
        index_by_id,
        neighbors,
        hub_index,
        cluster_count,
        isolated_count,
    }
}
