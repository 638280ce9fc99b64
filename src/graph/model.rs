use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;
use serde::Deserialize;
use tracing::warn;

/// Node record as it arrives from the data source.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub weight: Option<u32>,
    #[serde(default)]
    pub degree: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default, alias = "links")]
    pub edges: Vec<RawEdge>,
}

impl RawNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: None,
            slug: None,
            url: None,
            weight: None,
            degree: None,
        }
    }
}

impl RawEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: None,
        }
    }
}

/// A content item after normalization: ids resolved, weight derived.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentNode {
    pub id: String,
    pub label: String,
    pub kind: Option<String>,
    pub url: Option<String>,
    pub weight: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContentEdge {
    pub source: usize,
    pub target: usize,
    pub kind: String,
}

/// Content nodes and edges with every edge endpoint resolved to a node index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContentGraph {
    pub nodes: Vec<ContentNode>,
    pub edges: Vec<ContentEdge>,
}

impl ContentGraph {
    pub fn from_raw(raw: &RawGraph) -> Self {
        let mut index_by_id = HashMap::with_capacity(raw.nodes.len());
        let mut kept = Vec::with_capacity(raw.nodes.len());
        for node in &raw.nodes {
            if node.id.is_empty() {
                warn!("skipping node without id");
                continue;
            }
            if index_by_id.contains_key(node.id.as_str()) {
                warn!(id = %node.id, "duplicate node id, keeping first occurrence");
                continue;
            }
            index_by_id.insert(node.id.as_str(), kept.len());
            kept.push(node);
        }

        let mut edges = Vec::with_capacity(raw.edges.len());
        let mut dropped = 0usize;
        for edge in &raw.edges {
            match (
                index_by_id.get(edge.source.as_str()),
                index_by_id.get(edge.target.as_str()),
            ) {
                (Some(&source), Some(&target)) => edges.push(ContentEdge {
                    source,
                    target,
                    kind: edge.kind.clone().unwrap_or_else(|| "default".to_owned()),
                }),
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(dropped, "dropped edges with unknown endpoints");
        }

        let mut incident = vec![0u32; kept.len()];
        for edge in &edges {
            incident[edge.source] += 1;
            if edge.target != edge.source {
                incident[edge.target] += 1;
            }
        }

        let nodes = kept
            .into_iter()
            .enumerate()
            .map(|(index, node)| ContentNode {
                id: node.id.clone(),
                label: if node.label.is_empty() {
                    node.id.clone()
                } else {
                    node.label.clone()
                },
                kind: node.kind.clone(),
                url: resolve_url(node),
                weight: node
                    .degree
                    .filter(|&degree| degree > 0)
                    .or(node.weight.filter(|&weight| weight > 0))
                    .unwrap_or(incident[index]),
            })
            .collect();

        Self { nodes, edges }
    }

}

fn resolve_url(node: &RawNode) -> Option<String> {
    if let Some(url) = node.url.as_ref().filter(|url| !url.is_empty()) {
        return Some(url.clone());
    }
    if let Some(slug) = node.slug.as_ref().filter(|slug| !slug.is_empty()) {
        return Some(format!("/billets/{slug}"));
    }
    node.id
        .strip_prefix("billet:")
        .filter(|slug| !slug.is_empty())
        .map(|slug| format!("/billets/{slug}"))
}

/// What a node is, as far as the data is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeCategory {
    Hub,
    Content,
    PolygonVertex,
}

/// Where the layout puts a node. Exactly one per node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Hub,
    PolygonVertex { vertex_index: usize },
    ClusterMember { cluster_id: usize },
    Isolated { isolated_index: usize },
}

impl Placement {
    pub fn category(self) -> NodeCategory {
        match self {
            Self::Hub => NodeCategory::Hub,
            Self::PolygonVertex { .. } => NodeCategory::PolygonVertex,
            Self::ClusterMember { .. } | Self::Isolated { .. } => NodeCategory::Content,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: Option<String>,
    pub url: Option<String>,
    pub weight: u32,
    pub placement: Placement,
    /// Layout composer target; the live position belongs to the integrator.
    pub target: Vec2,
}

impl GraphNode {
    pub fn category(&self) -> NodeCategory {
        self.placement.category()
    }

    pub fn is_hub(&self) -> bool {
        matches!(self.placement, Placement::Hub)
    }

    pub fn is_polygon_vertex(&self) -> bool {
        matches!(self.placement, Placement::PolygonVertex { .. })
    }

    #[cfg(test)]
    pub fn cluster_id(&self) -> Option<usize> {
        match self.placement {
            Placement::ClusterMember { cluster_id } => Some(cluster_id),
            _ => None,
        }
    }

    pub fn is_isolated(&self) -> bool {
        matches!(self.placement, Placement::Isolated { .. })
    }

    #[cfg(test)]
    pub fn isolated_index(&self) -> Option<usize> {
        match self.placement {
            Placement::Isolated { isolated_index } => Some(isolated_index),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    Content(String),
    PolygonRing,
    ClusterAnchor,
    HubLink,
}

impl EdgeKind {
    pub fn is_layout(&self) -> bool {
        !matches!(self, Self::Content(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
    pub kind: EdgeKind,
}

/// Fully composed graph for one data load: content nodes, synthesized anchors
/// and hub, content plus layout edges.
#[derive(Clone, Debug)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub index_by_id: HashMap<String, usize>,
    pub neighbors: Vec<Vec<usize>>,
    pub hub_index: usize,
    pub cluster_count: usize,
    pub isolated_count: usize,
}

impl KnowledgeGraph {
    pub fn hub(&self) -> &GraphNode {
        &self.nodes[self.hub_index]
    }

    #[cfg(test)]
    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn placements(&self) -> Vec<Placement> {
        self.nodes.iter().map(|node| node.placement).collect()
    }

    pub fn content_edge_count(&self) -> usize {
        self.edges.iter().filter(|edge| !edge.kind.is_layout()).count()
    }

    /// The node plus every node one content or layout edge away.
    pub fn neighborhood(&self, index: usize) -> HashSet<usize> {
        let mut related = HashSet::new();
        let Some(adjacent) = self.neighbors.get(index) else {
            return related;
        };
        related.insert(index);
        related.extend(adjacent.iter().copied());
        related
    }

    pub(crate) fn build_neighbors(node_count: usize, edges: &[GraphEdge]) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); node_count];
        for edge in edges {
            if edge.source >= node_count || edge.target >= node_count {
                continue;
            }
            neighbors[edge.source].push(edge.target);
            if edge.source != edge.target {
                neighbors[edge.target].push(edge.source);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_links_alias_and_optional_fields() {
        let raw: RawGraph = serde_json::from_str(
            r##"{
                "nodes": [
                    {"id": "billet:feu", "label": "Feu", "type": "BILLET", "degree": 3},
                    {"id": "tag:eau", "label": "#eau"}
                ],
                "links": [{"source": "billet:feu", "target": "tag:eau", "type": "TAGGED"}]
            }"##,
        )
        .expect("valid payload");

        assert_eq!(raw.nodes.len(), 2);
        assert_eq!(raw.edges.len(), 1);
        assert_eq!(raw.nodes[0].kind.as_deref(), Some("BILLET"));
        assert_eq!(raw.edges[0].kind.as_deref(), Some("TAGGED"));
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let raw: RawGraph = serde_json::from_str("{}").expect("valid payload");
        assert_eq!(raw, RawGraph::default());
    }

    #[test]
    fn weight_prefers_degree_then_weight_then_incident_count() {
        let mut with_degree = RawNode::new("a", "A");
        with_degree.degree = Some(7);
        with_degree.weight = Some(2);
        let mut with_weight = RawNode::new("b", "B");
        with_weight.weight = Some(2);
        let derived = RawNode::new("c", "C");

        let raw = RawGraph {
            nodes: vec![with_degree, with_weight, derived],
            edges: vec![
                RawEdge::new("c", "a"),
                RawEdge::new("c", "b"),
                RawEdge::new("c", "c"),
            ],
        };
        let content = ContentGraph::from_raw(&raw);
        let weights = content.nodes.iter().map(|n| n.weight).collect::<Vec<_>>();
        assert_eq!(weights, vec![7, 2, 3]);
    }

    #[test]
    fn dangling_edges_and_duplicate_ids_are_dropped() {
        let raw = RawGraph {
            nodes: vec![RawNode::new("a", "A"), RawNode::new("a", "again")],
            edges: vec![RawEdge::new("a", "ghost")],
        };
        let content = ContentGraph::from_raw(&raw);
        assert_eq!(content.nodes.len(), 1);
        assert_eq!(content.nodes[0].label, "A");
        assert!(content.edges.is_empty());
    }

    #[test]
    fn url_resolution_order() {
        let mut explicit = RawNode::new("billet:x", "X");
        explicit.url = Some("https://example.org/x".to_owned());
        let mut slugged = RawNode::new("note-1", "Y");
        slugged.slug = Some("y".to_owned());
        let prefixed = RawNode::new("billet:z", "Z");
        let plain = RawNode::new("tag:w", "W");

        assert_eq!(resolve_url(&explicit).as_deref(), Some("https://example.org/x"));
        assert_eq!(resolve_url(&slugged).as_deref(), Some("/billets/y"));
        assert_eq!(resolve_url(&prefixed).as_deref(), Some("/billets/z"));
        assert_eq!(resolve_url(&plain), None);
    }

    #[test]
    fn empty_label_falls_back_to_id() {
        let raw = RawGraph {
            nodes: vec![RawNode::new("tag:sel", "")],
            edges: Vec::new(),
        };
        assert_eq!(ContentGraph::from_raw(&raw).nodes[0].label, "tag:sel");
    }
}
