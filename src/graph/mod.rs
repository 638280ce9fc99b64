mod cluster;
mod layout;
mod model;
mod source;

pub use cluster::detect_clusters;
pub use layout::{LayoutConfig, compose, isolated_ring_target, polygon_anchor};
pub use model::{
    ContentGraph, EdgeKind, GraphNode, KnowledgeGraph, NodeCategory, Placement, RawGraph,
};
pub use source::{GraphSource, themed_sample};

#[cfg(test)]
pub use model::{RawEdge, RawNode};

/// Runs cluster detection once and composes the layout for a fresh data load.
pub fn build_knowledge_graph(raw: &RawGraph, config: &LayoutConfig) -> KnowledgeGraph {
    let content = ContentGraph::from_raw(raw);
    let partition = detect_clusters(&content);
    compose(&content, &partition, config)
}
