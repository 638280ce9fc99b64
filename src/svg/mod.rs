//! One-shot static rendering of the content graph to an SVG document.
//!
//! Pipeline: golden-angle seed, force relaxation, label collision
//! resolution, label pruning, viewport normalization, markup emission. The
//! layout is always fully expanded and never touches the phase controller.

mod emit;
mod labels;
mod relax;
mod tiers;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::graph::{ContentGraph, RawGraph};
use crate::util::ELLIPSIS;

pub use tiers::{Tier, Tiers};

const LABEL_WIDTH_FACTOR: f32 = 0.65;
const LABEL_HEIGHT_FACTOR: f32 = 1.2;

#[derive(Clone, Debug, PartialEq)]
pub struct StaticConfig {
    pub width: f32,
    pub height: f32,
    /// Relaxation keeps every node at least this far from the border.
    pub margin: f32,
    pub relax_iterations: usize,
    pub label_iterations: usize,
    pub label_padding: f32,
    /// Share of the viewport the final bounding box fills.
    pub fill_ratio: f32,
    pub label_max_chars: usize,
    pub seed: u64,
    pub min_degree: u32,
    pub max_nodes: usize,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 300.0,
            margin: 40.0,
            relax_iterations: 200,
            label_iterations: 50,
            label_padding: 20.0,
            fill_ratio: 0.91,
            label_max_chars: 25,
            seed: 42,
            min_degree: 1,
            max_nodes: 30,
        }
    }
}

impl StaticConfig {
    pub(crate) fn clamp_x(&self, x: f32) -> f32 {
        let margin = self.margin.min(self.width * 0.5);
        x.clamp(margin, self.width - margin)
    }

    pub(crate) fn clamp_y(&self, y: f32) -> f32 {
        let margin = self.margin.min(self.height * 0.5);
        y.clamp(margin, self.height - margin)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StaticNode {
    pub id: String,
    pub label: String,
    pub url: Option<String>,
    pub degree: u32,
    pub tier: Tier,
    pub x: f32,
    pub y: f32,
    pub label_text: String,
    pub label_width: f32,
    pub label_height: f32,
    pub label_hidden: bool,
}

impl StaticNode {
    pub fn radius(&self) -> f32 {
        self.tier.radius()
    }

    pub fn font_size(&self) -> f32 {
        self.tier.font_size()
    }

    /// Tier 1 and 2 nodes whose label survived pruning.
    pub fn shows_label(&self) -> bool {
        self.tier.is_interactive() && !self.label_hidden
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticLayout {
    pub nodes: Vec<StaticNode>,
    /// Directed source/target pairs between kept nodes.
    pub edges: Vec<(usize, usize)>,
}

fn label_text(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }
    let mut text = label.chars().take(max_chars).collect::<String>();
    text.push(ELLIPSIS);
    text
}

/// Filters the content graph and builds the unpositioned node list.
fn select_nodes(content: &ContentGraph, config: &StaticConfig) -> StaticLayout {
    let tiers = Tiers::from_degrees(content.nodes.iter().map(|node| node.weight));
    debug!(primary = tiers.primary, secondary = tiers.secondary, "degree tiers");

    let mut remap = vec![None; content.nodes.len()];
    let mut nodes = Vec::new();
    for (index, node) in content.nodes.iter().enumerate() {
        if node.weight < config.min_degree || nodes.len() >= config.max_nodes {
            continue;
        }
        let tier = tiers.tier_of(node.weight);
        let text = label_text(&node.label, config.label_max_chars);
        let font_size = tier.font_size();
        remap[index] = Some(nodes.len());
        nodes.push(StaticNode {
            id: node.id.clone(),
            label: node.label.clone(),
            url: node.url.clone(),
            degree: node.weight,
            tier,
            x: config.width * 0.5,
            y: config.height * 0.5,
            label_width: text.chars().count() as f32 * font_size * LABEL_WIDTH_FACTOR,
            label_height: font_size * LABEL_HEIGHT_FACTOR,
            label_text: text,
            label_hidden: false,
        });
    }

    let edges = content
        .edges
        .iter()
        .filter_map(|edge| Some((remap[edge.source]?, remap[edge.target]?)))
        .filter(|(source, target)| source != target)
        .collect();

    StaticLayout { nodes, edges }
}

/// Positions every kept node and decides which labels stay visible.
pub fn layout(raw: &RawGraph, config: &StaticConfig) -> StaticLayout {
    let content = ContentGraph::from_raw(raw);
    let mut layout = select_nodes(&content, config);
    info!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        "static layout input"
    );
    if layout.nodes.is_empty() {
        return layout;
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    relax::seed_golden_angle(&mut layout.nodes, config, &mut rng);
    relax::relax(&mut layout.nodes, &layout.edges, config);

    let passes = labels::resolve_collisions(&mut layout.nodes, config);
    let mut hidden = labels::prune_labels(&mut layout.nodes);
    relax::fit_to_viewport(&mut layout.nodes, config);
    hidden += labels::prune_labels(&mut layout.nodes);
    info!(passes, hidden, "resolved label collisions");

    layout
}

/// Full pipeline: layout then markup.
pub fn render(raw: &RawGraph, config: &StaticConfig) -> String {
    let layout = layout(raw, config);
    emit::document(&layout, config)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::{RawEdge, RawNode, themed_sample};

    fn star(leaves: usize) -> RawGraph {
        let mut nodes = vec![RawNode::new("centre", "Centre")];
        let mut edges = Vec::new();
        for leaf in 0..leaves {
            let id = format!("leaf-{leaf}");
            nodes.push(RawNode::new(id.clone(), format!("Feuille numéro {leaf}")));
            edges.push(RawEdge::new("centre", id));
        }
        RawGraph { nodes, edges }
    }

    #[test]
    fn filters_apply_before_layout() {
        let config = StaticConfig {
            max_nodes: 4,
            ..StaticConfig::default()
        };
        let mut raw = star(6);
        raw.nodes.push(RawNode::new("alone", "Alone"));
        let layout = layout(&raw, &config);

        assert_eq!(layout.nodes.len(), 4);
        assert!(layout.nodes.iter().all(|node| node.degree >= 1));
        assert_eq!(layout.edges.len(), 3);
        assert_eq!(layout.nodes[0].tier, Tier::Primary);
    }

    #[test]
    fn long_labels_are_cut_at_the_limit() {
        assert_eq!(label_text("Rubedo : l'oeuvre au rouge", 25), "Rubedo : l'oeuvre au roug…");
        assert_eq!(label_text("Citrinitas", 25), "Citrinitas");
    }

    #[test]
    fn positions_stay_finite_and_inside_the_viewport() {
        let config = StaticConfig::default();
        let layout = layout(&themed_sample(), &config);
        assert!(!layout.nodes.is_empty());
        for node in &layout.nodes {
            assert!(node.x.is_finite() && node.y.is_finite());
            assert!((0.0..=config.width).contains(&node.x), "{} x={}", node.id, node.x);
            assert!((0.0..=config.height).contains(&node.y), "{} y={}", node.id, node.y);
        }
    }

    #[test]
    fn same_seed_gives_the_same_hidden_labels() {
        let config = StaticConfig::default();
        let raw = star(24);
        let hidden = |layout: &StaticLayout| {
            layout
                .nodes
                .iter()
                .filter(|node| node.label_hidden)
                .map(|node| node.id.clone())
                .collect::<Vec<_>>()
        };
        let first = layout(&raw, &config);
        let second = layout(&raw, &config);
        assert_eq!(hidden(&first), hidden(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_renders_an_empty_image() {
        let svg = render(&RawGraph::default(), &StaticConfig::default());
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("<circle"));
        assert!(!svg.contains("<line"));
    }
}
