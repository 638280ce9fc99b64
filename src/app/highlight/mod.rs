use std::collections::HashSet;

use crate::graph::KnowledgeGraph;

use super::graph::style::LabelEmphasis;

/// Hovered node plus its one-edge neighbourhood, content and layout edges alike.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(super) struct HighlightState {
    pub hovered: Option<usize>,
    pub related: HashSet<usize>,
}

impl HighlightState {
    pub(super) fn for_hover(graph: &KnowledgeGraph, hovered: Option<usize>) -> Self {
        match hovered {
            Some(index) if index < graph.nodes.len() => Self {
                hovered: Some(index),
                related: graph.neighborhood(index),
            },
            _ => Self::default(),
        }
    }

    pub(super) fn is_active(&self) -> bool {
        self.hovered.is_some()
    }

    pub(super) fn contains(&self, index: usize) -> bool {
        self.related.contains(&index)
    }

    pub(super) fn edge_highlighted(&self, source: usize, target: usize) -> bool {
        self.contains(source) && self.contains(target)
    }

    pub(super) fn emphasis(&self, index: usize) -> LabelEmphasis {
        LabelEmphasis {
            hovered: self.hovered == Some(index),
            highlighted: self.contains(index),
        }
    }
}
