use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::KnowledgeGraph;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// First node whose label contains `query`, ignoring case. Falls back to the
/// best fuzzy match when no label contains it literally.
pub(super) fn find_first_match(graph: &KnowledgeGraph, query: &str) -> Option<usize> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let searchable = || {
        graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_polygon_vertex() && !node.label.is_empty())
    };

    let needle = query.to_lowercase();
    if let Some((index, _)) = searchable().find(|(_, node)| node.label.to_lowercase().contains(&needle)) {
        return Some(index);
    }

    let matcher = SkimMatcherV2::default();
    searchable()
        .filter_map(|(index, node)| {
            fuzzy_match_score(&matcher, &node.label, query).map(|score| (index, score))
        })
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::{LayoutConfig, build_knowledge_graph, themed_sample};

    fn graph() -> KnowledgeGraph {
        build_knowledge_graph(&themed_sample(), &LayoutConfig::default())
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let graph = graph();
        let index = find_first_match(&graph, "ALBEDO").expect("match");
        assert_eq!(graph.nodes[index].id, "billet:albedo");
    }

    #[test]
    fn first_match_in_data_order_wins() {
        let graph = graph();
        let index = find_first_match(&graph, "le").expect("match");
        assert_eq!(graph.nodes[index].id, "billet:albedo");
    }

    #[test]
    fn fuzzy_fallback_finds_scattered_letters() {
        let graph = graph();
        let index = find_first_match(&graph, "slrpnk").expect("fuzzy match");
        assert_eq!(graph.nodes[index].id, "billet:solarpunk");
    }

    #[test]
    fn blank_or_unknown_query_matches_nothing() {
        let graph = graph();
        assert_eq!(find_first_match(&graph, "   "), None);
        assert_eq!(find_first_match(&graph, "zzzzqqq"), None);
    }
}
