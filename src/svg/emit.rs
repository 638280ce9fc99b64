use std::collections::HashMap;

use crate::util::escape_xml;

use super::{StaticConfig, StaticLayout, StaticNode, Tier};

const COLOR_FOREGROUND: &str = "hsl(220, 15%, 20%)";
const COLOR_ACCENT: &str = "hsl(220, 90%, 55%)";
const COLOR_SUBTLE: &str = "hsl(220, 10%, 60%)";
const COLOR_BACKGROUND: &str = "hsl(220, 10%, 98%)";
const FONT_FAMILY: &str = "IBM Plex Serif, serif";

const DEFS: &str = r#"  <defs>
    <filter id="glow" x="-50%" y="-50%" width="200%" height="200%">
      <feGaussianBlur stdDeviation="4" result="coloredBlur"/>
      <feMerge>
        <feMergeNode in="coloredBlur"/>
        <feMergeNode in="SourceGraphic"/>
      </feMerge>
    </filter>
    <filter id="shadow" x="-20%" y="-20%" width="140%" height="140%">
      <feDropShadow dx="1" dy="1" stdDeviation="2" flood-opacity="0.15"/>
    </filter>
  </defs>
"#;

const STYLE: &str = r#"  <style>
    .node-group { transition: opacity 0.3s ease-in-out; cursor: pointer; }
    .graph-link { text-decoration: none; }
    svg:hover .node-group:not(:hover) { opacity: 0.7; }
    .node-group:hover .node-halo { opacity: 0.8 !important; transition: opacity 0.2s ease-in-out; }
    .node-group:hover .node-main { transform: scale(1.15); transform-origin: center; transition: transform 0.2s ease-in-out; }
    .node-label { pointer-events: none; transition: opacity 0.2s ease-in-out, font-weight 0.2s ease-in-out; }
    .node-group:hover .node-label-hover { opacity: 1 !important; }
    .node-group:hover .node-label-visible,
    .node-group:hover .node-label-hover { font-weight: 600; stroke-width: 4px; }
    .node-group-static { opacity: 0.8; }
    .node-group-static:hover { opacity: 0.9; }
    .tap-area { pointer-events: all; }
    circle, text { transition: all 0.2s ease-in-out; }
    @media (pointer: coarse) { .node-group:hover .node-main { transform: scale(1.3); } }
  </style>
"#;

fn tier_color(tier: Tier) -> &'static str {
    match tier {
        Tier::Primary => COLOR_ACCENT,
        Tier::Secondary => COLOR_FOREGROUND,
        Tier::Minor => COLOR_SUBTLE,
    }
}

/// One line per node pair; a pair linked both ways is marked bidirectional.
pub(super) fn merge_edges(edges: &[(usize, usize)]) -> Vec<(usize, usize, bool)> {
    let mut merged: Vec<(usize, usize, bool)> = Vec::new();
    let mut slot_by_pair: HashMap<(usize, usize), usize> = HashMap::new();
    for &(source, target) in edges {
        if let Some(&slot) = slot_by_pair.get(&(target, source)) {
            merged[slot].2 = true;
            continue;
        }
        if slot_by_pair.contains_key(&(source, target)) {
            continue;
        }
        slot_by_pair.insert((source, target), merged.len());
        merged.push((source, target, false));
    }
    merged
}

fn edge_line(source: &StaticNode, target: &StaticNode, bidirectional: bool) -> Option<String> {
    if source.tier == Tier::Minor && target.tier == Tier::Minor {
        return None;
    }
    let width = if bidirectional { 1.5 } else { 1.0 };
    let opacity = if source.tier == Tier::Primary || target.tier == Tier::Primary {
        0.8
    } else {
        0.4
    };
    Some(format!(
        r#"    <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{COLOR_SUBTLE}" stroke-width="{width}" opacity="{opacity}"/>"#,
        source.x, source.y, target.x, target.y
    ))
}

fn label_element(node: &StaticNode) -> Option<String> {
    let (class, extra) = if node.shows_label() {
        ("node-label node-label-visible", "")
    } else if node.tier.is_interactive() {
        ("node-label node-label-hover", r#" opacity="0""#)
    } else {
        return None;
    };
    let font_size = node.font_size();
    Some(format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="{font_size}" font-family="{FONT_FAMILY}" fill="{COLOR_FOREGROUND}" paint-order="stroke" stroke="{COLOR_BACKGROUND}" stroke-width="3px" class="{class}"{extra}>{}</text>"#,
        node.x,
        node.y + node.radius() + font_size + 6.0,
        escape_xml(&node.label_text)
    ))
}

fn node_group(node: &StaticNode) -> String {
    let color = tier_color(node.tier);
    let radius = node.radius();
    let id = escape_xml(&node.id);
    let circle = format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="{radius}" fill="{color}" filter="url(#shadow)" stroke="{COLOR_BACKGROUND}" stroke-width="1.5" class="node-main"/>"#,
        node.x, node.y
    );
    let label = label_element(node).unwrap_or_default();

    if !node.tier.is_interactive() {
        return format!(
            r#"    <g class="node-group-static tier-3" data-id="{id}"><title>{}</title>{circle}{label}</g>"#,
            escape_xml(&node.label)
        );
    }

    let tap_area = format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="transparent" class="tap-area"/>"#,
        node.x,
        node.y,
        radius + 12.0
    );
    let halo = format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{color}" class="node-halo" opacity="0" filter="url(#glow)"/>"#,
        node.x,
        node.y,
        radius + 6.0
    );
    let group = format!(
        r#"<g class="node-group tier-{}" data-id="{id}" data-degree="{}"><title>{} ({} links)</title>{tap_area}{halo}{circle}{label}</g>"#,
        node.tier.number(),
        node.degree,
        escape_xml(&node.label),
        node.degree
    );
    match &node.url {
        Some(url) => format!(
            r#"    <a href="{}" class="graph-link">{group}</a>"#,
            escape_xml(url)
        ),
        None => format!("    {group}"),
    }
}

/// Serialises a finished layout.
pub(super) fn document(layout: &StaticLayout, config: &StaticConfig) -> String {
    let mut svg = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg viewBox=\"0 0 {} {}\" xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" style=\"max-width: 100%; height: auto; background-color: transparent;\">\n",
        config.width, config.height
    );
    if layout.nodes.is_empty() {
        svg.push_str("</svg>\n");
        return svg;
    }

    svg.push_str(DEFS);
    svg.push_str(STYLE);

    svg.push_str("  <g class=\"edges\">\n");
    for (source, target, bidirectional) in merge_edges(&layout.edges) {
        let (Some(from), Some(to)) = (layout.nodes.get(source), layout.nodes.get(target)) else {
            continue;
        };
        if let Some(line) = edge_line(from, to, bidirectional) {
            svg.push_str(&line);
            svg.push('\n');
        }
    }
    svg.push_str("  </g>\n");

    svg.push_str("  <g class=\"nodes\">\n");
    for node in &layout.nodes {
        svg.push_str(&node_group(node));
        svg.push('\n');
    }
    svg.push_str("  </g>\n</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn node(id: &str, tier: Tier, url: Option<&str>) -> StaticNode {
        StaticNode {
            id: id.to_owned(),
            label: format!("{id} & co"),
            url: url.map(str::to_owned),
            degree: 2,
            tier,
            x: 100.0,
            y: 50.0,
            label_text: format!("{id} & co"),
            label_width: 40.0,
            label_height: 12.0,
            label_hidden: false,
        }
    }

    #[test]
    fn reverse_edges_merge_into_one_bidirectional_line() {
        let merged = merge_edges(&[(0, 1), (1, 0), (1, 2), (1, 2)]);
        assert_eq!(merged, vec![(0, 1, true), (1, 2, false)]);
    }

    #[test]
    fn minor_to_minor_edges_are_dropped() {
        let a = node("a", Tier::Minor, None);
        let b = node("b", Tier::Minor, None);
        let c = node("c", Tier::Primary, None);
        assert_eq!(edge_line(&a, &b, false), None);
        let line = edge_line(&a, &c, true).expect("kept");
        assert!(line.contains(r#"stroke-width="1.5""#));
        assert!(line.contains(r#"opacity="0.8""#));
    }

    #[test]
    fn interactive_tiers_link_out() {
        let primary = node_group(&node("billet:a", Tier::Primary, Some("/billets/a")));
        assert!(primary.contains(r#"<a href="/billets/a""#));
        assert!(primary.contains("node-label-visible"));
        assert!(primary.contains("a &amp; co"));

        let minor = node_group(&node("billet:m", Tier::Minor, Some("/billets/m")));
        assert!(!minor.contains("<a "));
        assert!(!minor.contains("<text"));
        assert!(minor.contains("node-group-static"));
    }

    #[test]
    fn pruned_labels_become_hover_labels() {
        let mut hidden = node("billet:h", Tier::Secondary, None);
        hidden.label_hidden = true;
        let group = node_group(&hidden);
        assert!(group.contains(r#"class="node-label node-label-hover" opacity="0""#));
        assert!(!group.contains("node-label-visible"));
    }

    #[test]
    fn document_has_style_edge_and_node_layers() {
        let layout = StaticLayout {
            nodes: vec![
                node("a", Tier::Primary, Some("/billets/a")),
                node("b", Tier::Secondary, None),
            ],
            edges: vec![(0, 1)],
        };
        let svg = document(&layout, &StaticConfig::default());
        let defs = svg.find("<defs>").expect("defs");
        let style = svg.find("<style>").expect("style");
        let edges = svg.find(r#"<g class="edges">"#).expect("edges");
        let nodes = svg.find(r#"<g class="nodes">"#).expect("nodes");
        assert!(defs < style && style < edges && edges < nodes);
        assert!(svg.contains(r#"viewBox="0 0 1200 300""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
