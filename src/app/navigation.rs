use tracing::{debug, info};

use crate::graph::{GraphNode, NodeCategory};

/// Receives the full node record when a non-hub node is activated.
pub trait NavigationSink {
    fn open(&mut self, node: &GraphNode);
}

/// What a primary click on a node means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum ClickAction {
    ToggleBloom,
    Navigate,
    Nothing,
}

pub(in crate::app) fn classify_click(node: &GraphNode) -> ClickAction {
    match node.category() {
        NodeCategory::Hub => ClickAction::ToggleBloom,
        NodeCategory::PolygonVertex => ClickAction::Nothing,
        NodeCategory::Content => ClickAction::Navigate,
    }
}

/// Default sink: remembers the opened node for the details panel and queues
/// its hyperlink for the browser.
#[derive(Debug, Default)]
pub(in crate::app) struct PanelNavigator {
    base_url: Option<String>,
    selected: Option<GraphNode>,
    pending_url: Option<String>,
}

impl PanelNavigator {
    pub(in crate::app) fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.filter(|url| !url.trim().is_empty()),
            ..Self::default()
        }
    }

    pub(in crate::app) fn selected(&self) -> Option<&GraphNode> {
        self.selected.as_ref()
    }

    pub(in crate::app) fn clear(&mut self) {
        self.selected = None;
        self.pending_url = None;
    }

    pub(in crate::app) fn take_pending_url(&mut self) -> Option<String> {
        self.pending_url.take()
    }

    /// Browser-openable form of a node hyperlink, if there is one.
    pub(in crate::app) fn resolve(&self, url: &str) -> Option<String> {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            return Some(url.to_owned());
        }
        let base = self.base_url.as_deref()?;
        if url.starts_with('/') {
            Some(format!("{}{url}", base.trim_end_matches('/')))
        } else {
            None
        }
    }
}

impl NavigationSink for PanelNavigator {
    fn open(&mut self, node: &GraphNode) {
        info!(id = %node.id, label = %node.label, "opened node");
        self.pending_url = node.url.as_deref().and_then(|url| self.resolve(url));
        if node.url.is_some() && self.pending_url.is_none() {
            debug!(id = %node.id, "node link is relative and no base URL is set");
        }
        self.selected = Some(node.clone());
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::Placement;

    fn node(placement: Placement, url: Option<&str>) -> GraphNode {
        GraphNode {
            id: "billet:albedo".to_owned(),
            label: "Albedo".to_owned(),
            kind: Some("BILLET".to_owned()),
            url: url.map(str::to_owned),
            weight: 2,
            placement,
            target: Vec2::ZERO,
        }
    }

    #[test]
    fn hub_toggles_and_vertices_are_inert() {
        assert_eq!(classify_click(&node(Placement::Hub, None)), ClickAction::ToggleBloom);
        assert_eq!(
            classify_click(&node(Placement::PolygonVertex { vertex_index: 0 }, None)),
            ClickAction::Nothing
        );
        assert_eq!(
            classify_click(&node(Placement::Isolated { isolated_index: 2 }, None)),
            ClickAction::Navigate
        );
    }

    #[test]
    fn relative_links_need_a_base_url() {
        let mut navigator = PanelNavigator::new(None);
        navigator.open(&node(Placement::ClusterMember { cluster_id: 0 }, Some("/billets/albedo")));
        assert_eq!(navigator.selected().map(|node| node.id.as_str()), Some("billet:albedo"));
        assert_eq!(navigator.take_pending_url(), None);

        let mut navigator = PanelNavigator::new(Some("https://example.org/".to_owned()));
        navigator.open(&node(Placement::ClusterMember { cluster_id: 0 }, Some("/billets/albedo")));
        assert_eq!(
            navigator.take_pending_url().as_deref(),
            Some("https://example.org/billets/albedo")
        );
        assert_eq!(navigator.take_pending_url(), None);
    }

    #[test]
    fn absolute_links_open_directly() {
        let mut navigator = PanelNavigator::new(None);
        navigator.open(&node(Placement::Isolated { isolated_index: 0 }, Some("https://example.org/a")));
        assert_eq!(navigator.take_pending_url().as_deref(), Some("https://example.org/a"));
        assert_eq!(navigator.resolve("mailto:x@y"), None);

        navigator.clear();
        assert!(navigator.selected().is_none());
    }
}
