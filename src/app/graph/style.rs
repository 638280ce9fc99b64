//! Size, hit-area and label rules for the interactive view. All lengths are in
//! world units unless noted.

use crate::graph::{GraphNode, Placement};

pub(in crate::app) const HUB_RADIUS: f32 = 25.0;
pub(in crate::app) const HUB_RAY_COUNT: usize = 12;
pub(in crate::app) const VERTEX_RADIUS: f32 = 4.0;
pub(in crate::app) const HALO_EXTRA: f32 = 6.0;
const ISOLATED_RADIUS: f32 = 4.0;
const HIT_PADDING: f32 = 8.0;

pub(in crate::app) fn node_radius(node: &GraphNode) -> f32 {
    match node.placement {
        Placement::Hub => HUB_RADIUS,
        Placement::PolygonVertex { .. } => VERTEX_RADIUS,
        Placement::Isolated { .. } => ISOLATED_RADIUS,
        Placement::ClusterMember { .. } => 5.0 + (node.weight as f32 * 1.5).min(12.0),
    }
}

/// Pointer-sensitive radius, wider than the drawn disc so small nodes stay
/// easy to grab.
pub(in crate::app) fn hit_radius(node: &GraphNode) -> f32 {
    match node.placement {
        Placement::Hub => HUB_RADIUS + 4.0,
        _ => 5.0 + node.weight.clamp(1, 12) as f32 + HIT_PADDING,
    }
}

/// Outer end of sun ray `index` at `time_secs`.
pub(in crate::app) fn ray_length(index: usize, time_secs: f64) -> f32 {
    let phase = time_secs * 2.0 + index as f64;
    HUB_RADIUS + 15.0 + (phase.sin() as f32) * 5.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct LabelEmphasis {
    pub hovered: bool,
    pub highlighted: bool,
}

pub(in crate::app) fn label_visible(emphasis: LabelEmphasis, weight: u32, zoom: f32) -> bool {
    emphasis.hovered
        || emphasis.highlighted
        || zoom > 2.0
        || (weight > 3 && zoom > 1.0)
        || (weight > 5 && zoom > 0.5)
}

/// World-space font size; keeps on-screen text readable across zoom levels.
pub(in crate::app) fn label_font_size(emphasis: LabelEmphasis, zoom: f32) -> f32 {
    let base = if emphasis.hovered {
        13.0
    } else if emphasis.highlighted {
        11.0
    } else {
        10.0
    };
    (base / zoom.max(0.01).sqrt()).clamp(6.0, 20.0)
}

pub(in crate::app) fn label_max_chars(emphasis: LabelEmphasis, zoom: f32) -> usize {
    if emphasis.hovered {
        80
    } else if zoom > 1.5 {
        50
    } else if zoom > 0.8 {
        30
    } else {
        20
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;
    use pretty_assertions::assert_eq;

    use super::*;

    fn node(placement: Placement, weight: u32) -> GraphNode {
        GraphNode {
            id: "n".to_owned(),
            label: "N".to_owned(),
            kind: None,
            url: None,
            weight,
            placement,
            target: Vec2::ZERO,
        }
    }

    const PLAIN: LabelEmphasis = LabelEmphasis {
        hovered: false,
        highlighted: false,
    };
    const HOVERED: LabelEmphasis = LabelEmphasis {
        hovered: true,
        highlighted: false,
    };

    #[test]
    fn radius_grows_with_weight_and_caps() {
        let member = |weight| node_radius(&node(Placement::ClusterMember { cluster_id: 0 }, weight));
        assert_eq!(member(0), 5.0);
        assert_eq!(member(2), 8.0);
        assert_eq!(member(40), 17.0);
        assert_eq!(node_radius(&node(Placement::Isolated { isolated_index: 0 }, 9)), 4.0);
    }

    #[test]
    fn hit_area_is_wider_than_the_disc() {
        let isolated = node(Placement::Isolated { isolated_index: 0 }, 0);
        assert_eq!(hit_radius(&isolated), 14.0);
        assert!(hit_radius(&isolated) > node_radius(&isolated));
        let heavy = node(Placement::ClusterMember { cluster_id: 0 }, 30);
        assert_eq!(hit_radius(&heavy), 25.0);
    }

    #[test]
    fn label_rules_follow_zoom_and_weight() {
        assert!(label_visible(HOVERED, 0, 0.1));
        assert!(!label_visible(PLAIN, 0, 1.5));
        assert!(label_visible(PLAIN, 0, 2.5));
        assert!(label_visible(PLAIN, 4, 1.2));
        assert!(!label_visible(PLAIN, 4, 0.9));
        assert!(label_visible(PLAIN, 6, 0.6));
    }

    #[test]
    fn font_size_is_clamped() {
        assert_eq!(label_font_size(PLAIN, 1.0), 10.0);
        assert_eq!(label_font_size(HOVERED, 0.01), 20.0);
        assert_eq!(label_font_size(PLAIN, 100.0), 6.0);
    }

    #[test]
    fn truncation_length_depends_on_focus() {
        assert_eq!(label_max_chars(HOVERED, 0.1), 80);
        assert_eq!(label_max_chars(PLAIN, 2.0), 50);
        assert_eq!(label_max_chars(PLAIN, 1.0), 30);
        assert_eq!(label_max_chars(PLAIN, 0.5), 20);
    }

    #[test]
    fn rays_pulse_within_bounds() {
        for index in 0..HUB_RAY_COUNT {
            let length = ray_length(index, 3.7);
            assert!((35.0..=45.0).contains(&length));
        }
    }
}
