use super::{StaticConfig, StaticNode};

const LABEL_GAP: f32 = 4.0;

/// Approximate label rectangle, drawn centred under the node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct LabelBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LabelBox {
    pub(super) fn of(node: &StaticNode) -> Self {
        Self {
            x: node.x - node.label_width * 0.5,
            y: node.y + node.radius() + LABEL_GAP,
            width: node.label_width,
            height: node.label_height,
        }
    }

    fn centre(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Overlap extent along each axis, zero when apart.
    pub(super) fn overlap(&self, other: &Self) -> (f32, f32) {
        let x = ((self.x + self.width).min(other.x + other.width) - self.x.max(other.x)).max(0.0);
        let y = ((self.y + self.height).min(other.y + other.height) - self.y.max(other.y)).max(0.0);
        (x, y)
    }

    pub(super) fn overlaps(&self, other: &Self) -> bool {
        let (x, y) = self.overlap(other);
        x > 0.0 && y > 0.0
    }
}

/// Pushes overlapping label pairs apart, half the push to each node, until a
/// full pass is clean or the iteration cap is hit. Returns the passes run.
pub(super) fn resolve_collisions(nodes: &mut [StaticNode], config: &StaticConfig) -> usize {
    for pass in 0..config.label_iterations {
        let mut collided = false;

        for a in 0..nodes.len() {
            for b in (a + 1)..nodes.len() {
                let box_a = LabelBox::of(&nodes[a]);
                let box_b = LabelBox::of(&nodes[b]);
                let (overlap_x, overlap_y) = box_a.overlap(&box_b);
                if overlap_x <= 0.0 || overlap_y <= 0.0 {
                    continue;
                }
                collided = true;

                let (ax, ay) = box_a.centre();
                let (bx, by) = box_b.centre();
                let (mut dx, mut dy) = (bx - ax, by - ay);
                let mut distance = (dx * dx + dy * dy).sqrt();
                if distance <= f32::EPSILON {
                    // Stacked labels: split them sideways, lower index to the left.
                    (dx, dy, distance) = (1.0, 0.0, 1.0);
                }

                let push = (overlap_x.max(overlap_y) + config.label_padding) * 0.5;
                let fx = dx / distance * push * 0.5;
                let fy = dy / distance * push * 0.5;

                nodes[a].x = config.clamp_x(nodes[a].x - fx);
                nodes[a].y = config.clamp_y(nodes[a].y - fy);
                nodes[b].x = config.clamp_x(nodes[b].x + fx);
                nodes[b].y = config.clamp_y(nodes[b].y + fy);
            }
        }

        if !collided {
            return pass + 1;
        }
    }
    config.label_iterations
}

/// Hides every label that still overlaps a label of a node with a higher
/// degree (lower index on ties). Returns how many were newly hidden.
pub(super) fn prune_labels(nodes: &mut [StaticNode]) -> usize {
    let mut order = (0..nodes.len())
        .filter(|&index| nodes[index].shows_label())
        .collect::<Vec<_>>();
    order.sort_by(|&a, &b| nodes[b].degree.cmp(&nodes[a].degree).then(a.cmp(&b)));

    let mut kept: Vec<LabelBox> = Vec::with_capacity(order.len());
    let mut hidden = 0;
    for index in order {
        let label = LabelBox::of(&nodes[index]);
        if kept.iter().any(|other| other.overlaps(&label)) {
            nodes[index].label_hidden = true;
            hidden += 1;
        } else {
            kept.push(label);
        }
    }
    hidden
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::Tier;
    use super::*;

    fn node(id: &str, degree: u32, x: f32, y: f32) -> StaticNode {
        StaticNode {
            id: id.to_owned(),
            label: id.to_owned(),
            url: None,
            degree,
            tier: Tier::Secondary,
            x,
            y,
            label_text: id.to_owned(),
            label_width: 60.0,
            label_height: 12.0,
            label_hidden: false,
        }
    }

    fn any_visible_overlap(nodes: &[StaticNode]) -> bool {
        let shown = nodes.iter().filter(|node| node.shows_label()).collect::<Vec<_>>();
        shown.iter().enumerate().any(|(i, a)| {
            shown[i + 1..]
                .iter()
                .any(|b| LabelBox::of(a).overlaps(&LabelBox::of(b)))
        })
    }

    #[test]
    fn overlap_is_zero_for_separate_boxes() {
        let a = LabelBox { x: 0.0, y: 0.0, width: 10.0, height: 5.0 };
        let b = LabelBox { x: 10.0, y: 0.0, width: 10.0, height: 5.0 };
        assert!(!a.overlaps(&b));
        let c = LabelBox { x: 6.0, y: 3.0, width: 10.0, height: 5.0 };
        assert_eq!(a.overlap(&c), (4.0, 2.0));
    }

    #[test]
    fn close_labels_are_pushed_apart() {
        let config = StaticConfig::default();
        let mut nodes = vec![node("a", 3, 590.0, 150.0), node("b", 1, 610.0, 150.0)];
        let passes = resolve_collisions(&mut nodes, &config);
        assert!(passes < config.label_iterations);
        assert!(!LabelBox::of(&nodes[0]).overlaps(&LabelBox::of(&nodes[1])));
        assert!(nodes[0].x < nodes[1].x);
    }

    #[test]
    fn stacked_labels_still_separate() {
        let config = StaticConfig::default();
        let mut nodes = vec![node("a", 1, 600.0, 150.0), node("b", 1, 600.0, 150.0)];
        resolve_collisions(&mut nodes, &config);
        assert!(nodes[0].x < nodes[1].x);
    }

    #[test]
    fn pinned_against_the_border_the_lower_degree_label_hides() {
        let config = StaticConfig {
            label_iterations: 0,
            ..StaticConfig::default()
        };
        let mut nodes = vec![node("minor", 1, 40.0, 40.0), node("major", 5, 45.0, 40.0)];
        resolve_collisions(&mut nodes, &config);
        let hidden = prune_labels(&mut nodes);

        assert_eq!(hidden, 1);
        assert!(nodes[0].label_hidden);
        assert!(!nodes[1].label_hidden);
        assert!(!any_visible_overlap(&nodes));
    }

    #[test]
    fn degree_ties_keep_the_first_node() {
        let mut nodes = vec![node("first", 2, 100.0, 100.0), node("second", 2, 101.0, 100.0)];
        prune_labels(&mut nodes);
        assert!(!nodes[0].label_hidden);
        assert!(nodes[1].label_hidden);
    }

    #[test]
    fn minor_tier_never_competes_for_space() {
        let mut nodes = vec![node("label", 1, 100.0, 100.0), node("dot", 9, 100.0, 100.0)];
        nodes[1].tier = Tier::Minor;
        assert_eq!(prune_labels(&mut nodes), 0);
        assert!(!nodes[0].label_hidden);
    }
}
