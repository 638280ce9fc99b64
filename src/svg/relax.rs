use std::f32::consts::PI;

use rand::Rng;
use rand::rngs::StdRng;

use super::{StaticConfig, StaticNode};

const SEED_JITTER: f32 = 0.15;
const REPULSION: f32 = 1000.0;
const ATTRACTION: f32 = 0.012;
const GRAVITY: f32 = 0.02;

/// Spreads nodes on a golden-angle spiral inside the viewport ellipse, with a
/// small seeded radial jitter.
pub(super) fn seed_golden_angle(nodes: &mut [StaticNode], config: &StaticConfig, rng: &mut StdRng) {
    let count = nodes.len();
    if count == 0 {
        return;
    }
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let centre_x = config.width * 0.5;
    let centre_y = config.height * 0.5;
    let radius_x = ((config.width - 2.0 * config.margin) / 2.5).max(0.0);
    let radius_y = ((config.height - 2.0 * config.margin) / 3.0).max(0.0);

    for (index, node) in nodes.iter_mut().enumerate() {
        let angle = index as f32 * golden_angle;
        let spread = (index as f32 / count as f32).sqrt();
        let jitter_x = 1.0 + (rng.r#gen::<f32>() - 0.5) * SEED_JITTER;
        let jitter_y = 1.0 + (rng.r#gen::<f32>() - 0.5) * SEED_JITTER;
        node.x = config.clamp_x(centre_x + angle.cos() * radius_x * spread * jitter_x);
        node.y = config.clamp_y(centre_y + angle.sin() * radius_y * spread * jitter_y);
    }
}

/// Pairwise inverse-square repulsion, edge springs and a weak pull to the
/// centre, all cooled linearly to zero. Horizontal motion is favoured to
/// suit the wide viewport.
pub(super) fn relax(nodes: &mut [StaticNode], edges: &[(usize, usize)], config: &StaticConfig) {
    let iterations = config.relax_iterations;
    let centre_x = config.width * 0.5;
    let centre_y = config.height * 0.5;

    for iteration in 0..iterations {
        let cooling = 1.0 - iteration as f32 / iterations as f32;

        for a in 0..nodes.len() {
            for b in (a + 1)..nodes.len() {
                let dx = nodes[b].x - nodes[a].x;
                let dy = nodes[b].y - nodes[a].y;
                let distance = non_zero((dx * dx + dy * dy).sqrt());
                let repulsion = REPULSION / (distance * distance) * cooling;
                let fx = dx / distance * repulsion;
                let fy = dy / distance * repulsion * 0.7;
                nodes[a].x -= fx;
                nodes[a].y -= fy;
                nodes[b].x += fx;
                nodes[b].y += fy;
            }
        }

        for &(source, target) in edges {
            if source >= nodes.len() || target >= nodes.len() {
                continue;
            }
            let dx = nodes[target].x - nodes[source].x;
            let dy = nodes[target].y - nodes[source].y;
            let distance = non_zero((dx * dx + dy * dy).sqrt());
            let attraction = distance * ATTRACTION * cooling;
            let fx = dx / distance * attraction;
            let fy = dy / distance * attraction * 0.8;
            nodes[source].x += fx;
            nodes[source].y += fy;
            nodes[target].x -= fx;
            nodes[target].y -= fy;
        }

        for node in nodes.iter_mut() {
            let dx = centre_x - node.x;
            let dy = centre_y - node.y;
            let distance = non_zero((dx * dx + dy * dy).sqrt());
            let gravity = GRAVITY * cooling;
            node.x += dx / distance * gravity * 0.6;
            node.y += dy / distance * gravity;
        }

        for node in nodes.iter_mut() {
            node.x = config.clamp_x(node.x);
            node.y = config.clamp_y(node.y);
        }
    }
}

/// Scales the node cloud so its bounding box fills `fill_ratio` of the
/// viewport, then centres it.
pub(super) fn fit_to_viewport(nodes: &mut [StaticNode], config: &StaticConfig) {
    let Some((min_x, max_x, min_y, max_y)) = bounds(nodes) else {
        return;
    };
    let span_x = max_x - min_x;
    let span_y = max_y - min_y;
    let target_x = config.width * config.fill_ratio;
    let target_y = config.height * config.fill_ratio;

    let scale_x = (span_x > f32::EPSILON).then(|| target_x / span_x);
    let scale_y = (span_y > f32::EPSILON).then(|| target_y / span_y);
    let scale = match (scale_x, scale_y) {
        (Some(x), Some(y)) => x.min(y),
        (Some(x), None) => x,
        (None, Some(y)) => y,
        (None, None) => 1.0,
    };

    let source_x = (min_x + max_x) * 0.5;
    let source_y = (min_y + max_y) * 0.5;
    let centre_x = config.width * 0.5;
    let centre_y = config.height * 0.5;
    for node in nodes.iter_mut() {
        node.x = centre_x + (node.x - source_x) * scale;
        node.y = centre_y + (node.y - source_y) * scale;
    }
}

fn bounds(nodes: &[StaticNode]) -> Option<(f32, f32, f32, f32)> {
    let mut iter = nodes.iter().filter(|node| node.x.is_finite() && node.y.is_finite());
    let first = iter.next()?;
    Some(iter.fold(
        (first.x, first.x, first.y, first.y),
        |(min_x, max_x, min_y, max_y), node| {
            (min_x.min(node.x), max_x.max(node.x), min_y.min(node.y), max_y.max(node.y))
        },
    ))
}

fn non_zero(distance: f32) -> f32 {
    if distance > f32::EPSILON { distance } else { 1.0 }
}
