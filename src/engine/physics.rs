//! Stock integrator forces: many-body charge, link springs, centering and
//! collision.

use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;
use super::simulation::{Body, Force};

const BARNES_HUT_THETA: f32 = 0.72;
const MIN_DISTANCE_SQ: f32 = 1.0;

/// Direction from `to` toward `from` used when two bodies sit on the same
/// spot. Antisymmetric in its arguments.
fn separation_fallback(from: usize, to: usize) -> Vec2 {
    let (low, high) = (from.min(to), from.max(to));
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * std::f32::consts::TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if from <= to { direction } else { -direction }
}

/// Pairwise attraction (positive strength) or repulsion (negative strength),
/// approximated with a Barnes-Hut quadtree.
pub struct ManyBody {
    strength: f32,
    positions: Vec<Vec2>,
}

impl ManyBody {
    pub fn new(strength: f32) -> Self {
        Self {
            strength,
            positions: Vec::new(),
        }
    }
}

fn accumulate_charge_for_body(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    scaled_strength: f32,
    impulse: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let delta = positions[other] - point;
            let distance_sq = delta.length_sq();
            if distance_sq <= f32::EPSILON {
                *impulse -= separation_fallback(index, other) * scaled_strength.abs();
                continue;
            }
            let distance_sq = if distance_sq < MIN_DISTANCE_SQ {
                (MIN_DISTANCE_SQ * distance_sq).sqrt()
            } else {
                distance_sq
            };
            *impulse += delta * (scaled_strength / distance_sq);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance_sq = delta.length_sq().max(MIN_DISTANCE_SQ);
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance_sq.sqrt()) < BARNES_HUT_THETA
        && node.mass > 1.0;

    if can_approximate {
        *impulse += delta * (scaled_strength * node.mass / distance_sq);
        return;
    }

    for child in node.children() {
        accumulate_charge_for_body(child, index, positions, scaled_strength, impulse);
    }
}

impl Force for ManyBody {
    fn apply(&mut self, bodies: &mut [Body], alpha: f32) {
        if bodies.len() < 2 || self.strength == 0.0 {
            return;
        }

        self.positions.clear();
        self.positions.extend(bodies.iter().map(|body| body.position));
        let Some(tree) = QuadNode::build(&self.positions) else {
            return;
        };

        let scaled_strength = self.strength * alpha;
        for (index, body) in bodies.iter_mut().enumerate() {
            let mut impulse = Vec2::ZERO;
            accumulate_charge_for_body(&tree, index, &self.positions, scaled_strength, &mut impulse);
            body.velocity += impulse;
        }
    }
}

/// Springs along edges with a shared rest length.
pub struct Links {
    links: Vec<(usize, usize)>,
    distance: f32,
    strengths: Vec<f32>,
    biases: Vec<f32>,
}

impl Links {
    /// Springs between `(source, target)` pairs. Self-loops and out-of-range
    /// pairs are ignored.
    pub fn new(node_count: usize, pairs: impl IntoIterator<Item = (usize, usize)>, distance: f32) -> Self {
        let links = pairs
            .into_iter()
            .filter(|&(source, target)| source != target && source < node_count && target < node_count)
            .collect::<Vec<_>>();

        let mut degree = vec![0u32; node_count];
        for &(source, target) in &links {
            degree[source] += 1;
            degree[target] += 1;
        }

        let strengths = links
            .iter()
            .map(|&(source, target)| 1.0 / degree[source].min(degree[target]).max(1) as f32)
            .collect();
        let biases = links
            .iter()
            .map(|&(source, target)| {
                degree[source] as f32 / (degree[source] + degree[target]).max(1) as f32
            })
            .collect();

        Self {
            links,
            distance: distance.max(0.0),
            strengths,
            biases,
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Force for Links {
    fn apply(&mut self, bodies: &mut [Body], alpha: f32) {
        for (link, (&strength, &bias)) in self
            .links
            .iter()
            .zip(self.strengths.iter().zip(&self.biases))
        {
            let &(source, target) = link;
            if source >= bodies.len() || target >= bodies.len() {
                continue;
            }

            let source_next = bodies[source].position + bodies[source].velocity;
            let target_next = bodies[target].position + bodies[target].velocity;
            let mut delta = target_next - source_next;
            if delta.length_sq() <= f32::EPSILON {
                delta = separation_fallback(source, target) * 1e-3;
            }
            let distance = delta.length();
            let correction = delta * ((distance - self.distance) / distance * alpha * strength);

            bodies[target].velocity -= correction * bias;
            bodies[source].velocity += correction * (1.0 - bias);
        }
    }
}

/// Shifts the free bodies so their mean drifts toward `target`.
pub struct Center {
    target: Vec2,
    strength: f32,
}

impl Center {
    pub fn new(target: Vec2, strength: f32) -> Self {
        Self { target, strength }
    }
}

impl Force for Center {
    fn apply(&mut self, bodies: &mut [Body], _alpha: f32) {
        let free = bodies.iter().filter(|body| body.is_free()).count();
        if free == 0 || self.strength == 0.0 {
            return;
        }

        let mean = bodies
            .iter()
            .filter(|body| body.is_free())
            .fold(Vec2::ZERO, |sum, body| sum + body.position)
            / free as f32;
        let shift = (mean - self.target) * self.strength;
        for body in bodies.iter_mut().filter(|body| body.is_free()) {
            body.position -= shift;
        }
    }
}

/// Keeps bodies at least `2 * radius` apart.
pub struct Collide {
    radius: f32,
    strength: f32,
    predicted: Vec<Vec2>,
    corrections: Vec<Vec2>,
}

impl Collide {
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            strength: 1.0,
            predicted: Vec::new(),
            corrections: Vec::new(),
        }
    }
}

#[derive(Clone, Copy)]
struct CollisionParams {
    min_distance: f32,
    strength: f32,
}

fn resolve_pair(from: usize, to: usize, predicted: &[Vec2], params: CollisionParams, corrections: &mut [Vec2]) {
    let delta = predicted[from] - predicted[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= params.min_distance * params.min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        separation_fallback(from, to)
    };
    let push = direction * (params.min_distance - distance) * params.strength * 0.5;
    corrections[from] += push;
    corrections[to] -= push;
}

fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    params: CollisionParams,
    corrections: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.min_distance * params.min_distance {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_pair(from, to, predicted, params, corrections);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_pair(from, to, predicted, params, corrections);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (first, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, predicted, params, corrections);
            for child_b in &children[first + 1..] {
                accumulate_collision_pairs(child_a, child_b, false, predicted, params, corrections);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(child, node_b, false, predicted, params, corrections);
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(node_a, child, false, predicted, params, corrections);
        }
    }
}

impl Force for Collide {
    fn apply(&mut self, bodies: &mut [Body], _alpha: f32) {
        if bodies.len() < 2 || self.radius <= 0.0 {
            return;
        }

        self.predicted.clear();
        self.predicted
            .extend(bodies.iter().map(|body| body.position + body.velocity));
        self.corrections.clear();
        self.corrections.resize(bodies.len(), Vec2::ZERO);

        let Some(tree) = QuadNode::build(&self.predicted) else {
            return;
        };
        let params = CollisionParams {
            min_distance: self.radius * 2.0,
            strength: self.strength,
        };
        accumulate_collision_pairs(&tree, &tree, true, &self.predicted, params, &mut self.corrections);

        for (body, correction) in bodies.iter_mut().zip(&self.corrections) {
            body.velocity += *correction;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::engine::simulation::{ForceIntegrator, Simulation};

    fn bodies(points: &[Vec2]) -> Vec<Body> {
        points.iter().copied().map(Body::at).collect()
    }

    #[test]
    fn negative_charge_pushes_bodies_apart() {
        let mut set = bodies(&[vec2(-5.0, 0.0), vec2(5.0, 0.0)]);
        ManyBody::new(-120.0).apply(&mut set, 1.0);
        assert!(set[0].velocity.x < 0.0);
        assert!(set[1].velocity.x > 0.0);
        assert!((set[0].velocity.x + set[1].velocity.x).abs() < 1e-4);
    }

    #[test]
    fn charge_separates_coincident_bodies() {
        let mut set = bodies(&[Vec2::ZERO, Vec2::ZERO]);
        ManyBody::new(-30.0).apply(&mut set, 1.0);
        assert!(set[0].velocity.length() > 0.0);
        assert!((set[0].velocity + set[1].velocity).length() < 1e-4);
    }

    #[test]
    fn far_field_approximation_matches_direct_sum() {
        let mut points = (0..60)
            .map(|i| vec2(400.0 + (i % 8) as f32 * 3.0, (i / 8) as f32 * 3.0))
            .collect::<Vec<_>>();
        points.push(Vec2::ZERO);
        let probe = points.len() - 1;

        let mut set = bodies(&points);
        ManyBody::new(-10.0).apply(&mut set, 1.0);

        let exact = points[..probe].iter().fold(Vec2::ZERO, |sum, point| {
            let delta = *point - points[probe];
            sum + delta * (-10.0 / delta.length_sq())
        });
        let approx = set[probe].velocity;
        assert!((approx - exact).length() / exact.length() < 0.05, "{approx:?} vs {exact:?}");
    }

    #[test]
    fn links_pull_toward_rest_length() {
        let mut simulation = Simulation::new([vec2(-200.0, 0.0), vec2(200.0, 0.0)]);
        simulation.register_force("link", Box::new(Links::new(2, [(0, 1)], 50.0)));
        simulation.warm_up(300);

        let distance = (simulation.position(0).expect("a") - simulation.position(1).expect("b")).length();
        assert!((distance - 50.0).abs() < 1.0, "distance {distance}");
    }

    #[test]
    fn links_skip_self_loops_and_dangling_pairs() {
        let links = Links::new(3, [(0, 0), (0, 5), (1, 2)], 30.0);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn center_moves_mean_toward_target() {
        let mut set = bodies(&[vec2(10.0, 10.0), vec2(30.0, 10.0)]);
        Center::new(Vec2::ZERO, 1.0).apply(&mut set, 1.0);
        let mean = (set[0].position + set[1].position) / 2.0;
        assert!(mean.length() < 1e-4);
        assert_eq!(set[1].position - set[0].position, vec2(20.0, 0.0));
    }

    #[test]
    fn collide_resolves_overlap() {
        let mut simulation = Simulation::new([vec2(-1.0, 0.0), vec2(1.0, 0.0), vec2(0.0, 1.0)]);
        simulation.register_force("collide", Box::new(Collide::new(15.0)));
        simulation.warm_up(200);

        let positions = simulation.positions();
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!((*a - *b).length() > 25.0, "{a:?} {b:?}");
            }
        }
    }
}
