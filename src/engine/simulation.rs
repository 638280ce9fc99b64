use eframe::egui::Vec2;
use tracing::{debug, trace};

const ALPHA_START: f32 = 1.0;
const ALPHA_MIN: f32 = 0.001;
const VELOCITY_DECAY: f32 = 0.4;

/// Point mass moved by the integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Position the body is held at, if any.
    pub fixed: Option<Vec2>,
    /// Locked bodies ignore `release`.
    pub locked: bool,
}

impl Body {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            fixed: None,
            locked: false,
        }
    }

    pub fn is_free(&self) -> bool {
        self.fixed.is_none()
    }
}

/// A named contribution to body velocities, scaled by the cooling factor.
pub trait Force {
    fn apply(&mut self, bodies: &mut [Body], alpha: f32);
}

/// What the interactive view needs from a force integrator.
pub trait ForceIntegrator {
    /// Adds a force, replacing any force already registered under `name`.
    fn register_force(&mut self, name: &str, force: Box<dyn Force>);
    fn remove_force(&mut self, name: &str) -> bool;
    fn reheat(&mut self);
    /// Advances one step. Returns false once the system has cooled down.
    fn tick(&mut self) -> bool;
    fn position(&self, index: usize) -> Option<Vec2>;
    fn positions(&self) -> Vec<Vec2>;
    fn pin(&mut self, index: usize, at: Vec2);
    fn release(&mut self, index: usize);
    fn is_pinned(&self, index: usize) -> bool;
}

/// Velocity integrator cooled by an exponentially decaying alpha.
pub struct Simulation {
    bodies: Vec<Body>,
    forces: Vec<(String, Box<dyn Force>)>,
    alpha: f32,
    alpha_min: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,
}

impl Simulation {
    pub fn new(positions: impl IntoIterator<Item = Vec2>) -> Self {
        let alpha_min = ALPHA_MIN;
        Self {
            bodies: positions.into_iter().map(Body::at).collect(),
            forces: Vec::new(),
            alpha: ALPHA_START,
            alpha_min,
            // Reaches alpha_min after ~300 ticks.
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: VELOCITY_DECAY,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_active(&self) -> bool {
        self.alpha >= self.alpha_min
    }

    #[cfg(test)]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[cfg(test)]
    pub fn force_names(&self) -> impl Iterator<Item = &str> {
        self.forces.iter().map(|(name, _)| name.as_str())
    }

    /// Holds a body in place permanently; `release` leaves it alone.
    pub fn lock(&mut self, index: usize, at: Vec2) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.position = at;
            body.velocity = Vec2::ZERO;
            body.fixed = Some(at);
            body.locked = true;
        }
    }

    /// Drops every pin except locked bodies. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for body in self.bodies.iter_mut().filter(|body| !body.locked) {
            if body.fixed.take().is_some() {
                released += 1;
            }
        }
        released
    }

    pub fn pinned_count(&self) -> usize {
        self.bodies
            .iter()
            .filter(|body| !body.locked && body.fixed.is_some())
            .count()
    }

    /// Runs `ticks` steps without checking for cool-down.
    #[cfg(test)]
    pub fn warm_up(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn step(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;

        for (name, force) in &mut self.forces {
            trace!(force = %name, alpha, "applying force");
            force.apply(&mut self.bodies, alpha);
        }

        let keep = 1.0 - self.velocity_decay;
        for body in &mut self.bodies {
            match body.fixed {
                Some(at) => {
                    body.position = at;
                    body.velocity = Vec2::ZERO;
                }
                None => {
                    body.velocity *= keep;
                    if !body.velocity.x.is_finite() || !body.velocity.y.is_finite() {
                        body.velocity = Vec2::ZERO;
                    }
                    body.position += body.velocity;
                }
            }
        }
    }
}

impl ForceIntegrator for Simulation {
    fn register_force(&mut self, name: &str, force: Box<dyn Force>) {
        match self.forces.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = force,
            None => self.forces.push((name.to_owned(), force)),
        }
        debug!(force = name, "registered force");
    }

    fn remove_force(&mut self, name: &str) -> bool {
        let before = self.forces.len();
        self.forces.retain(|(existing, _)| existing != name);
        before != self.forces.len()
    }

    fn reheat(&mut self) {
        self.alpha = ALPHA_START;
    }

    fn tick(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.step();
        true
    }

    fn position(&self, index: usize) -> Option<Vec2> {
        self.bodies.get(index).map(|body| body.position)
    }

    fn positions(&self) -> Vec<Vec2> {
        self.bodies.iter().map(|body| body.position).collect()
    }

    fn pin(&mut self, index: usize, at: Vec2) {
        if let Some(body) = self.bodies.get_mut(index)
            && !body.locked
        {
            body.fixed = Some(at);
            body.position = at;
            body.velocity = Vec2::ZERO;
        }
    }

    fn release(&mut self, index: usize) {
        if let Some(body) = self.bodies.get_mut(index)
            && !body.locked
        {
            body.fixed = None;
        }
    }

    fn is_pinned(&self, index: usize) -> bool {
        self.bodies
            .get(index)
            .is_some_and(|body| !body.locked && body.fixed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use pretty_assertions::assert_eq;

    use super::*;

    struct Pull(Vec2);

    impl Force for Pull {
        fn apply(&mut self, bodies: &mut [Body], alpha: f32) {
            for body in bodies {
                body.velocity += (self.0 - body.position) * 0.5 * alpha;
            }
        }
    }

    #[test]
    fn cools_down_and_stops() {
        let mut simulation = Simulation::new([Vec2::ZERO]);
        let mut ticks = 0;
        while simulation.tick() {
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!((290..=310).contains(&ticks), "{ticks}");
        assert!(!simulation.is_active());

        simulation.reheat();
        assert!(simulation.is_active());
        assert_eq!(simulation.alpha(), 1.0);
    }

    #[test]
    fn registered_force_moves_free_bodies_only() {
        let mut simulation = Simulation::new([vec2(100.0, 0.0), vec2(-100.0, 0.0)]);
        simulation.register_force("pull", Box::new(Pull(Vec2::ZERO)));
        simulation.pin(1, vec2(-100.0, 0.0));
        simulation.warm_up(50);

        assert!(simulation.position(0).expect("body").x < 50.0);
        assert_eq!(simulation.position(1), Some(vec2(-100.0, 0.0)));
    }

    #[test]
    fn registering_under_same_name_replaces() {
        let mut simulation = Simulation::new([Vec2::ZERO]);
        simulation.register_force("pull", Box::new(Pull(Vec2::ZERO)));
        simulation.register_force("pull", Box::new(Pull(vec2(1.0, 1.0))));
        assert_eq!(simulation.force_names().collect::<Vec<_>>(), vec!["pull"]);
        assert!(simulation.remove_force("pull"));
        assert!(!simulation.remove_force("pull"));
    }

    #[test]
    fn locked_bodies_survive_release() {
        let mut simulation = Simulation::new([Vec2::ZERO, vec2(5.0, 5.0)]);
        simulation.lock(0, Vec2::ZERO);
        simulation.pin(1, vec2(9.0, 9.0));
        assert!(simulation.is_pinned(1));
        assert!(!simulation.is_pinned(0));

        assert_eq!(simulation.release_all(), 1);
        simulation.release(0);
        assert_eq!(simulation.bodies()[0].fixed, Some(Vec2::ZERO));
        assert_eq!(simulation.pinned_count(), 0);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut simulation = Simulation::new([Vec2::ZERO]);
        simulation.pin(7, Vec2::ZERO);
        simulation.release(7);
        assert_eq!(simulation.position(7), None);
        assert!(!simulation.is_pinned(7));
    }
}
