use eframe::egui::{Pos2, Rect, Vec2};

use super::render_utils::{screen_to_world, world_to_screen};

pub(in crate::app) const MIN_ZOOM: f32 = 0.05;
pub(in crate::app) const MAX_ZOOM: f32 = 6.0;
pub(in crate::app) const STEP_FACTOR: f32 = 1.3;
pub(in crate::app) const STEP_SECS: f64 = 0.3;
pub(in crate::app) const FIT_SECS: f64 = 0.4;
pub(in crate::app) const FOCUS_SECS: f64 = 1.0;
pub(in crate::app) const FOCUS_ZOOM: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
    from_pan: Vec2,
    from_zoom: f32,
    to_pan: Vec2,
    to_zoom: f32,
    start_secs: f64,
    duration_secs: f64,
}

/// Pan/zoom state of the canvas. Screen = rect centre + pan + world * zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Camera {
    pub pan: Vec2,
    pub zoom: f32,
    transition: Option<Transition>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            transition: None,
        }
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

impl Camera {
    pub(in crate::app) fn to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        world_to_screen(rect, self.pan, self.zoom, world)
    }

    pub(in crate::app) fn to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        screen_to_world(rect, self.pan, self.zoom, screen)
    }

    #[cfg(test)]
    pub(in crate::app) fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Moves along the running transition. Returns true while one is active.
    pub(in crate::app) fn advance(&mut self, now_secs: f64) -> bool {
        let Some(transition) = self.transition else {
            return false;
        };

        let elapsed = now_secs - transition.start_secs;
        let t = if transition.duration_secs <= 0.0 {
            1.0
        } else {
            (elapsed / transition.duration_secs).clamp(0.0, 1.0) as f32
        };
        let eased = ease_in_out_cubic(t);
        self.zoom = transition.from_zoom + (transition.to_zoom - transition.from_zoom) * eased;
        self.pan = transition.from_pan + (transition.to_pan - transition.from_pan) * eased;

        if t >= 1.0 {
            self.transition = None;
            return false;
        }
        true
    }

    fn animate_to(&mut self, pan: Vec2, zoom: f32, now_secs: f64, duration_secs: f64) {
        self.transition = Some(Transition {
            from_pan: self.pan,
            from_zoom: self.zoom,
            to_pan: pan,
            to_zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            start_secs: now_secs,
            duration_secs,
        });
    }

    /// Zoom about the viewport centre, keeping the centred world point fixed.
    pub(in crate::app) fn step_zoom(&mut self, factor: f32, now_secs: f64) {
        let target_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let centre_world = -self.pan / self.zoom;
        self.animate_to(-centre_world * target_zoom, target_zoom, now_secs, STEP_SECS);
    }

    pub(in crate::app) fn zoom_in(&mut self, now_secs: f64) {
        self.step_zoom(STEP_FACTOR, now_secs);
    }

    pub(in crate::app) fn zoom_out(&mut self, now_secs: f64) {
        self.step_zoom(1.0 / STEP_FACTOR, now_secs);
    }

    /// Wheel zoom about the pointer, applied immediately.
    pub(in crate::app) fn zoom_about(&mut self, rect: Rect, pointer: Pos2, scroll: f32) {
        self.transition = None;
        let world_before = self.to_world(rect, pointer);
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.transition = None;
        self.pan += delta;
    }

    /// Centres `world` at `zoom`.
    pub(in crate::app) fn focus(&mut self, world: Vec2, zoom: f32, now_secs: f64, duration_secs: f64) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.animate_to(-world * zoom, zoom, now_secs, duration_secs);
    }

    /// Frames every point with `padding` screen pixels on each side.
    pub(in crate::app) fn fit(&mut self, viewport: Vec2, points: &[Vec2], padding: f32, now_secs: f64, duration_secs: f64) {
        let Some((min, max)) = bounds(points) else {
            self.animate_to(Vec2::ZERO, 1.0, now_secs, duration_secs);
            return;
        };

        let available = (viewport - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));
        let span = (max - min).max(Vec2::splat(1.0));
        let zoom = (available.x / span.x).min(available.y / span.y).clamp(MIN_ZOOM, MAX_ZOOM);
        let centre = (min + max) * 0.5;
        self.animate_to(-centre * zoom, zoom, now_secs, duration_secs);
    }
}

fn bounds(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let mut iter = points.iter().filter(|point| point.x.is_finite() && point.y.is_finite());
    let first = *iter.next()?;
    Some(iter.fold((first, first), |(min, max), point| (min.min(*point), max.max(*point))))
}
