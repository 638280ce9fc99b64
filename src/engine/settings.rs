use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables of the named integrator forces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceSettings {
    pub charge_strength: f32,
    pub link_distance: f32,
    pub center_force: f32,
    pub collision_radius: f32,
    pub polygon_radius: f32,
}

impl Default for ForceSettings {
    fn default() -> Self {
        Self {
            charge_strength: -120.0,
            link_distance: 50.0,
            center_force: 0.08,
            collision_radius: 15.0,
            polygon_radius: 280.0,
        }
    }
}

/// Which named force a settings change touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceKey {
    ChargeStrength,
    LinkDistance,
    CenterForce,
    CollisionRadius,
    PolygonRadius,
}

impl ForceKey {
    pub const ALL: [Self; 5] = [
        Self::ChargeStrength,
        Self::LinkDistance,
        Self::CenterForce,
        Self::CollisionRadius,
        Self::PolygonRadius,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ChargeStrength => "Repulsion",
            Self::LinkDistance => "Link distance",
            Self::CenterForce => "Center force",
            Self::CollisionRadius => "Collision radius",
            Self::PolygonRadius => "Polygon radius",
        }
    }

    pub fn range(self) -> std::ops::RangeInclusive<f32> {
        match self {
            Self::ChargeStrength => -400.0..=0.0,
            Self::LinkDistance => 10.0..=200.0,
            Self::CenterForce => 0.0..=0.5,
            Self::CollisionRadius => 0.0..=60.0,
            Self::PolygonRadius => 80.0..=700.0,
        }
    }
}

impl ForceSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read force settings {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse force settings {}", path.display()))
    }

    pub fn get(&self, key: ForceKey) -> f32 {
        match key {
            ForceKey::ChargeStrength => self.charge_strength,
            ForceKey::LinkDistance => self.link_distance,
            ForceKey::CenterForce => self.center_force,
            ForceKey::CollisionRadius => self.collision_radius,
            ForceKey::PolygonRadius => self.polygon_radius,
        }
    }

    pub fn get_mut(&mut self, key: ForceKey) -> &mut f32 {
        match key {
            ForceKey::ChargeStrength => &mut self.charge_strength,
            ForceKey::LinkDistance => &mut self.link_distance,
            ForceKey::CenterForce => &mut self.center_force,
            ForceKey::CollisionRadius => &mut self.collision_radius,
            ForceKey::PolygonRadius => &mut self.polygon_radius,
        }
    }

    /// Keys whose value differs between `self` and `other`.
    pub fn changed_keys(&self, other: &Self) -> Vec<ForceKey> {
        ForceKey::ALL
            .into_iter()
            .filter(|&key| (self.get(key) - other.get(key)).abs() > f32::EPSILON)
            .collect()
    }
}
