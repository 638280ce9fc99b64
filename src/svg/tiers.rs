/// Degree cut-offs for the three visual tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tiers {
    pub primary: u32,
    pub secondary: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Primary,
    Secondary,
    Minor,
}

impl Tiers {
    /// Top ~10% of degrees are primary, the next ~20% secondary.
    pub fn from_degrees(degrees: impl IntoIterator<Item = u32>) -> Self {
        let mut sorted = degrees.into_iter().collect::<Vec<_>>();
        if sorted.is_empty() {
            return Self {
                primary: 0,
                secondary: 0,
            };
        }
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        let at = |fraction: f64| {
            let index = (sorted.len() as f64 * fraction).floor() as usize;
            sorted.get(index).copied().unwrap_or(0)
        };
        Self {
            primary: at(0.1),
            secondary: at(0.3),
        }
    }

    pub fn tier_of(&self, degree: u32) -> Tier {
        if degree >= self.primary {
            Tier::Primary
        } else if degree >= self.secondary {
            Tier::Secondary
        } else {
            Tier::Minor
        }
    }
}

impl Tier {
    pub fn number(self) -> u8 {
        match self {
            Self::Primary => 1,
            Self::Secondary => 2,
            Self::Minor => 3,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            Self::Primary => 8.0,
            Self::Secondary => 6.0,
            Self::Minor => 4.0,
        }
    }

    pub fn font_size(self) -> f32 {
        match self {
            Self::Primary => 12.0,
            Self::Secondary => 10.0,
            Self::Minor => 8.0,
        }
    }

    /// Tiers 1 and 2 link out and carry a label.
    pub fn is_interactive(self) -> bool {
        self != Self::Minor
    }
}
