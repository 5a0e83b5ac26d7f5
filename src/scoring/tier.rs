//! Display tiers for coloring scores in reports.
//!
//! Tiers are presentation only and never feed back into grades.

use serde::Serialize;

/// Low / mid / high classification of a 0–5 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Mid,
    High,
}

/// Threshold set used to assign a [`Tier`].
///
/// | Scale    | Low     | Mid          | High    |
/// |----------|---------|--------------|---------|
/// | `Grid`   | < 2.5   | 2.5 to < 3.5 | >= 3.5  |
/// | `Rubric` | < 3.0   | 3.0 to < 4.0 | >= 4.0  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierScale {
    /// Individual integer cells of the fixed beam workshop grid.
    Grid,
    /// Item averages of a weighted rubric.
    Rubric,
}

impl TierScale {
    fn thresholds(self) -> (f64, f64) {
        match self {
            TierScale::Grid => (2.5, 3.5),
            TierScale::Rubric => (3.0, 4.0),
        }
    }

    pub fn tier(self, score: f64) -> Tier {
        let (low, high) = self.thresholds();
        match score {
            s if s < low => Tier::Low,
            s if s < high => Tier::Mid,
            _ => Tier::High,
        }
    }
}

impl Tier {
    /// Text color used for the tier, as RGB.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Tier::Low => (220, 53, 69),
            Tier::Mid => (255, 193, 7),
            Tier::High => (40, 167, 69),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Low => "bajo",
            Tier::Mid => "medio",
            Tier::High => "alto",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_boundaries() {
        assert_eq!(TierScale::Grid.tier(0.0), Tier::Low);
        assert_eq!(TierScale::Grid.tier(2.49), Tier::Low);
        assert_eq!(TierScale::Grid.tier(2.5), Tier::Mid);
        assert_eq!(TierScale::Grid.tier(3.0), Tier::Mid);
        assert_eq!(TierScale::Grid.tier(3.49), Tier::Mid);
        assert_eq!(TierScale::Grid.tier(3.5), Tier::High);
        assert_eq!(TierScale::Grid.tier(5.0), Tier::High);
    }

    #[test]
    fn test_rubric_boundaries() {
        assert_eq!(TierScale::Rubric.tier(2.99), Tier::Low);
        assert_eq!(TierScale::Rubric.tier(3.0), Tier::Mid);
        assert_eq!(TierScale::Rubric.tier(3.99), Tier::Mid);
        assert_eq!(TierScale::Rubric.tier(4.0), Tier::High);
    }

    #[test]
    fn test_colors() {
        assert_eq!(Tier::Low.rgb(), (220, 53, 69));
        assert_eq!(Tier::Mid.rgb(), (255, 193, 7));
        assert_eq!(Tier::High.rgb(), (40, 167, 69));
    }
}
