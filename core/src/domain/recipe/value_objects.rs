#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub favorites_only: bool,
}

impl RecipeFilter {
    pub fn favorites() -> Self {
        Self {
            favorites_only: true,
        }
    }
}

/// Traffic-light band for a nutri-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcvBand {
    Green,
    Yellow,
    Red,
}

impl IcvBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            IcvBand::Green
        } else if score >= 50.0 {
            IcvBand::Yellow
        } else {
            IcvBand::Red
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IcvBand::Green => "🟢 nota",
            IcvBand::Yellow => "🟡 nota",
            IcvBand::Red => "🔴 nota",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icv_band_thresholds() {
        assert_eq!(IcvBand::from_score(100.0), IcvBand::Green);
        assert_eq!(IcvBand::from_score(80.0), IcvBand::Green);
        assert_eq!(IcvBand::from_score(79.9), IcvBand::Yellow);
        assert_eq!(IcvBand::from_score(50.0), IcvBand::Yellow);
        assert_eq!(IcvBand::from_score(12.0), IcvBand::Red);
    }
}
