/// A finite ordered sequence of multipliers that wraps when the time index
/// exceeds its length (spec §3 "Pattern").
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern {
    pub name: String,
    pub multipliers: Vec<f64>,
}

impl Pattern {
    /// Multiplier in effect at pattern step `step` (0-based, wraps).
    pub fn at(&self, step: u64) -> f64 {
        if self.multipliers.is_empty() {
            return 1.0;
        }
        self.multipliers[(step as usize) % self.multipliers.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_past_length() {
        let p = Pattern {
            name: "p1".into(),
            multipliers: vec![0.0, 2.0],
        };
        assert_eq!(p.at(0), 0.0);
        assert_eq!(p.at(1), 2.0);
        assert_eq!(p.at(2), 0.0);
        assert_eq!(p.at(3), 2.0);
    }

    #[test]
    fn empty_pattern_is_unity() {
        let p = Pattern {
            name: "empty".into(),
            multipliers: vec![],
        };
        assert_eq!(p.at(7), 1.0);
    }
}
