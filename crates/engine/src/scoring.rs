use serde::{Deserialize, Serialize};

use crate::error::DriftError;

/// Lower bound of a heat band: columns with at least `min_count` modified
/// rows get `heat` (unless a later breakpoint applies).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub min_count: usize,
    pub heat: f64,
}

/// Count → heat mapping, consumed by the aggregator only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Heat of a checked, unchanged column. Never zero in practice, so an
    /// untouched column stays distinguishable from missing data.
    pub floor: f64,
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            floor: 0.05,
            breakpoints: vec![
                Breakpoint { min_count: 1, heat: 0.30 },
                Breakpoint { min_count: 3, heat: 0.60 },
                Breakpoint { min_count: 6, heat: 0.90 },
            ],
        }
    }
}

impl ScoringConfig {
    pub fn heat_for(&self, count: usize) -> f64 {
        self.breakpoints
            .iter()
            .rev()
            .find(|b| count >= b.min_count)
            .map(|b| b.heat)
            .unwrap_or(self.floor)
    }

    /// Rejects tables that would let more changes produce less heat.
    pub fn validate(&self) -> Result<(), DriftError> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.floor) {
            return Err(DriftError::ConfigValidation(format!(
                "scoring floor must be within [0, 1], got {}",
                self.floor
            )));
        }

        let mut prev: Option<&Breakpoint> = None;
        for b in &self.breakpoints {
            if !in_unit(b.heat) {
                return Err(DriftError::ConfigValidation(format!(
                    "breakpoint at {} has heat {} outside [0, 1]",
                    b.min_count, b.heat
                )));
            }
            match prev {
                None if b.min_count == 0 => {
                    return Err(DriftError::ConfigValidation(
                        "first breakpoint must start at a count of 1 or more".into(),
                    ));
                }
                None if b.heat < self.floor => {
                    return Err(DriftError::ConfigValidation(format!(
                        "floor {} is above the first breakpoint heat {}",
                        self.floor, b.heat
                    )));
                }
                Some(p) if b.min_count <= p.min_count => {
                    return Err(DriftError::ConfigValidation(format!(
                        "breakpoints must be strictly ascending by count ({} after {})",
                        b.min_count, p.min_count
                    )));
                }
                Some(p) if b.heat < p.heat => {
                    return Err(DriftError::ConfigValidation(format!(
                        "breakpoint heat must not decrease ({} at {} after {} at {})",
                        b.heat, b.min_count, p.heat, p.min_count
                    )));
                }
                _ => {}
            }
            prev = Some(b);
        }
        Ok(())
    }
}
