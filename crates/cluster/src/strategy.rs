use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::barycenter::Barycenter;
use crate::grid::Grid;
use crate::hierarchical::Hierarchical;
use crate::metric::identity;
use crate::signature::HeatSignature;
use crate::spectral::Spectral;

/// A reordering algorithm. Implementations return one permutation per axis.
pub trait ReorderStrategy {
    fn name(&self) -> &'static str;

    fn reorder(&self, grid: &Grid<'_>) -> (Vec<usize>, Vec<usize>);

    /// Whether the caller should polish the result with adjacent swaps.
    fn refines(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Identity,
    Barycenter,
    #[default]
    HeatSignature,
    Spectral,
    Hierarchical,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Identity,
        StrategyKind::Barycenter,
        StrategyKind::HeatSignature,
        StrategyKind::Spectral,
        StrategyKind::Hierarchical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Identity => "identity",
            StrategyKind::Barycenter => "barycenter",
            StrategyKind::HeatSignature => "heat_signature",
            StrategyKind::Spectral => "spectral",
            StrategyKind::Hierarchical => "hierarchical",
        }
    }

    pub fn build(&self, options: &ReorderOptions) -> Box<dyn ReorderStrategy> {
        match self {
            StrategyKind::Identity => Box::new(Identity),
            StrategyKind::Barycenter => Box::new(Barycenter::new(options.floor, options.max_passes)),
            StrategyKind::HeatSignature => Box::new(HeatSignature::new(options.floor)),
            StrategyKind::Spectral => Box::new(Spectral::new(options.floor)),
            StrategyKind::Hierarchical => Box::new(Hierarchical::new(options.floor)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "identity" | "none" => Ok(StrategyKind::Identity),
            "barycenter" => Ok(StrategyKind::Barycenter),
            "heat_signature" | "signature" => Ok(StrategyKind::HeatSignature),
            "spectral" => Ok(StrategyKind::Spectral),
            "hierarchical" | "ward" => Ok(StrategyKind::Hierarchical),
            other => Err(format!(
                "unknown strategy '{other}' (expected identity, barycenter, heat_signature, spectral or hierarchical)"
            )),
        }
    }
}

/// Knobs shared by every strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderOptions {
    /// Baseline heat every cell carries; subtracted before weighting.
    pub floor: f64,
    /// Upper bound on barycenter sweeps and adjacent-swap passes.
    pub max_passes: usize,
}

impl Default for ReorderOptions {
    fn default() -> Self {
        Self {
            floor: 0.05,
            max_passes: 8,
        }
    }
}

/// Keeps the input order.
pub struct Identity;

impl ReorderStrategy for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn reorder(&self, grid: &Grid<'_>) -> (Vec<usize>, Vec<usize>) {
        (identity(grid.n_rows()), identity(grid.n_cols()))
    }

    fn refines(&self) -> bool {
        false
    }
}

/// Floor-subtracted, non-negative weight of a cell.
pub(crate) fn weight(value: f64, floor: f64) -> f64 {
    (value - floor).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!("spectral".parse::<StrategyKind>(), Ok(StrategyKind::Spectral));
        assert_eq!("ward".parse::<StrategyKind>(), Ok(StrategyKind::Hierarchical));
        assert_eq!("heat-signature".parse::<StrategyKind>(), Ok(StrategyKind::HeatSignature));
        assert_eq!(" Barycenter ".parse::<StrategyKind>(), Ok(StrategyKind::Barycenter));
        assert!("kmeans".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.to_string().parse::<StrategyKind>(), Ok(kind));
            assert_eq!(kind.build(&ReorderOptions::default()).name(), kind.as_str());
        }
    }

    #[test]
    fn identity_does_not_refine() {
        let m = vec![vec![0.9, 0.1], vec![0.1, 0.9]];
        let id = Identity;
        assert!(!id.refines());
        assert_eq!(id.reorder(&Grid::new(&m)), (vec![0, 1], vec![0, 1]));
    }

    #[test]
    fn weight_clamps_below_floor() {
        assert_eq!(weight(0.05, 0.05), 0.0);
        assert_eq!(weight(0.0, 0.05), 0.0);
        assert!((weight(0.9, 0.05) - 0.85).abs() < 1e-12);
    }
}
