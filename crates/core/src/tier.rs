use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Business-importance classification of a canonical column.
///
/// L1 is the highest tier. The ordering follows importance, so
/// `RiskTier::L1 < RiskTier::L3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    L1,
    L2,
    L3,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::L1, RiskTier::L2, RiskTier::L3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L1" | "l1" => Ok(Self::L1),
            "L2" | "l2" => Ok(Self::L2),
            "L3" | "l3" => Ok(Self::L3),
            other => Err(format!("unknown risk tier: {other:?} (expected L1, L2 or L3)")),
        }
    }
}
