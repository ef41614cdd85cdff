// 🚦 Risk Classifier
// Maps a youth biometric share to one of five ordinal tiers

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Exemplary,
    Good,
    Moderate,
    #[serde(rename = "At Risk")]
    AtRisk,
    Critical,
    Unknown,
}

impl RiskTier {
    pub const ALL: [RiskTier; 6] = [
        RiskTier::Exemplary,
        RiskTier::Good,
        RiskTier::Moderate,
        RiskTier::AtRisk,
        RiskTier::Critical,
        RiskTier::Unknown,
    ];

    /// Thresholds are closed below: 60.0 is Exemplary, 59.999 is Good
    pub fn classify(youth_bio_pct: Option<f64>) -> RiskTier {
        match youth_bio_pct {
            None => RiskTier::Unknown,
            Some(pct) if pct.is_nan() => RiskTier::Unknown,
            Some(pct) if pct >= 60.0 => RiskTier::Exemplary,
            Some(pct) if pct >= 50.0 => RiskTier::Good,
            Some(pct) if pct >= 45.0 => RiskTier::Moderate,
            Some(pct) if pct >= 40.0 => RiskTier::AtRisk,
            Some(_) => RiskTier::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Exemplary => "Exemplary",
            RiskTier::Good => "Good",
            RiskTier::Moderate => "Moderate",
            RiskTier::AtRisk => "At Risk",
            RiskTier::Critical => "Critical",
            RiskTier::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
