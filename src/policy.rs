use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Band cutoffs, inclusive lower bounds: `rate >= good` is good,
/// `rate >= warning` is warning, anything below is critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    pub good: u8,
    pub warning: u8,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self { good: 90, warning: 70 }
    }
}

/// How much rate credit a tardy earns. Full credit is the canonical rule;
/// the other weights exist because legacy views disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TardyCredit {
    None,
    Half,
    #[default]
    Full,
}

impl TardyCredit {
    pub fn weight(self) -> f64 {
        match self {
            TardyCredit::None => 0.0,
            TardyCredit::Half => 0.5,
            TardyCredit::Full => 1.0,
        }
    }
}

/// Aggregation policy injected into every computation. Callers choose the
/// thresholds; nothing in the core hard-codes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttendancePolicy {
    pub thresholds: BandThresholds,
    pub tardy_credit: TardyCredit,
    pub max_strikes: usize,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            thresholds: BandThresholds::default(),
            tardy_credit: TardyCredit::Full,
            max_strikes: 3,
        }
    }
}

impl AttendancePolicy {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read policy file {}", path.display()))?;
        let policy = serde_json::from_str(&raw)
            .with_context(|| format!("invalid policy file {}", path.display()))?;
        Ok(policy)
    }
}
