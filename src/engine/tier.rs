//! Outcome tiers: mapping a roll-vs-DC comparison onto five ranked buckets.

use serde::{Deserialize, Serialize};

/// Ranked worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTier {
    BadFailure,
    Failure,
    Success,
    GreatSuccess,
    CriticalSuccess,
}

impl OutcomeTier {
    pub fn label(self) -> &'static str {
        match self {
            OutcomeTier::BadFailure => "bad failure",
            OutcomeTier::Failure => "failure",
            OutcomeTier::Success => "success",
            OutcomeTier::GreatSuccess => "great success",
            OutcomeTier::CriticalSuccess => "critical success",
        }
    }
}

impl std::fmt::Display for OutcomeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical per-tier effect template consumed by the resolution engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierEffects {
    /// Adjustment to a contract's duration in turns. Critical success never
    /// reduces a duration and bad failure never extends one.
    pub duration_adjust: i64,
    pub income_multiplier: f64,
    pub capital_delta: i64,
}

/// Resolve a check. Pure function of (natural die, modified total, DC);
/// natural 20 is an override evaluated before the numeric margins.
pub fn resolve_tier(natural: i64, total: i64, dc: i64) -> OutcomeTier {
    if natural == 20 || total >= dc + 10 {
        OutcomeTier::CriticalSuccess
    } else if total >= dc + 5 {
        OutcomeTier::GreatSuccess
    } else if total >= dc {
        OutcomeTier::Success
    } else if total >= dc - 5 {
        OutcomeTier::Failure
    } else {
        OutcomeTier::BadFailure
    }
}

pub fn tier_effects(tier: OutcomeTier) -> TierEffects {
    match tier {
        OutcomeTier::BadFailure => TierEffects {
            duration_adjust: -2,
            income_multiplier: 0.0,
            capital_delta: -20,
        },
        OutcomeTier::Failure => TierEffects {
            duration_adjust: -1,
            income_multiplier: 0.75,
            capital_delta: -5,
        },
        OutcomeTier::Success => TierEffects {
            duration_adjust: 0,
            income_multiplier: 1.0,
            capital_delta: 8,
        },
        OutcomeTier::GreatSuccess => TierEffects {
            duration_adjust: 1,
            income_multiplier: 1.20,
            capital_delta: 15,
        },
        OutcomeTier::CriticalSuccess => TierEffects {
            duration_adjust: 2,
            income_multiplier: 1.35,
            capital_delta: 25,
        },
    }
}
