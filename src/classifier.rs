// 🏷️ Income Classifier - fixed thresholds, fixed labels
//
// Thresholds are inclusive lower bounds on monthly income (BRL):
//   income >= 10000 → High
//   income >=  4000 → Medium
//   otherwise       → Low
//
// The labels are a domain convention carried verbatim into exported reports.

use crate::record::Record;
use serde::Serialize;

pub const HIGH_THRESHOLD: f64 = 10_000.0;
pub const MEDIUM_THRESHOLD: f64 = 4_000.0;

// ============================================================================
// INCOME TIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeTier {
    High,
    Medium,
    Low,
}

impl IncomeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeTier::High => "high",
            IncomeTier::Medium => "medium",
            IncomeTier::Low => "low",
        }
    }
}

/// Visual severity attached to a tier label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleToken {
    /// Green
    Success,
    /// Yellow
    Warning,
    /// Red
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierLabel {
    pub text: &'static str,
    pub style: StyleToken,
}

/// Classify a monthly income
pub fn classify(income: f64) -> IncomeTier {
    if income >= HIGH_THRESHOLD {
        IncomeTier::High
    } else if income >= MEDIUM_THRESHOLD {
        IncomeTier::Medium
    } else {
        IncomeTier::Low
    }
}

pub fn tier_label(tier: IncomeTier) -> TierLabel {
    match tier {
        IncomeTier::High => TierLabel {
            text: "VENDA BOA",
            style: StyleToken::Success,
        },
        IncomeTier::Medium => TierLabel {
            text: "VENDA MODERADA",
            style: StyleToken::Warning,
        },
        IncomeTier::Low => TierLabel {
            text: "VENDA RUIM",
            style: StyleToken::Danger,
        },
    }
}

// ============================================================================
// TIER SUMMARY
// ============================================================================

/// Record counts per tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierSummary {
    pub fn from_records(records: &[Record]) -> Self {
        let mut summary = TierSummary::default();
        for record in records {
            match record.tier() {
                IncomeTier::High => summary.high += 1,
                IncomeTier::Medium => summary.medium += 1,
                IncomeTier::Low => summary.low += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

// ============================================================================
// TESTS
// ============================================================================
