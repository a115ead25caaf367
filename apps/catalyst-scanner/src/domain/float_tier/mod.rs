//! Float Tier Classification
//!
//! Maps float shares outstanding to a named tier used for filtering and
//! display emphasis. Smaller floats move harder on news.
//!
//! | Condition                     | Tier      |
//! |-------------------------------|-----------|
//! | unknown                       | `unknown` |
//! | F < bright_below              | `bright`  |
//! | bright_below ≤ F < soft_below | `soft`    |
//! | soft_below ≤ F ≤ normal_max   | `normal`  |
//! | F > normal_max                | `high` or dropped, per policy |

use serde::{Deserialize, Serialize};

use crate::domain::eligibility::Rejection;

// =============================================================================
// Types
// =============================================================================

/// Float tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatTier {
    /// Float not reported.
    Unknown,
    /// Very low float.
    Bright,
    /// Low float.
    Soft,
    /// Ordinary float.
    Normal,
    /// Large float.
    High,
}

impl FloatTier {
    /// Tier name as rendered.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Bright => "bright",
            Self::Soft => "soft",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

/// What to do with floats above `normal_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighFloatPolicy {
    /// Keep the item, tiered `high`.
    Display,
    /// Drop the item.
    #[default]
    Omit,
}

/// Tier boundaries in shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatThresholds {
    /// Floats strictly below this are `bright`.
    pub bright_below: u64,
    /// Floats strictly below this (and not bright) are `soft`.
    pub soft_below: u64,
    /// Floats up to and including this are `normal`.
    pub normal_max: u64,
}

impl Default for FloatThresholds {
    fn default() -> Self {
        Self {
            bright_below: 5_000_000,
            soft_below: 10_000_000,
            normal_max: 20_000_000,
        }
    }
}

impl FloatThresholds {
    /// Whether the boundaries are strictly increasing.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.bright_below < self.soft_below && self.soft_below <= self.normal_max
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Float tier classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatTierClassifier {
    thresholds: FloatThresholds,
    policy: HighFloatPolicy,
}

impl FloatTierClassifier {
    /// Create a classifier.
    #[must_use]
    pub const fn new(thresholds: FloatThresholds, policy: HighFloatPolicy) -> Self {
        Self { thresholds, policy }
    }

    /// Tier for a float count, ignoring the high-float policy.
    #[must_use]
    pub const fn tier(&self, float_shares: Option<u64>) -> FloatTier {
        let Some(f) = float_shares else {
            return FloatTier::Unknown;
        };
        if f < self.thresholds.bright_below {
            FloatTier::Bright
        } else if f < self.thresholds.soft_below {
            FloatTier::Soft
        } else if f <= self.thresholds.normal_max {
            FloatTier::Normal
        } else {
            FloatTier::High
        }
    }

    /// Tier with the high-float policy applied.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::HighFloat`] for `high` floats under the `omit` policy.
    pub fn classify(&self, float_shares: Option<u64>) -> Result<FloatTier, Rejection> {
        match (self.tier(float_shares), float_shares, self.policy) {
            (FloatTier::High, Some(float_shares), HighFloatPolicy::Omit) => {
                Err(Rejection::HighFloat { float_shares })
            }
            (tier, _, _) => Ok(tier),
        }
    }
}

/// Human-readable float: `4.00M`, `850.0K`, raw count below 1,000, `N/A`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_float(float_shares: Option<u64>) -> String {
    match float_shares {
        None => "N/A".to_string(),
        Some(f) if f >= 1_000_000 => format!("{:.2}M", f as f64 / 1_000_000.0),
        Some(f) if f >= 1_000 => format!("{:.1}K", f as f64 / 1_000.0),
        Some(f) => f.to_string(),
    }
}
