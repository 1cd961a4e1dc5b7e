//! Gain/loss classification of CNV ratios

use serde::{Deserialize, Serialize};

use crate::error::{CnvError, Result};

/// Qualitative state of a single CNV ratio relative to the diploid baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Gain,
    Loss,
    Normal,
}

impl Category {
    /// Display name used in the heatmap legend
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Gain => "Gain",
            Category::Loss => "Loss",
            Category::Normal => "Normal",
        }
    }
}

/// Classification thresholds for CNV ratios
///
/// A ratio at or above `gain` is a Gain, at or below `loss` is a Loss, and
/// the open interval strictly between them is Normal. Both boundary values
/// classify toward their category: exactly 1.3 is a Gain, exactly 0.7 a Loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Gain threshold (inclusive) [default: 1.3]
    pub gain: f64,
    /// Loss threshold (inclusive) [default: 0.7]
    pub loss: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            gain: 1.3,
            loss: 0.7,
        }
    }
}

impl Thresholds {
    /// Check that the thresholds delimit a non-empty Normal interval
    pub fn validate(&self) -> Result<()> {
        if !self.gain.is_finite() || !self.loss.is_finite() || self.gain <= self.loss {
            return Err(CnvError::Config {
                reason: format!(
                    "Gain threshold ({}) must be greater than loss threshold ({})",
                    self.gain, self.loss
                ),
            });
        }
        Ok(())
    }
}

/// Classify a single CNV ratio against the thresholds
///
/// The ratio is compared exactly, without rounding. Only NaN (the marker for
/// a malformed or missing cell) falls back to Normal; the bad cell is
/// reported where it is parsed, not here. Infinite ratios classify like any
/// other value, so a division-by-zero ratio in an export still shows up as a
/// gain or loss.
pub fn categorize(ratio: f64, thresholds: &Thresholds) -> Category {
    if ratio.is_nan() {
        return Category::Normal;
    }
    if ratio >= thresholds.gain {
        Category::Gain
    } else if ratio <= thresholds.loss {
        Category::Loss
    } else {
        Category::Normal
    }
}
