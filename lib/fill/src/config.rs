use formfill_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing and layout settings for filling a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FillConfig {
    /// Fields whose tops differ by at most this many pixels share a row
    pub row_tolerance: f64,
    pub typing_delay_min_ms: u64,
    pub typing_delay_max_ms: u64,
    /// Pause after each field
    pub field_delay_ms: u64,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 50.0,
            typing_delay_min_ms: 20,
            typing_delay_max_ms: 50,
            field_delay_ms: 100,
        }
    }
}

impl FillConfig {
    /// Same layout settings with every pause removed
    pub fn without_delays(self) -> Self {
        Self {
            typing_delay_min_ms: 0,
            typing_delay_max_ms: 0,
            field_delay_ms: 0,
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.typing_delay_min_ms > self.typing_delay_max_ms {
            return Err(Error::InvalidConfig(format!(
                "typing_delay_min_ms ({}) exceeds typing_delay_max_ms ({})",
                self.typing_delay_min_ms, self.typing_delay_max_ms
            )));
        }
        if !self.row_tolerance.is_finite() || self.row_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "row_tolerance must be a non-negative number, got {}",
                self.row_tolerance
            )));
        }
        Ok(())
    }

    pub fn field_delay(&self) -> Duration {
        Duration::from_millis(self.field_delay_ms)
    }
}
