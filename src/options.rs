//! Search-time options.

use serde::{Deserialize, Serialize};

use crate::error::{LshError, Result};
use crate::results::SignFilter;

/// Sentinel `max_lag` accepting matches at any time position.
pub const ALL_LAGS: i64 = -1;

/// Parameters customizing a single search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of results to return.
    pub num_to_return: usize,
    /// Minimum absolute correlation for a match, in [0, 1].
    pub threshold: f64,
    /// Restrict matches by correlation sign.
    pub sign_filter: SignFilter,
    /// Half-width of the allowed time window around the query's index;
    /// [`ALL_LAGS`] disables windowing.
    pub max_lag: i64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            num_to_return: 10,
            threshold: 0.85,
            sign_filter: SignFilter::Any,
            // 15m when the index is seconds from epoch
            max_lag: 900,
        }
    }
}

impl SearchOptions {
    /// Validate the options, returning the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.num_to_return < 1 {
            return Err(LshError::InvalidNumToReturn);
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(LshError::InvalidThreshold);
        }
        Ok(())
    }

    /// `max_lag` with anything below [`ALL_LAGS`] normalized to [`ALL_LAGS`].
    pub fn effective_max_lag(&self) -> i64 {
        self.max_lag.max(ALL_LAGS)
    }
}
