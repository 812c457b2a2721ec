//! Configuration for the search bridge.
//!
//! # Example
//!
//! ```
//! use search_bridge::SearchBridgeConfig;
//!
//! // Minimal config (uses defaults)
//! let config = SearchBridgeConfig::default();
//! assert!(config.indexing_enabled_by_default);
//! assert_eq!(config.rank_digit_budget, 9);
//!
//! // Full config
//! let config = SearchBridgeConfig {
//!     indexing_enabled_by_default: false,
//!     rank_digit_budget: 11,
//! };
//! ```

use serde::Deserialize;

use crate::{gate, rank};

/// Configuration for the search bridge.
///
/// All fields have sensible defaults; call [`SearchBridgeConfig::install`]
/// to apply a loaded configuration process-wide.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchBridgeConfig {
    /// Whether indexing starts enabled on threads that have not toggled the
    /// gate explicitly (default: true)
    #[serde(default = "default_indexing_enabled")]
    pub indexing_enabled_by_default: bool,

    /// Digit budget for string rank encoding (default: 9)
    #[serde(default = "default_rank_digit_budget")]
    pub rank_digit_budget: usize,
}

fn default_indexing_enabled() -> bool {
    true
}

fn default_rank_digit_budget() -> usize {
    rank::DEFAULT_RANK_DIGITS
}

impl Default for SearchBridgeConfig {
    fn default() -> Self {
        Self {
            indexing_enabled_by_default: default_indexing_enabled(),
            rank_digit_budget: default_rank_digit_budget(),
        }
    }
}

impl SearchBridgeConfig {
    /// Apply this configuration to the indexing gate and rank encoder.
    pub fn install(&self) {
        gate::set_default_enabled(self.indexing_enabled_by_default);
        rank::set_rank_digit_budget(self.rank_digit_budget);
    }
}
