use serde::{Deserialize, Serialize};

use crate::{CoreError, parser::ParserConfig};

/// Default UCB1 exploration constant.
pub const DEFAULT_EXPLORATION: f64 = 2.0;

/// Selector settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// UCB1 exploration constant `c`; must be finite and non-negative.
    pub exploration: f64,
    /// Whether offline runners stay in the feasible set.
    pub include_offline: bool,
    pub parser: ParserConfig,
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(CoreError::Config(format!(
                "exploration must be a finite non-negative number, got {}",
                self.exploration
            )));
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            exploration: DEFAULT_EXPLORATION,
            include_offline: false,
            parser: ParserConfig::default(),
        }
    }
}
