// src/engine/config.rs

use serde::Deserialize;

use crate::engine::error::{EngineError, Result};

/// Parameters of one simulated episode. Every field has a default, so a
/// partial JSON object (or `{}`) is a valid config.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    pub trading_fees:            f64,            // proportional, charged on the cash side
    pub borrow_interest_rate:    f64,            // per step, on borrowed balances
    pub portfolio_initial_value: f64,            // in cash
    pub initial_position:        f64,            // starting exposure
    pub settle_interest:         bool,           // fold owed interest into principal each step
    pub max_episode_duration:    Option<usize>,  // truncate after this many steps
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            trading_fees:            0.0,
            borrow_interest_rate:    0.0,
            portfolio_initial_value: 1000.0,
            initial_position:        0.0,
            settle_interest:         false,
            max_episode_duration:    None,
        }
    }
}

impl EpisodeConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.trading_fees) {
            return Err(invalid("trading_fees", self.trading_fees, "must be in [0, 1)"));
        }
        if !self.borrow_interest_rate.is_finite() || self.borrow_interest_rate < 0.0 {
            return Err(invalid(
                "borrow_interest_rate",
                self.borrow_interest_rate,
                "must be finite and non-negative",
            ));
        }
        if !self.portfolio_initial_value.is_finite() || self.portfolio_initial_value <= 0.0 {
            return Err(invalid(
                "portfolio_initial_value",
                self.portfolio_initial_value,
                "must be finite and positive",
            ));
        }
        if !self.initial_position.is_finite() {
            return Err(invalid("initial_position", self.initial_position, "must be finite"));
        }
        if self.max_episode_duration == Some(0) {
            return Err(invalid("max_episode_duration", 0.0, "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: f64, reason: &'static str) -> EngineError {
    EngineError::InvalidConfig { field, value, reason }
}
