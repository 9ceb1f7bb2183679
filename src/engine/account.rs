// src/engine/account.rs

use crate::engine::error::{EngineError, Result};

/// Leveraged holder of one risky asset and one cash currency.
///
/// Negative `asset` is a short (borrowed asset), negative `cash` is margin
/// (borrowed cash). Interest balances are what is owed on those borrowed
/// amounts and has not been folded back into the principal yet.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Account {
    pub asset:          f64,  // units of the risky instrument
    pub cash:           f64,  // units of the numeraire
    pub interest_asset: f64,  // asset-denominated interest owed, >= 0
    pub interest_cash:  f64,  // cash-denominated interest owed, >= 0
}

/// What one rebalance actually did to the balances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trade {
    pub asset: f64,  // signed asset delta applied
    pub cash:  f64,  // signed cash delta applied, fee included
    pub fee:   f64,  // valuation lost to the trade, negative if 1 + target·fee_rate < 0 flipped it
}

/// Reporting snapshot of an account, every entry non-negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Distribution {
    pub asset:          f64,
    pub cash:           f64,
    pub borrowed_asset: f64,
    pub borrowed_cash:  f64,
    pub interest_asset: f64,
    pub interest_cash:  f64,
}

impl Account {
    pub fn new(asset: f64, cash: f64) -> Self {
        Self { asset, cash, interest_asset: 0.0, interest_cash: 0.0 }
    }

    pub fn with_interest(asset: f64, cash: f64, interest_asset: f64, interest_cash: f64) -> Self {
        Self { asset, cash, interest_asset, interest_cash }
    }

    /// Net worth in cash terms, owed interest deducted.
    pub fn valuation(&self, price: f64) -> f64 {
        self.asset * price + self.cash - self.interest_asset * price - self.interest_cash
    }

    /// Share of the valuation held in the asset, ignoring owed asset interest.
    ///
    /// Undefined (inf/NaN) when the valuation is exactly zero.
    pub fn exposure(&self, price: f64) -> f64 {
        self.asset * price / self.valuation(price)
    }

    /// Share of the valuation held in the asset net of owed asset interest.
    pub fn real_exposure(&self, price: f64) -> f64 {
        (self.asset - self.interest_asset) * price / self.valuation(price)
    }

    /// Trade asset against cash so that `exposure(price) == target` afterwards,
    /// paying `fee_rate` on the cash side of the traded notional only.
    ///
    /// The trade size is solved in closed form. Buying pays the fee on the cash
    /// spent, selling pays it out of the cash received, so the correction term
    /// flips sign with the direction of the trade.
    ///
    /// Returns `Ok(None)` without touching the balances when `target` already
    /// equals the current exposure. On `InvalidPrice` nothing is mutated.
    pub fn rebalance_to(&mut self, target: f64, price: f64, fee_rate: f64) -> Result<Option<Trade>> {
        let current = self.exposure(price);
        if current == target {
            return Ok(None);
        }
        if price.is_nan() || price <= 0.0 {
            return Err(EngineError::InvalidPrice(price));
        }

        // valuation expressed in asset units
        let relative_value = self.valuation(price) / price;

        let (fiat_cost_factor, cost_position) = if target > current {
            (1.0 + fee_rate, 1.0 + target * fee_rate)
        } else {
            (1.0 - fee_rate, 1.0 - target * fee_rate)
        };

        let asset_trade = (relative_value * target - self.asset) / cost_position;
        let cash_trade  = -asset_trade * price * fiat_cost_factor;

        self.cash  += cash_trade;
        self.asset += asset_trade;

        Ok(Some(Trade {
            asset: asset_trade,
            cash:  cash_trade,
            fee:   -(asset_trade * price + cash_trade),
        }))
    }

    /// Overwrite the owed interest with this step's charge on borrowed balances.
    pub fn accrue_interest(&mut self, borrow_rate: f64) {
        self.interest_asset = (-self.asset).max(0.0) * borrow_rate;
        self.interest_cash  = (-self.cash).max(0.0) * borrow_rate;
    }

    /// Fold owed interest into the principal. Valuation is unchanged.
    pub fn settle_interest(&mut self) {
        self.asset -= self.interest_asset;
        self.interest_asset = 0.0;
        self.cash -= self.interest_cash;
        self.interest_cash = 0.0;
    }

    pub fn distribution(&self) -> Distribution {
        Distribution {
            asset:          self.asset.max(0.0),
            cash:           self.cash.max(0.0),
            borrowed_asset: (-self.asset).max(0.0),
            borrowed_cash:  (-self.cash).max(0.0),
            interest_asset: self.interest_asset,
            interest_cash:  self.interest_cash,
        }
    }
}

/// Build an account worth `valuation` with exposure `exposure_ratio` at `price`.
pub fn target_account(exposure_ratio: f64, valuation: f64, price: f64) -> Result<Account> {
    if price.is_nan() || price <= 0.0 {
        return Err(EngineError::InvalidPrice(price));
    }
    Ok(Account::new(
        exposure_ratio * valuation / price,
        (1.0 - exposure_ratio) * valuation,
    ))
}
