// src/engine/episode.rs

use ndarray::{Array1, ArrayView1};
use tracing::{debug, warn};

use crate::engine::account::{target_account, Account};
use crate::engine::config::EpisodeConfig;
use crate::engine::error::Result;
use crate::engine::prepare_inputs::prepare_inputs;

/// Step-by-step record of one episode. Every column has `steps` entries.
#[derive(Clone, Debug)]
pub struct EpisodeHistory {
    pub valuation:        Array1<f64>,
    pub exposure:         Array1<f64>,
    pub real_exposure:    Array1<f64>,
    pub asset:            Array1<f64>,
    pub cash:             Array1<f64>,
    pub interest_asset:   Array1<f64>,
    pub interest_cash:    Array1<f64>,
    pub fees:             Array1<f64>,  // fee paid on the step's trade, 0 if none
    pub steps:            usize,
    pub position_changes: usize,
    pub ruined:           bool,         // stopped early on non-positive or NaN valuation
    pub account:          Account,      // state after the last recorded step
}

struct Columns {
    valuation:      Vec<f64>,
    exposure:       Vec<f64>,
    real_exposure:  Vec<f64>,
    asset:          Vec<f64>,
    cash:           Vec<f64>,
    interest_asset: Vec<f64>,
    interest_cash:  Vec<f64>,
    fees:           Vec<f64>,
}

impl Columns {
    fn with_capacity(n: usize) -> Self {
        Self {
            valuation:      Vec::with_capacity(n),
            exposure:       Vec::with_capacity(n),
            real_exposure:  Vec::with_capacity(n),
            asset:          Vec::with_capacity(n),
            cash:           Vec::with_capacity(n),
            interest_asset: Vec::with_capacity(n),
            interest_cash:  Vec::with_capacity(n),
            fees:           Vec::with_capacity(n),
        }
    }

    fn record(&mut self, account: &Account, price: f64, fee: f64) -> f64 {
        let valuation = account.valuation(price);
        self.valuation.push(valuation);
        self.exposure.push(account.exposure(price));
        self.real_exposure.push(account.real_exposure(price));
        self.asset.push(account.asset);
        self.cash.push(account.cash);
        self.interest_asset.push(account.interest_asset);
        self.interest_cash.push(account.interest_cash);
        self.fees.push(fee);
        valuation
    }
}

/// Drive one account through `prices`, asking for `targets[t]` at step `t`.
///
/// A trade is only placed when the requested target differs from the previous
/// request, so holding an action lets the realised exposure drift with price.
pub fn run_episode(
    prices: ArrayView1<f64>,
    targets: ArrayView1<f64>,
    config: &EpisodeConfig,
) -> Result<EpisodeHistory> {
    config.validate()?;
    let len = prepare_inputs(prices, targets)?;
    let n = config.max_episode_duration.map_or(len, |max| max.min(len));

    let mut account = target_account(
        config.initial_position,
        config.portfolio_initial_value,
        prices[0],
    )?;
    let mut requested = config.initial_position;
    let mut position_changes = 0;
    let mut ruined = false;
    let mut cols = Columns::with_capacity(n);

    debug!(steps = n, initial_position = requested, "episode started");

    for t in 0..n {
        let price = prices[t];

        if config.settle_interest {
            account.settle_interest();
        }

        let mut fee = 0.0;
        if targets[t] != requested {
            requested = targets[t];
            position_changes += 1;
            if let Some(trade) = account.rebalance_to(requested, price, config.trading_fees)? {
                fee = trade.fee;
            }
        }

        account.accrue_interest(config.borrow_interest_rate);

        let valuation = cols.record(&account, price, fee);
        if valuation.is_nan() || valuation <= 0.0 {
            warn!(step = t, valuation, "valuation is no longer positive, ending episode");
            ruined = true;
            break;
        }
    }

    let steps = cols.valuation.len();
    debug!(steps, position_changes, ruined, "episode finished");

    Ok(EpisodeHistory {
        valuation:      Array1::from(cols.valuation),
        exposure:       Array1::from(cols.exposure),
        real_exposure:  Array1::from(cols.real_exposure),
        asset:          Array1::from(cols.asset),
        cash:           Array1::from(cols.cash),
        interest_asset: Array1::from(cols.interest_asset),
        interest_cash:  Array1::from(cols.interest_cash),
        fees:           Array1::from(cols.fees),
        steps,
        position_changes,
        ruined,
        account,
    })
}
