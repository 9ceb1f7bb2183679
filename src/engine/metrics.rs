// src/engine/metrics.rs

use ndarray::ArrayView1;

use crate::engine::episode::EpisodeHistory;

/// Step‐by‐step episode metrics
#[derive(Debug, Clone)]
pub struct EpisodeMetrics {
    pub returns:          Vec<f64>, // R_t per step, starting from the initial value
    pub mean_return:      f64,
    pub volatility:       f64,
    pub sharpe_ratio:     f64,
    pub portfolio_return: f64,
    pub market_return:    f64,
    pub max_drawdown:     f64,
    pub total_fees:       f64,
    pub position_changes: usize,
    pub episode_length:   usize,
}

pub fn compute_episode_metrics(
    history: &EpisodeHistory,
    prices: ArrayView1<f64>,
    initial_value: f64,
) -> EpisodeMetrics {
    let n = history.steps;
    let mut returns = Vec::with_capacity(n);

    let mut prev = initial_value;
    for &cur in history.valuation.iter() {
        let r = if prev != 0.0 { (cur - prev) / prev } else { 0.0 };
        returns.push(r);
        prev = cur;
    }

    let m = returns.len() as f64;
    let mean_return = if m > 0.0 { returns.iter().sum::<f64>() / m } else { 0.0 };
    let volatility  = if m > 1.0 {
        let mu = mean_return;
        (returns.iter().map(|&x| (x - mu).powi(2)).sum::<f64>() / (m - 1.0)).sqrt()
    } else {
        0.0
    };
    let sharpe_ratio = if volatility != 0.0 { mean_return / volatility } else { 0.0 };

    // (V_final / V_initial) - 1
    let last = n.checked_sub(1);
    let final_value = last.map_or(initial_value, |i| history.valuation[i]);
    let portfolio_return = if initial_value != 0.0 {
        final_value / initial_value - 1.0
    } else {
        0.0
    };

    let market_return = match (prices.get(0), last.and_then(|i| prices.get(i))) {
        (Some(&first), Some(&end)) if first != 0.0 => end / first - 1.0,
        _ => 0.0,
    };

    // max drawdown, the initial value counts as the first peak
    let mut peak: f64   = initial_value;
    let mut max_dd: f64 = 0.0;
    for &v in history.valuation.iter() {
        peak = peak.max(v);
        let dd = if peak != 0.0 { (peak - v) / peak } else { 0.0 };
        max_dd = max_dd.max(dd);
    }

    EpisodeMetrics {
        returns,
        mean_return,
        volatility,
        sharpe_ratio,
        portfolio_return,
        market_return,
        max_drawdown:     max_dd,
        total_fees:       history.fees.sum(),
        position_changes: history.position_changes,
        episode_length:   n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EpisodeConfig;
    use crate::engine::episode::run_episode;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn long_only_episode_follows_the_market() {
        let prices  = array![10.0, 12.0, 9.0, 11.0];
        let targets = array![1.0, 1.0, 1.0, 1.0];
        let config  = EpisodeConfig::default();
        let hist = run_episode(prices.view(), targets.view(), &config).unwrap();

        let m = compute_episode_metrics(&hist, prices.view(), config.portfolio_initial_value);

        assert_eq!(m.episode_length, 4);
        assert_eq!(m.returns.len(), 4);
        assert_relative_eq!(m.returns[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(m.returns[1], 0.2, epsilon = 1e-12);
        assert_relative_eq!(m.portfolio_return, 0.1, epsilon = 1e-12);
        assert_relative_eq!(m.market_return, 0.1, epsilon = 1e-12);
        assert_relative_eq!(m.max_drawdown, 0.25, epsilon = 1e-12);
        assert_eq!(m.total_fees, 0.0);
        assert_eq!(m.position_changes, 1);
        assert!(m.volatility > 0.0);
    }

    #[test]
    fn fees_are_summed_across_trades() {
        let prices  = array![10.0, 10.0, 10.0];
        let targets = array![1.0, 0.0, 1.0];
        let config  = EpisodeConfig { trading_fees: 0.01, ..Default::default() };
        let hist = run_episode(prices.view(), targets.view(), &config).unwrap();

        let m = compute_episode_metrics(&hist, prices.view(), config.portfolio_initial_value);

        assert_eq!(m.position_changes, 3);
        assert_relative_eq!(m.total_fees, 1000.0 - hist.valuation[2], epsilon = 1e-9);
        assert_relative_eq!(m.market_return, 0.0);
        assert!(m.portfolio_return < 0.0);
    }

    #[test]
    fn single_step_has_no_volatility() {
        let prices  = array![10.0];
        let targets = array![0.0];
        let hist = run_episode(prices.view(), targets.view(), &EpisodeConfig::default()).unwrap();

        let m = compute_episode_metrics(&hist, prices.view(), 1000.0);

        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.portfolio_return, 0.0);
    }
}
