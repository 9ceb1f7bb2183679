use approx::assert_relative_eq;
use ndarray::Array1;
use proptest::prelude::*;
use trading_account::{run_episode, target_account, Account, EpisodeConfig};

// Starting states stay solvent when the price moves by at most 50%.
fn funded_account() -> impl Strategy<Value = (Account, f64, f64)> {
    (-1.0..1.5f64, 100.0..10_000.0f64, 0.1..1_000.0f64, 0.5..1.5f64).prop_map(
        |(exposure, value, price, drift)| {
            let acc = target_account(exposure, value, price).unwrap();
            (acc, price, price * drift)
        },
    )
}

proptest! {
    #[test]
    fn rebalance_hits_target_exactly(
        (mut acc, _, price) in funded_account(),
        target in -2.0..3.0f64,
        fee in 0.0..0.99f64,
    ) {
        // post-trade valuation is V·(1 + s·fee·current) / (1 + s·fee·target),
        // s = +1 when buying; keep both factors away from zero
        let current = acc.exposure(price);
        let s = if target > current { 1.0 } else { -1.0 };
        prop_assume!((1.0 + s * fee * current).abs() > 0.1);
        prop_assume!((1.0 + s * fee * target).abs() > 0.1);

        acc.rebalance_to(target, price, fee).unwrap();
        assert_relative_eq!(acc.exposure(price), target, epsilon = 1e-9, max_relative = 1e-9);
    }

    #[test]
    fn rebalance_with_owed_interest_still_hits_target(
        (mut acc, _, price) in funded_account(),
        rate in 0.0..0.001f64,
        target in -1.5..2.5f64,
        fee in 0.0..0.01f64,
    ) {
        acc.accrue_interest(rate);
        acc.rebalance_to(target, price, fee).unwrap();
        assert_relative_eq!(acc.exposure(price), target, epsilon = 1e-9, max_relative = 1e-9);
    }

    #[test]
    fn rebalance_to_current_exposure_is_a_no_op(
        (mut acc, _, price) in funded_account(),
        fee in 0.0..0.5f64,
    ) {
        let before = acc;
        let current = acc.exposure(price);
        prop_assert!(acc.rebalance_to(current, price, fee).unwrap().is_none());
        prop_assert_eq!(acc, before);
    }

    #[test]
    fn fees_only_ever_reduce_valuation(
        (mut acc, _, price) in funded_account(),
        target in -2.0..3.0f64,
        fee in 0.0..0.05f64,
    ) {
        let before = acc.valuation(price);
        let trade = acc.rebalance_to(target, price, fee).unwrap();
        let paid = trade.map_or(0.0, |t| t.fee);
        prop_assert!(paid >= 0.0);
        assert_relative_eq!(acc.valuation(price), before - paid, epsilon = 1e-6, max_relative = 1e-9);
    }

    #[test]
    fn settlement_preserves_valuation(
        (mut acc, _, price) in funded_account(),
        rate in 0.0..0.1f64,
    ) {
        acc.accrue_interest(rate);
        let before = acc.valuation(price);
        acc.settle_interest();
        assert_relative_eq!(acc.valuation(price), before, epsilon = 1e-6, max_relative = 1e-12);
        prop_assert_eq!(acc.interest_asset, 0.0);
        prop_assert_eq!(acc.interest_cash, 0.0);
    }

    #[test]
    fn target_account_round_trips(
        exposure in -3.0..3.0f64,
        value in 1.0..1e6f64,
        price in 0.01..1e4f64,
    ) {
        let acc = target_account(exposure, value, price).unwrap();
        assert_relative_eq!(acc.valuation(price), value, max_relative = 1e-9);
        assert_relative_eq!(acc.exposure(price), exposure, epsilon = 1e-9, max_relative = 1e-9);
    }

    #[test]
    fn accrued_interest_is_never_negative(
        asset in -1e4..1e4f64,
        cash in -1e5..1e5f64,
        rate in 0.0..1.0f64,
    ) {
        let mut acc = Account::new(asset, cash);
        acc.accrue_interest(rate);
        prop_assert!(acc.interest_asset >= 0.0);
        prop_assert!(acc.interest_cash >= 0.0);
    }

    #[test]
    fn fee_free_episode_only_moves_with_price(
        steps in proptest::collection::vec((0.5..2.0f64, -1.0..2.0f64), 1..40),
    ) {
        let mut price = 100.0;
        let mut prices = Vec::with_capacity(steps.len());
        let mut targets = Vec::with_capacity(steps.len());
        for (mv, target) in &steps {
            price *= mv;
            prices.push(price);
            targets.push(*target);
        }
        let prices = Array1::from(prices);
        let targets = Array1::from(targets);

        let hist = run_episode(prices.view(), targets.view(), &EpisodeConfig::default()).unwrap();

        prop_assert!(hist.steps <= steps.len());
        prop_assert_eq!(hist.fees.sum(), 0.0);
        prop_assert!(hist.ruined || hist.steps == steps.len());
    }
}
