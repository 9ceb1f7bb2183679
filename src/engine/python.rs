// src/engine/python.rs

use ndarray::ArrayView1;
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use tracing_subscriber::EnvFilter;

use crate::engine::{
    account::{target_account, Account},
    batch::run_episodes,
    config::EpisodeConfig,
    episode::{run_episode, EpisodeHistory},
    metrics::compute_episode_metrics,
};

/// Python handle on a single `Account`.
#[pyclass(name = "Account")]
#[derive(Clone, Debug)]
pub struct PyAccount {
    inner: Account,
}

#[pymethods]
impl PyAccount {
    #[new]
    #[pyo3(signature = (asset, cash, interest_asset=0.0, interest_cash=0.0))]
    fn new(asset: f64, cash: f64, interest_asset: f64, interest_cash: f64) -> Self {
        Self { inner: Account::with_interest(asset, cash, interest_asset, interest_cash) }
    }

    /// Account worth `valuation` with exposure `exposure` at `price`.
    #[staticmethod]
    fn target(exposure: f64, valuation: f64, price: f64) -> PyResult<Self> {
        Ok(Self { inner: target_account(exposure, valuation, price)? })
    }

    #[getter]
    fn asset(&self) -> f64 {
        self.inner.asset
    }

    #[getter]
    fn cash(&self) -> f64 {
        self.inner.cash
    }

    #[getter]
    fn interest_asset(&self) -> f64 {
        self.inner.interest_asset
    }

    #[getter]
    fn interest_cash(&self) -> f64 {
        self.inner.interest_cash
    }

    fn valuation(&self, price: f64) -> f64 {
        self.inner.valuation(price)
    }

    fn exposure(&self, price: f64) -> f64 {
        self.inner.exposure(price)
    }

    fn real_exposure(&self, price: f64) -> f64 {
        self.inner.real_exposure(price)
    }

    #[pyo3(signature = (target, price, fee_rate=0.0))]
    fn rebalance_to(&mut self, target: f64, price: f64, fee_rate: f64) -> PyResult<()> {
        self.inner.rebalance_to(target, price, fee_rate)?;
        Ok(())
    }

    fn accrue_interest(&mut self, borrow_rate: f64) {
        self.inner.accrue_interest(borrow_rate);
    }

    fn settle_interest(&mut self) {
        self.inner.settle_interest();
    }

    fn distribution<'py>(&self, py: Python<'py>) -> PyResult<&'py PyDict> {
        let d = self.inner.distribution();
        let pd = PyDict::new(py);
        pd.set_item("asset",          d.asset)?;
        pd.set_item("cash",           d.cash)?;
        pd.set_item("borrowed_asset", d.borrowed_asset)?;
        pd.set_item("borrowed_cash",  d.borrowed_cash)?;
        pd.set_item("interest_asset", d.interest_asset)?;
        pd.set_item("interest_cash",  d.interest_cash)?;
        Ok(pd)
    }

    fn __repr__(&self) -> String {
        format!(
            "Account(asset={}, cash={}, interest_asset={}, interest_cash={})",
            self.inner.asset, self.inner.cash, self.inner.interest_asset, self.inner.interest_cash
        )
    }
}

fn episode_to_py(
    py: Python<'_>,
    hist: EpisodeHistory,
    prices: ArrayView1<f64>,
    initial_value: f64,
) -> PyResult<PyObject> {
    let metrics = compute_episode_metrics(&hist, prices, initial_value);

    let out = PyDict::new(py);
    out.set_item("steps",            hist.steps)?;
    out.set_item("position_changes", hist.position_changes)?;
    out.set_item("ruined",           hist.ruined)?;
    out.set_item("valuation",        hist.valuation.into_pyarray(py))?;
    out.set_item("exposure",         hist.exposure.into_pyarray(py))?;
    out.set_item("real_exposure",    hist.real_exposure.into_pyarray(py))?;
    out.set_item("asset",            hist.asset.into_pyarray(py))?;
    out.set_item("cash",             hist.cash.into_pyarray(py))?;
    out.set_item("interest_asset",   hist.interest_asset.into_pyarray(py))?;
    out.set_item("interest_cash",    hist.interest_cash.into_pyarray(py))?;
    out.set_item("fees",             hist.fees.into_pyarray(py))?;

    let m = PyDict::new(py);
    m.set_item("returns",          PyList::new(py, &metrics.returns))?;
    m.set_item("mean_return",      metrics.mean_return)?;
    m.set_item("volatility",       metrics.volatility)?;
    m.set_item("sharpe_ratio",     metrics.sharpe_ratio)?;
    m.set_item("portfolio_return", metrics.portfolio_return)?;
    m.set_item("market_return",    metrics.market_return)?;
    m.set_item("max_drawdown",     metrics.max_drawdown)?;
    m.set_item("total_fees",       metrics.total_fees)?;
    m.set_item("position_changes", metrics.position_changes)?;
    m.set_item("episode_length",   metrics.episode_length)?;
    out.set_item("metrics", m)?;

    Ok(out.into())
}

/// Run one episode. `config_json` (an `EpisodeConfig` JSON object) replaces
/// the keyword parameters when given.
#[pyfunction]
#[pyo3(signature = (
    prices, targets, *,
    trading_fees=0.0, borrow_interest_rate=0.0, portfolio_initial_value=1000.0,
    initial_position=0.0, settle_interest=false, max_episode_duration=None,
    config_json=None
))]
#[allow(clippy::too_many_arguments)]
pub fn simulate_episode(
    py: Python<'_>,
    prices:                  &PyArray1<f64>,
    targets:                 &PyArray1<f64>,
    trading_fees:            f64,
    borrow_interest_rate:    f64,
    portfolio_initial_value: f64,
    initial_position:        f64,
    settle_interest:         bool,
    max_episode_duration:    Option<usize>,
    config_json:             Option<&str>,
) -> PyResult<PyObject> {
    let config = match config_json {
        Some(raw) => EpisodeConfig::from_json(raw)?,
        None => EpisodeConfig {
            trading_fees,
            borrow_interest_rate,
            portfolio_initial_value,
            initial_position,
            settle_interest,
            max_episode_duration,
        },
    };

    let prices  = prices.readonly();
    let targets = targets.readonly();
    let (p, t)  = (prices.as_array(), targets.as_array());

    let hist = py.allow_threads(|| run_episode(p, t, &config))?;
    episode_to_py(py, hist, p, config.portfolio_initial_value)
}

#[pyfunction]
#[pyo3(signature = (
    prices, targets, *,
    trading_fees=0.0, borrow_interest_rate=0.0, portfolio_initial_value=1000.0,
    initial_position=0.0, settle_interest=false, max_episode_duration=None,
    config_json=None
))]
#[allow(clippy::too_many_arguments)]
pub fn simulate_batch(
    py: Python<'_>,
    prices:                  &PyArray1<f64>,
    targets:                 &PyArray2<f64>,
    trading_fees:            f64,
    borrow_interest_rate:    f64,
    portfolio_initial_value: f64,
    initial_position:        f64,
    settle_interest:         bool,
    max_episode_duration:    Option<usize>,
    config_json:             Option<&str>,
) -> PyResult<PyObject> {
    let config = match config_json {
        Some(raw) => EpisodeConfig::from_json(raw)?,
        None => EpisodeConfig {
            trading_fees,
            borrow_interest_rate,
            portfolio_initial_value,
            initial_position,
            settle_interest,
            max_episode_duration,
        },
    };

    let prices  = prices.readonly();
    let targets = targets.readonly();
    let (p, t)  = (prices.as_array(), targets.as_array());

    let histories = py.allow_threads(|| run_episodes(p, t, &config))?;

    let out = PyList::empty(py);
    for hist in histories {
        out.append(episode_to_py(py, hist, p, config.portfolio_initial_value)?)?;
    }
    Ok(out.into())
}

/// Install a fmt subscriber for the crate's tracing events.
/// `filter` takes `EnvFilter` directives; without it `RUST_LOG` is used, then "warn".
#[pyfunction]
#[pyo3(signature = (filter=None))]
pub fn init_logging(filter: Option<&str>) -> PyResult<()> {
    let filter = match filter {
        Some(directives) => {
            EnvFilter::try_new(directives).map_err(|e| PyValueError::new_err(e.to_string()))?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))
}
