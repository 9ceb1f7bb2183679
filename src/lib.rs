// src/lib.rs

//! Leveraged trading account for step-by-step market simulation.
//!
//! `Account` holds asset and cash balances (either may be negative, i.e.
//! borrowed), rebalances to a target exposure in closed form with
//! proportional fees, and accrues and settles borrow interest. `run_episode`
//! and `run_episodes` drive accounts over price series; with the `python`
//! feature the same surface is exported as a Python extension module.

pub mod engine;

pub use engine::{
    compute_episode_metrics, run_episode, run_episodes, target_account, Account, Distribution,
    EngineError, EpisodeConfig, EpisodeHistory, EpisodeMetrics, Trade,
};

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::wrap_pyfunction;

#[cfg(feature = "python")]
#[pymodule]
fn trading_account(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<engine::python::PyAccount>()?;
    m.add_function(wrap_pyfunction!(engine::python::simulate_episode, m)?)?;
    m.add_function(wrap_pyfunction!(engine::python::simulate_batch, m)?)?;
    m.add_function(wrap_pyfunction!(engine::python::init_logging, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
