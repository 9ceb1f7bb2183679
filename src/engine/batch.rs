// src/engine/batch.rs

use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;
use tracing::debug;

use crate::engine::config::EpisodeConfig;
use crate::engine::episode::{run_episode, EpisodeHistory};
use crate::engine::error::Result;

/// One episode per row of `targets`, all over the same `prices`, run in parallel.
///
/// Each episode builds its own account; nothing is shared between rows.
pub fn run_episodes(
    prices: ArrayView1<f64>,
    targets: ArrayView2<f64>,
    config: &EpisodeConfig,
) -> Result<Vec<EpisodeHistory>> {
    config.validate()?;
    debug!(episodes = targets.nrows(), steps = targets.ncols(), "dispatching episode batch");

    (0..targets.nrows())
        .into_par_iter()
        .map(|i| run_episode(prices, targets.row(i), config))
        .collect()
}
