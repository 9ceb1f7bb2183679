// src/engine/mod.rs

pub mod account;
pub mod batch;
pub mod config;
pub mod episode;
pub mod error;
pub mod metrics;
pub mod prepare_inputs;
#[cfg(feature = "python")]
pub mod python;

pub use account::{target_account, Account, Distribution, Trade};
pub use batch::run_episodes;
pub use config::EpisodeConfig;
pub use episode::{run_episode, EpisodeHistory};
pub use error::{EngineError, Result};
pub use metrics::{compute_episode_metrics, EpisodeMetrics};
