// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Tokio task and channel runtime for the word score pipeline.
//!
//! Mappers and reducers are tokio tasks fed through mpsc channels. The
//! executor from `map_reduce_core` distributes assignments, replaces failed
//! or straggling workers and acts as the barrier between phases.

pub mod channel_status_sender;
pub mod channel_worker_synchronization;
pub mod error;
pub mod fault_injection;
pub mod files;
pub mod mapper;
pub mod pipeline;
pub mod reducer;
pub mod stage;
pub mod task_worker_factory;
pub mod tokio_runtime;
pub mod types;
pub mod work_channel;

pub use error::PipelineError;
pub use pipeline::{RankSummary, ScoreArtifact, WordScorePipeline};
pub use tokio_runtime::{TokenShutdownSignal, TokioRuntime};
