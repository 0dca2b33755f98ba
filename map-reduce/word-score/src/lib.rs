// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Star-rating word sentiment scoring.
//!
//! Stage 1 ([`WordScoreJob`]) scores every token of every review by the
//! review's rating and sums the contributions per word. Stage 2
//! ([`RankJob`]) re-keys the word scores by score and range-partitions them
//! so that the concatenated reduce outputs form one descending order.

pub mod aggregation;
pub mod error;
pub mod pipeline_state;
pub mod rank;
pub mod records;
pub mod review;
pub mod scorer;
pub mod shard;

pub use aggregation::WordScoreJob;
pub use error::{JobError, RecordError};
pub use pipeline_state::{PipelineState, PipelineTracker, StageError};
pub use rank::{RangePartitioner, RankJob, RankedEntry, WordScore};
pub use review::Review;
pub use shard::TextShard;
