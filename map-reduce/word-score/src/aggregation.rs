// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::JobError;
use crate::review::Review;
use crate::scorer::score;
use crate::shard::TextShard;
use map_reduce_core::map_reduce_job::{MapReduceJob, Record};
use map_reduce_core::partitioner::{bucket, HashPartitioner, Partitioner};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Grouped summation of (word, delta) records.
///
/// Serves as both combiner and reducer: integer addition is associative and
/// commutative, so any grouping of partial sums yields the same totals.
/// A record without a word cannot be attributed and is dropped.
pub fn aggregate(records: impl IntoIterator<Item = (String, i64)>) -> Vec<(String, i64)> {
    let mut scores: HashMap<String, i64> = HashMap::new();
    for (word, delta) in records {
        if word.is_empty() {
            warn!(delta, "aggregation anomaly: dropping contribution without a word");
            continue;
        }
        *scores.entry(word).or_insert(0) += delta;
    }
    scores.into_iter().collect()
}

/// Stage 1: score every token occurrence and sum per word
#[derive(Debug, Clone)]
pub struct WordScoreJob {
    partitioner: HashPartitioner,
    combine: bool,
}

impl WordScoreJob {
    pub fn new(num_partitions: usize, combine: bool) -> Self {
        Self {
            partitioner: HashPartitioner::new(num_partitions),
            combine,
        }
    }
}

impl MapReduceJob for WordScoreJob {
    type MapAssignment = TextShard;
    type Key = String;
    type Value = i64;
    type Error = JobError;

    fn num_partitions(&self) -> usize {
        Partitioner::<str>::num_partitions(&self.partitioner)
    }

    fn task_id(assignment: &Self::MapAssignment) -> usize {
        assignment.shard_id
    }

    fn map_work(&self, shard: &TextShard) -> Result<Vec<Vec<Record<Self>>>, JobError> {
        let mut contributions = Vec::new();
        let mut reviews = 0;

        for (line, record) in shard.records() {
            let scored = Review::parse(record)
                .map(|review| score(&review))
                .map_err(|reason| JobError::MalformedRecord {
                    source_name: shard.source.clone(),
                    line,
                    reason,
                })?;
            contributions.extend(scored.into_iter().map(<(String, i64)>::from));
            reviews += 1;
        }

        if reviews < shard.lines.len() {
            debug!(
                shard = shard.shard_id,
                skipped = shard.lines.len() - reviews,
                "skipped blank lines"
            );
        }

        let records = if self.combine {
            aggregate(contributions)
        } else {
            contributions
        };
        Ok(bucket(&self.partitioner, records))
    }

    fn reduce_work(
        &self,
        _partition: usize,
        records: Vec<Record<Self>>,
    ) -> Result<Vec<Record<Self>>, JobError> {
        Ok(aggregate(records))
    }
}
