// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{JobError, RecordError};
use crate::records::parse_word_score;
use crate::shard::TextShard;
use map_reduce_core::map_reduce_job::{MapReduceJob, Record};
use map_reduce_core::partitioner::{bucket, Partitioner};
use rand::seq::index;
use rand::Rng;
use std::cmp::Reverse;

/// Net score of one word after stage 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordScore {
    pub word: String,
    pub score: i64,
}

/// Final output unit, keyed by score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub score: i64,
    pub word: String,
}

impl From<WordScore> for RankedEntry {
    fn from(word_score: WordScore) -> Self {
        Self {
            score: word_score.score,
            word: word_score.word,
        }
    }
}

impl From<RankedEntry> for (i64, String) {
    fn from(entry: RankedEntry) -> Self {
        (entry.score, entry.word)
    }
}

/// Splits the score axis into contiguous descending ranges.
///
/// Partition `i` holds scores in `[boundaries[i], boundaries[i - 1])`, so every
/// score in partition `i` is strictly greater than every score in partition
/// `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePartitioner {
    /// Strictly descending
    boundaries: Vec<i64>,
}

impl RangePartitioner {
    /// Place up to `num_partitions - 1` boundaries at the quantiles of a
    /// score sample. Repeated quantiles collapse into one boundary.
    pub fn from_sample(mut sample: Vec<i64>, num_partitions: usize) -> Self {
        sample.sort_unstable_by_key(|score| Reverse(*score));

        let mut boundaries: Vec<i64> = Vec::new();
        if !sample.is_empty() {
            for i in 1..num_partitions {
                let boundary = sample[i * sample.len() / num_partitions];
                match boundaries.last() {
                    Some(&last) if boundary >= last => {}
                    _ => boundaries.push(boundary),
                }
            }
        }

        Self { boundaries }
    }

    pub fn boundaries(&self) -> &[i64] {
        &self.boundaries
    }
}

impl Partitioner<i64> for RangePartitioner {
    fn num_partitions(&self) -> usize {
        self.boundaries.len() + 1
    }

    fn partition(&self, score: &i64) -> usize {
        self.boundaries.partition_point(|boundary| *score < *boundary)
    }
}

/// Draw up to `sample_size` scores uniformly from the intermediate records
pub fn sample_scores<R: Rng + ?Sized>(
    shards: &[TextShard],
    sample_size: usize,
    rng: &mut R,
) -> Result<Vec<i64>, JobError> {
    let records: Vec<(&TextShard, usize, &str)> = shards
        .iter()
        .flat_map(|shard| shard.records().map(move |(line, record)| (shard, line, record)))
        .collect();

    let amount = sample_size.min(records.len());
    index::sample(rng, records.len(), amount)
        .into_iter()
        .map(|i| {
            let (shard, line, record) = records[i];
            parse_score_record(shard, line, record).map(|word_score| word_score.score)
        })
        .collect()
}

fn parse_score_record(shard: &TextShard, line: usize, record: &str) -> Result<WordScore, JobError> {
    parse_word_score(record)
        .map(|(word, score)| WordScore { word, score })
        .map_err(|reason: RecordError| JobError::MalformedRecord {
            source_name: shard.source.clone(),
            line,
            reason,
        })
}

/// Stage 2: re-key word scores by score and sort them descending across
/// range partitions
#[derive(Debug, Clone)]
pub struct RankJob {
    partitioner: RangePartitioner,
}

impl RankJob {
    pub fn new(partitioner: RangePartitioner) -> Self {
        Self { partitioner }
    }

    pub fn partitioner(&self) -> &RangePartitioner {
        &self.partitioner
    }
}

impl MapReduceJob for RankJob {
    type MapAssignment = TextShard;
    type Key = i64;
    type Value = String;
    type Error = JobError;

    fn num_partitions(&self) -> usize {
        self.partitioner.num_partitions()
    }

    fn task_id(assignment: &Self::MapAssignment) -> usize {
        assignment.shard_id
    }

    fn map_work(&self, shard: &TextShard) -> Result<Vec<Vec<Record<Self>>>, JobError> {
        let entries = shard
            .records()
            .map(|(line, record)| {
                parse_score_record(shard, line, record)
                    .map(|word_score| <(i64, String)>::from(RankedEntry::from(word_score)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bucket(&self.partitioner, entries))
    }

    /// Score descending only; tied words keep no particular order
    fn reduce_work(
        &self,
        _partition: usize,
        mut records: Vec<Record<Self>>,
    ) -> Result<Vec<Record<Self>>, JobError> {
        records.sort_unstable_by_key(|(score, _)| Reverse(*score));
        Ok(records)
    }
}
