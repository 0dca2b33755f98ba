// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::error::Error;

/// Records exchanged between the map and reduce side of a job
pub type Record<J> = (<J as MapReduceJob>::Key, <J as MapReduceJob>::Value);

/// One stage of a computation expressed as map + shuffle + reduce.
/// Abstracts the job domain from the execution model.
///
/// Both work functions must be pure: the executor re-runs them when a unit
/// fails or straggles, and only the first successful output of a unit is
/// kept.
pub trait MapReduceJob: Sized + Send + Sync + 'static {
    /// One shard of the stage input
    type MapAssignment: Clone + Send + Sync + 'static;

    type Key: Clone + Send + Sync + 'static;

    type Value: Clone + Send + Sync + 'static;

    type Error: Error + Send + Sync + 'static;

    /// Number of reduce partitions the map output is bucketed into
    fn num_partitions(&self) -> usize;

    /// Stable identity of a map unit across retries
    fn task_id(assignment: &Self::MapAssignment) -> usize;

    /// Map one shard. The result holds exactly `num_partitions` buckets.
    fn map_work(&self, assignment: &Self::MapAssignment)
        -> Result<Vec<Vec<Record<Self>>>, Self::Error>;

    /// Reduce everything the shuffle delivered for one partition
    fn reduce_work(
        &self,
        partition: usize,
        records: Vec<Record<Self>>,
    ) -> Result<Vec<Record<Self>>, Self::Error>;
}

/// Reduce side unit of work: one partition of the shuffle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceAssignment {
    pub partition: usize,
}

impl ReduceAssignment {
    pub fn new(partition: usize) -> Self {
        Self { partition }
    }

    /// One assignment per partition, in partition order
    pub fn for_partitions(num_partitions: usize) -> Vec<Self> {
        (0..num_partitions).map(Self::new).collect()
    }
}
