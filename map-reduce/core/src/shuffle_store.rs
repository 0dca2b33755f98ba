// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;

/// Exchange between the map and reduce side of a stage.
/// Abstracts the storage mechanism (local memory, files, RPC).
///
/// Units hand over immutable record sets. A unit is identified by its task id
/// (map side) or partition (reduce side) and only its first committed output
/// counts, so a retried or straggling attempt can never be merged twice.
#[async_trait]
pub trait ShuffleStore<K, V>: Clone + Send + Sync + 'static
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Publish the bucketed output of a map unit.
    /// Returns false if an earlier attempt of the same unit already committed.
    async fn commit_map_output(&self, task_id: usize, buckets: Vec<Vec<(K, V)>>) -> bool;

    /// Everything committed map units produced for one partition
    async fn partition_input(&self, partition: usize) -> Vec<(K, V)>;

    /// Publish the output of a reduce unit.
    /// Returns false if an earlier attempt of the same partition already committed.
    async fn commit_reduce_output(&self, partition: usize, records: Vec<(K, V)>) -> bool;

    /// Committed reduce outputs in ascending partition order
    async fn reduce_output(&self) -> Vec<Vec<(K, V)>>;
}
