// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::shuffle_store::ShuffleStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

struct ShuffleState<K, V> {
    map_outputs: HashMap<usize, Vec<Vec<(K, V)>>>,
    reduce_outputs: BTreeMap<usize, Vec<(K, V)>>,
}

/// Local in-memory shuffle using Arc<Mutex<..>>
pub struct InMemoryShuffleStore<K, V> {
    state: Arc<Mutex<ShuffleState<K, V>>>,
}

impl<K, V> Clone for InMemoryShuffleStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<K, V> Default for InMemoryShuffleStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InMemoryShuffleStore<K, V> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ShuffleState {
                map_outputs: HashMap::new(),
                reduce_outputs: BTreeMap::new(),
            })),
        }
    }

    /// Number of map units whose output has been committed
    pub async fn committed_map_tasks(&self) -> usize {
        self.state.lock().await.map_outputs.len()
    }
}

#[async_trait]
impl<K, V> ShuffleStore<K, V> for InMemoryShuffleStore<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn commit_map_output(&self, task_id: usize, buckets: Vec<Vec<(K, V)>>) -> bool {
        let mut state = self.state.lock().await;
        if state.map_outputs.contains_key(&task_id) {
            debug!(task_id, "discarding superseded map output");
            return false;
        }
        state.map_outputs.insert(task_id, buckets);
        true
    }

    async fn partition_input(&self, partition: usize) -> Vec<(K, V)> {
        let state = self.state.lock().await;
        let mut task_ids: Vec<_> = state.map_outputs.keys().copied().collect();
        task_ids.sort_unstable();

        task_ids
            .iter()
            .filter_map(|task_id| state.map_outputs.get(task_id))
            .filter_map(|buckets| buckets.get(partition))
            .flat_map(|records| records.iter().cloned())
            .collect()
    }

    async fn commit_reduce_output(&self, partition: usize, records: Vec<(K, V)>) -> bool {
        let mut state = self.state.lock().await;
        if state.reduce_outputs.contains_key(&partition) {
            debug!(partition, "discarding superseded reduce output");
            return false;
        }
        state.reduce_outputs.insert(partition, records);
        true
    }

    async fn reduce_output(&self) -> Vec<Vec<(K, V)>> {
        self.state
            .lock()
            .await
            .reduce_outputs
            .values()
            .cloned()
            .collect()
    }
}
