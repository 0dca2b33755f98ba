// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Decides which reduce partition receives a key
pub trait Partitioner<K: ?Sized>: Send + Sync {
    fn num_partitions(&self) -> usize;

    /// Always less than `num_partitions`
    fn partition(&self, key: &K) -> usize;
}

/// Co-locates identical keys by hashing them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashPartitioner {
    num_partitions: usize,
}

impl HashPartitioner {
    pub fn new(num_partitions: usize) -> Self {
        Self {
            num_partitions: num_partitions.max(1),
        }
    }
}

impl<K: Hash + ?Sized> Partitioner<K> for HashPartitioner {
    fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    fn partition(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.num_partitions as u64) as usize
    }
}

/// Group records into one bucket per partition
pub fn bucket<K, V, P>(partitioner: &P, records: impl IntoIterator<Item = (K, V)>) -> Vec<Vec<(K, V)>>
where
    P: Partitioner<K> + ?Sized,
{
    let mut buckets: Vec<Vec<(K, V)>> = (0..partitioner.num_partitions())
        .map(|_| Vec::new())
        .collect();
    for (key, value) in records {
        let partition = partitioner.partition(&key);
        buckets[partition].push((key, value));
    }
    buckets
}
