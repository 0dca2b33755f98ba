// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::config::Config;
use map_reduce_core::error::PhaseError;
use map_reduce_core::map_reduce_job::{MapReduceJob, Record};
use map_reduce_core::partitioner::{bucket, HashPartitioner};
use map_reduce_task_channels::stage::run_stage;
use map_reduce_task_channels::TokenShutdownSignal;
use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Sums numbers by parity. Panics on the first attempt of every listed
/// assignment and rejects assignments holding 13.
struct ParityJob {
    partitioner: HashPartitioner,
    panic_once: Mutex<HashSet<usize>>,
    map_calls: AtomicUsize,
}

impl ParityJob {
    fn new(panic_once: impl IntoIterator<Item = usize>) -> Self {
        Self {
            partitioner: HashPartitioner::new(2),
            panic_once: Mutex::new(panic_once.into_iter().collect()),
            map_calls: AtomicUsize::new(0),
        }
    }
}

impl MapReduceJob for ParityJob {
    type MapAssignment = (usize, Vec<u64>);
    type Key = String;
    type Value = u64;
    type Error = io::Error;

    fn num_partitions(&self) -> usize {
        2
    }

    fn task_id(assignment: &Self::MapAssignment) -> usize {
        assignment.0
    }

    fn map_work(&self, (id, numbers): &Self::MapAssignment) -> Result<Vec<Vec<Record<Self>>>, io::Error> {
        self.map_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_once.lock().unwrap().remove(id) {
            panic!("first attempt of {id}");
        }
        if numbers.contains(&13) {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "unlucky"));
        }
        let records = numbers.iter().map(|n| {
            let parity = if n % 2 == 0 { "even" } else { "odd" };
            (parity.to_string(), *n)
        });
        Ok(bucket(&self.partitioner, records))
    }

    fn reduce_work(&self, _partition: usize, records: Vec<Record<Self>>) -> Result<Vec<Record<Self>>, io::Error> {
        let mut sums: Vec<(String, u64)> = Vec::new();
        for (key, value) in records {
            match sums.iter_mut().find(|(k, _)| *k == key) {
                Some((_, sum)) => *sum += value,
                None => sums.push((key, value)),
            }
        }
        Ok(sums)
    }
}

fn config() -> Config {
    Config {
        num_mappers: 2,
        num_reducers: 2,
        max_task_attempts: 3,
        ..Config::default()
    }
}

fn shutdown() -> TokenShutdownSignal {
    TokenShutdownSignal::new(CancellationToken::new())
}

fn assignments() -> Vec<(usize, Vec<u64>)> {
    vec![(0, vec![1, 2, 3]), (1, vec![4, 5]), (2, vec![6]), (3, vec![7, 8, 9])]
}

fn totals(output: Vec<Vec<(String, u64)>>) -> Vec<(String, u64)> {
    let mut totals: Vec<_> = output.into_iter().flatten().collect();
    totals.sort();
    totals
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stage_sums_every_assignment() {
    let job = Arc::new(ParityJob::new([]));
    let output = run_stage("parity", Arc::clone(&job), assignments(), &config(), &shutdown())
        .await
        .unwrap();

    assert_eq!(output.len(), 2);
    assert_eq!(
        totals(output),
        vec![("even".to_string(), 20), ("odd".to_string(), 25)]
    );
    assert_eq!(job.map_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_panicking_mapper_is_replaced() {
    let job = Arc::new(ParityJob::new([1, 3]));
    let output = run_stage("parity", Arc::clone(&job), assignments(), &config(), &shutdown())
        .await
        .unwrap();

    assert_eq!(
        totals(output),
        vec![("even".to_string(), 20), ("odd".to_string(), 25)]
    );
    assert_eq!(job.map_calls.load(Ordering::SeqCst), 6);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_assignment_exhausts_attempts() {
    let job = Arc::new(ParityJob::new([]));
    let mut work = assignments();
    work.push((4, vec![12, 13]));

    let err = run_stage("parity", job, work, &config(), &shutdown())
        .await
        .unwrap_err();

    assert_eq!(err, PhaseError::TaskFailed { task: 4, attempts: 3 });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stage_without_mappers_fails() {
    let job = Arc::new(ParityJob::new([]));
    let config = Config {
        num_mappers: 0,
        ..config()
    };

    let err = run_stage("parity", job, assignments(), &config, &shutdown())
        .await
        .unwrap_err();

    assert_eq!(err, PhaseError::NoWorkers { pending: 4 });
}
