// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::executor::Executor;
use crate::worker::Worker;
use crate::worker_factory::WorkerFactory;
use crate::worker_synchronization::WorkerSynchronization;
use tracing::warn;

/// Build the initial worker pool of a phase and the executor that drives it
pub fn initialize_phase<W, WS, F>(
    num_workers: usize,
    mut factory: F,
    timeout_ms: u64,
    max_attempts: u32,
) -> (Vec<W>, Executor<W, WS, F>)
where
    W: Worker,
    WS: WorkerSynchronization,
    F: WorkerFactory<W>,
{
    let workers = (0..num_workers)
        .map(|id| factory.create_worker(id))
        .collect();

    let executor = Executor::new(factory, timeout_ms, max_attempts);

    (workers, executor)
}

/// Close every worker's channel and wait for its loop to exit
pub async fn shutdown_workers<W: Worker>(role: &str, workers: Vec<W>) {
    for (idx, worker) in workers.into_iter().enumerate() {
        if let Err(e) = worker.wait().await {
            warn!(role, worker_id = idx, error = %e, "worker shutdown failed");
        }
    }
}
