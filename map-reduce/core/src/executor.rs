// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::PhaseError;
use crate::shutdown_signal::ShutdownSignal;
use crate::worker::Worker;
use crate::worker_factory::WorkerFactory;
use crate::worker_synchronization::WorkerSynchronization;
use std::cmp::max;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::mem;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Assignment tracking information
#[derive(Clone)]
struct AssignmentInfo<A> {
    index: usize,
    assignment: A,
    attempt: u32,
    start_time: Instant,
}

/// Phase executor with bounded retries and straggler detection.
/// Generic over worker type, synchronization signaling, and worker factory.
pub struct Executor<W, WS, F>
where
    W: Worker,
    WS: WorkerSynchronization,
    F: WorkerFactory<W>,
{
    worker_factory: F,
    timeout: Option<Duration>,
    max_attempts: u32,
    _phantom: PhantomData<(W, WS)>,
}

impl<W, WS, F> Executor<W, WS, F>
where
    W: Worker,
    WS: WorkerSynchronization,
    F: WorkerFactory<W>,
{
    pub fn new(worker_factory: F, timeout_ms: u64, max_attempts: u32) -> Self {
        Self {
            worker_factory,
            timeout: if timeout_ms > 0 {
                Some(Duration::from_millis(timeout_ms))
            } else {
                None
            },
            max_attempts: max(max_attempts, 1),
            _phantom: PhantomData,
        }
    }
}

impl<W, WS, F> Executor<W, WS, F>
where
    W: Worker,
    WS: WorkerSynchronization,
    W::Completion: From<WS::StatusSender>,
    W::Assignment: Clone,
    F: WorkerFactory<W>,
{
    /// Run every assignment to successful completion.
    ///
    /// Returns the (possibly respawned) workers once all assignments are done,
    /// which makes the call a barrier for whatever runs next.
    pub async fn execute<SD>(
        &mut self,
        mut workers: Vec<W>,
        assignments: Vec<W::Assignment>,
        shutdown_signal: &SD,
    ) -> Result<Vec<W>, PhaseError>
    where
        SD: ShutdownSignal,
    {
        if assignments.is_empty() {
            return Ok(workers);
        }
        if workers.is_empty() {
            return Err(PhaseError::NoWorkers {
                pending: assignments.len(),
            });
        }

        let mut signaling = WS::setup(workers.len());
        let mut pending = assignments.into_iter().enumerate();
        let mut worker_assignments: HashMap<usize, AssignmentInfo<W::Assignment>> = HashMap::new();

        // Distribute initial assignments
        for (worker_id, worker) in workers.iter().enumerate() {
            let Some((index, assignment)) = pending.next() else {
                break;
            };
            let completion = signaling.get_status_sender(worker_id);
            worker.send_work(assignment.clone(), completion.into());
            worker_assignments.insert(worker_id, AssignmentInfo::first(index, assignment));
        }

        // Always wake up periodically to check for shutdown and stragglers
        let wait_duration = self
            .timeout
            .map(|t| t / 10)
            .unwrap_or(Duration::from_millis(100));
        let wait_duration = max(wait_duration, Duration::from_millis(10));

        while !worker_assignments.is_empty() {
            if shutdown_signal.is_cancelled() {
                warn!(
                    outstanding = worker_assignments.len(),
                    "shutdown signal received, abandoning phase"
                );
                return Err(PhaseError::Cancelled);
            }

            if let Some(timeout_duration) = self.timeout {
                let stragglers: Vec<usize> = worker_assignments
                    .iter()
                    .filter(|(_, info)| info.start_time.elapsed() > timeout_duration)
                    .map(|(worker_id, _)| *worker_id)
                    .collect();

                for worker_id in stragglers {
                    if let Some(info) = worker_assignments.remove(&worker_id) {
                        warn!(
                            worker_id,
                            task = info.index,
                            attempt = info.attempt,
                            "straggler exceeded timeout, re-executing on a fresh worker"
                        );
                        let info = self
                            .retry(&mut workers, &mut signaling, worker_id, info)
                            .await?;
                        worker_assignments.insert(worker_id, info);
                    }
                }
            }

            let completion = match tokio::time::timeout(wait_duration, signaling.wait_next()).await {
                Ok(completion) => completion,
                // Loop around to check for stragglers and shutdown
                Err(_) => continue,
            };

            match completion {
                Some(Ok(worker_id)) => {
                    let Some(done) = worker_assignments.remove(&worker_id) else {
                        debug!(worker_id, "ignoring completion from an idle worker");
                        continue;
                    };
                    debug!(worker_id, task = done.index, "task completed");

                    if let Some((index, assignment)) = pending.next() {
                        let completion = signaling.get_status_sender(worker_id);
                        workers[worker_id].send_work(assignment.clone(), completion.into());
                        worker_assignments.insert(worker_id, AssignmentInfo::first(index, assignment));
                    }
                }
                Some(Err(worker_id)) => {
                    if let Some(info) = worker_assignments.remove(&worker_id) {
                        warn!(
                            worker_id,
                            task = info.index,
                            attempt = info.attempt,
                            "worker failed, respawning and reassigning work"
                        );
                        let info = self
                            .retry(&mut workers, &mut signaling, worker_id, info)
                            .await?;
                        worker_assignments.insert(worker_id, info);
                    }
                }
                None => {
                    return Err(PhaseError::SignalingClosed {
                        pending: worker_assignments.len(),
                    });
                }
            }
        }

        Ok(workers)
    }

    /// Replace the worker in `worker_id` and hand it the same assignment again
    async fn retry(
        &mut self,
        workers: &mut [W],
        signaling: &mut WS,
        worker_id: usize,
        info: AssignmentInfo<W::Assignment>,
    ) -> Result<AssignmentInfo<W::Assignment>, PhaseError> {
        if info.attempt >= self.max_attempts {
            error!(
                task = info.index,
                attempts = info.attempt,
                "task exhausted its attempts"
            );
            return Err(PhaseError::TaskFailed {
                task: info.index,
                attempts: info.attempt,
            });
        }

        let replacement = self.worker_factory.create_worker(worker_id);
        let failed_worker = mem::replace(&mut workers[worker_id], replacement);
        drop(failed_worker);

        // Stale signals from the replaced worker must not count for the new one
        let completion = signaling.reset_worker(worker_id).await;
        workers[worker_id].send_work(info.assignment.clone(), completion.into());

        Ok(AssignmentInfo {
            index: info.index,
            assignment: info.assignment,
            attempt: info.attempt + 1,
            start_time: Instant::now(),
        })
    }
}

impl<A> AssignmentInfo<A> {
    fn first(index: usize, assignment: A) -> Self {
        Self {
            index,
            assignment,
            attempt: 1,
            start_time: Instant::now(),
        }
    }
}
