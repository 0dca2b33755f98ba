// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::future::Future;

/// Completion signaling between the executor and its workers
pub trait WorkerSynchronization: Send {
    /// The sender handed to workers with every assignment
    type StatusSender: Clone + Send;

    /// Setup signaling for N workers
    fn setup(num_workers: usize) -> Self;

    fn get_status_sender(&self, worker_id: usize) -> Self::StatusSender;

    /// Wait for the next worker to complete or fail.
    /// Ok(worker_id) on success, Err(worker_id) on failure, None when every
    /// channel is closed.
    fn wait_next(&mut self) -> impl Future<Output = Option<Result<usize, usize>>> + Send;

    /// Discard whatever the old worker in this slot still has in flight and
    /// return a sender for its replacement
    fn reset_worker(&mut self, worker_id: usize)
        -> impl Future<Output = Self::StatusSender> + Send;
}
