// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::shutdown_signal::ShutdownSignal;
use map_reduce_core::worker_runtime::{Runnable, WorkerRuntime};
use thiserror::Error;
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;

/// How a worker task ended other than by returning
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    #[error("worker task panicked outside of job code")]
    Panicked,
    #[error("worker task was aborted")]
    Aborted,
}

/// Hosts every worker loop as a task on the ambient tokio runtime
#[derive(Clone, Copy)]
pub struct TokioRuntime;

impl<T> WorkerRuntime<T> for TokioRuntime
where
    T: Runnable<Output = ()>,
{
    type Handle = JoinHandle<()>;
    type Error = WorkerExit;

    fn spawn(task: T) -> Self::Handle {
        task::spawn(task.run())
    }

    async fn join(handle: Self::Handle) -> Result<(), WorkerExit> {
        handle.await.map_err(|e| {
            if e.is_panic() {
                WorkerExit::Panicked
            } else {
                WorkerExit::Aborted
            }
        })
    }
}

/// Cancellation shared by the CLI's Ctrl+C handler and every worker
#[derive(Clone, Default)]
pub struct TokenShutdownSignal {
    token: CancellationToken,
}

impl TokenShutdownSignal {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl ShutdownSignal for TokenShutdownSignal {
    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
