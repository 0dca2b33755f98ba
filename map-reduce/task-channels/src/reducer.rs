// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::channel_status_sender::ChannelStatusSender;
use crate::fault_injection::{maybe_straggle, should_fail};
use crate::work_channel::{work_channel, WorkInbox, WorkQueue};
use async_trait::async_trait;
use map_reduce_core::config::FaultConfig;
use map_reduce_core::map_reduce_job::{MapReduceJob, ReduceAssignment};
use map_reduce_core::shuffle_store::ShuffleStore;
use map_reduce_core::shutdown_signal::ShutdownSignal;
use map_reduce_core::status_sender::StatusSender;
use map_reduce_core::work_receiver::WorkReceiver;
use map_reduce_core::work_sender::WorkSender;
use map_reduce_core::worker::Worker;
use map_reduce_core::worker_runtime::{Runnable, WorkerRuntime};
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

const ROLE: &str = "reducer";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ReducerTask<J, S, SD> {
    id: usize,
    job: Arc<J>,
    store: S,
    shutdown_signal: SD,
    faults: FaultConfig,
    work_rx: WorkInbox<ReduceAssignment, ChannelStatusSender>,
}

#[async_trait]
impl<J, S, SD> Runnable for ReducerTask<J, S, SD>
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
    SD: ShutdownSignal,
{
    type Output = ();

    async fn run(mut self) {
        loop {
            if self.shutdown_signal.is_cancelled() {
                debug!(reducer = self.id, "cancelled");
                break;
            }

            match tokio::time::timeout(POLL_INTERVAL, self.work_rx.recv()).await {
                Ok(Some((assignment, status))) => {
                    let succeeded =
                        reduce_partition(self.id, &self.job, &self.store, &self.faults, assignment)
                            .await;
                    let message = if succeeded { Ok(self.id) } else { Err(()) };
                    if !status.send(message).await {
                        debug!(reducer = self.id, "executor stopped listening");
                    }
                }
                Ok(None) => break,
                Err(_) => continue,
            }
        }
    }
}

async fn reduce_partition<J, S>(
    id: usize,
    job: &Arc<J>,
    store: &S,
    faults: &FaultConfig,
    assignment: ReduceAssignment,
) -> bool
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
{
    if should_fail(faults, ROLE, id) {
        return false;
    }
    maybe_straggle(faults, ROLE, id).await;

    let partition = assignment.partition;
    let records = store.partition_input(partition).await;
    match catch_unwind(AssertUnwindSafe(|| job.reduce_work(partition, records))) {
        Ok(Ok(output)) => {
            if !store.commit_reduce_output(partition, output).await {
                debug!(reducer = id, partition, "output already committed by another attempt");
            }
            true
        }
        Ok(Err(e)) => {
            error!(reducer = id, partition, error = %e, "reduce task failed");
            false
        }
        Err(_) => {
            error!(reducer = id, partition, "reducer panicked during work");
            false
        }
    }
}

/// Reducer worker that aggregates one shuffle partition per assignment
pub struct Reducer<J, S, R, SD>
where
    R: WorkerRuntime<ReducerTask<J, S, SD>>,
{
    work_sender: WorkQueue<ReduceAssignment, ChannelStatusSender>,
    task_handle: R::Handle,
    _phantom: PhantomData<(J, S, SD)>,
}

impl<J, S, R, SD> Reducer<J, S, R, SD>
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
    R: WorkerRuntime<ReducerTask<J, S, SD>>,
    SD: ShutdownSignal,
{
    pub fn new(id: usize, job: Arc<J>, store: S, shutdown_signal: SD, faults: FaultConfig) -> Self {
        let (work_sender, work_rx) = work_channel();
        let task = ReducerTask {
            id,
            job,
            store,
            shutdown_signal,
            faults,
            work_rx,
        };

        Self {
            work_sender,
            task_handle: R::spawn(task),
            _phantom: PhantomData,
        }
    }
}

impl<J, S, R, SD> Worker for Reducer<J, S, R, SD>
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
    R: WorkerRuntime<ReducerTask<J, S, SD>>,
    SD: ShutdownSignal,
{
    type Assignment = ReduceAssignment;
    type Completion = ChannelStatusSender;
    type Error = R::Error;

    fn send_work(&self, assignment: Self::Assignment, completion: Self::Completion) {
        self.work_sender.send_work(assignment, completion);
    }

    async fn wait(self) -> Result<(), Self::Error> {
        drop(self.work_sender);
        R::join(self.task_handle).await
    }
}
