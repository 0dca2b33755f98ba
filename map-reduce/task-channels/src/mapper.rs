// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::channel_status_sender::ChannelStatusSender;
use crate::fault_injection::{maybe_straggle, should_fail};
use crate::work_channel::{work_channel, WorkInbox, WorkQueue};
use async_trait::async_trait;
use map_reduce_core::config::FaultConfig;
use map_reduce_core::map_reduce_job::MapReduceJob;
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

const ROLE: &str = "mapper";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The loop a mapper runs on its runtime
pub struct MapperTask<J, S, SD>
where
    J: MapReduceJob,
{
    id: usize,
    job: Arc<J>,
    store: S,
    shutdown_signal: SD,
    faults: FaultConfig,
    work_rx: WorkInbox<J::MapAssignment, ChannelStatusSender>,
}

#[async_trait]
impl<J, S, SD> Runnable for MapperTask<J, S, SD>
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
    SD: ShutdownSignal,
{
    type Output = ();

    async fn run(mut self) {
        loop {
            if self.shutdown_signal.is_cancelled() {
                debug!(mapper = self.id, "cancelled");
                break;
            }

            match tokio::time::timeout(POLL_INTERVAL, self.work_rx.recv()).await {
                Ok(Some((assignment, status))) => {
                    let succeeded = map_assignment(
                        self.id,
                        &self.job,
                        &self.store,
                        &self.faults,
                        &assignment,
                    )
                    .await;
                    let message = if succeeded { Ok(self.id) } else { Err(()) };
                    if !status.send(message).await {
                        debug!(mapper = self.id, "executor stopped listening");
                    }
                }
                Ok(None) => break,
                Err(_) => continue,
            }
        }
    }
}

async fn map_assignment<J, S>(
    id: usize,
    job: &Arc<J>,
    store: &S,
    faults: &FaultConfig,
    assignment: &J::MapAssignment,
) -> bool
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
{
    if should_fail(faults, ROLE, id) {
        return false;
    }
    maybe_straggle(faults, ROLE, id).await;

    let task_id = J::task_id(assignment);
    match catch_unwind(AssertUnwindSafe(|| job.map_work(assignment))) {
        Ok(Ok(buckets)) => {
            if !store.commit_map_output(task_id, buckets).await {
                debug!(mapper = id, task_id, "output already committed by another attempt");
            }
            true
        }
        Ok(Err(e)) => {
            error!(mapper = id, task_id, error = %e, "map task failed");
            false
        }
        Err(_) => {
            error!(mapper = id, task_id, "mapper panicked during work");
            false
        }
    }
}

/// Mapper worker that runs map assignments of a job and commits their
/// bucketed output to the shuffle store
pub struct Mapper<J, S, R, SD>
where
    J: MapReduceJob,
    R: WorkerRuntime<MapperTask<J, S, SD>>,
{
    work_sender: WorkQueue<J::MapAssignment, ChannelStatusSender>,
    task_handle: R::Handle,
    _phantom: PhantomData<(J, S, SD)>,
}

impl<J, S, R, SD> Mapper<J, S, R, SD>
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
    R: WorkerRuntime<MapperTask<J, S, SD>>,
    SD: ShutdownSignal,
{
    pub fn new(id: usize, job: Arc<J>, store: S, shutdown_signal: SD, faults: FaultConfig) -> Self {
        let (work_sender, work_rx) = work_channel();
        let task = MapperTask {
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

impl<J, S, R, SD> Worker for Mapper<J, S, R, SD>
where
    J: MapReduceJob,
    S: ShuffleStore<J::Key, J::Value>,
    R: WorkerRuntime<MapperTask<J, S, SD>>,
    SD: ShutdownSignal,
{
    type Assignment = J::MapAssignment;
    type Completion = ChannelStatusSender;
    type Error = R::Error;

    fn send_work(&self, assignment: Self::Assignment, completion: Self::Completion) {
        self.work_sender.send_work(assignment, completion);
    }

    async fn wait(self) -> Result<(), Self::Error> {
        // Closing the channel lets the loop exit
        drop(self.work_sender);
        R::join(self.task_handle).await
    }
}
