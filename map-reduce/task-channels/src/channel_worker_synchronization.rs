// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::channel_status_sender::ChannelStatusSender;
use map_reduce_core::status_sender::CompletionMessage;
use map_reduce_core::worker_synchronization::WorkerSynchronization;
use std::time::Duration;
use tokio::sync::mpsc::{self, Sender};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{StreamExt, StreamMap};
use tracing::debug;

const COMPLETION_BUFFER: usize = 10;

/// Channel-based completion signaling using tokio mpsc and StreamMap.
/// Each worker slot owns one channel, so a failure is attributed to the slot
/// it arrives on.
pub struct ChannelWorkerSynchronization {
    completion_txs: Vec<Sender<CompletionMessage>>,
    completion_streams: StreamMap<usize, ReceiverStream<CompletionMessage>>,
}

impl WorkerSynchronization for ChannelWorkerSynchronization {
    type StatusSender = ChannelStatusSender;

    fn setup(num_workers: usize) -> Self {
        let mut completion_txs = Vec::with_capacity(num_workers);
        let mut completion_streams = StreamMap::new();

        for worker_id in 0..num_workers {
            let (tx, rx) = mpsc::channel::<CompletionMessage>(COMPLETION_BUFFER);
            completion_txs.push(tx);
            completion_streams.insert(worker_id, ReceiverStream::new(rx));
        }

        Self {
            completion_txs,
            completion_streams,
        }
    }

    fn get_status_sender(&self, worker_id: usize) -> Self::StatusSender {
        ChannelStatusSender {
            tx: self.completion_txs[worker_id].clone(),
        }
    }

    async fn reset_worker(&mut self, worker_id: usize) -> Self::StatusSender {
        if let Some(mut stream) = self.completion_streams.remove(&worker_id) {
            while let Ok(Some(stale)) =
                tokio::time::timeout(Duration::from_millis(10), stream.next()).await
            {
                debug!(worker_id, ?stale, "discarding stale completion");
            }
        }

        let (tx, rx) = mpsc::channel::<CompletionMessage>(COMPLETION_BUFFER);
        self.completion_txs[worker_id] = tx;
        self.completion_streams
            .insert(worker_id, ReceiverStream::new(rx));

        self.get_status_sender(worker_id)
    }

    async fn wait_next(&mut self) -> Option<Result<usize, usize>> {
        self.completion_streams
            .next()
            .await
            .map(|(slot, message)| message.map_err(|_| slot))
    }
}
