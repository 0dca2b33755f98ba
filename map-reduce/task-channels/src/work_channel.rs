// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use map_reduce_core::work_receiver::WorkReceiver;
use map_reduce_core::work_sender::WorkSender;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Work queue of one worker. A worker holds at most a handful of
/// assignments at a time, so the queue is unbounded and sending never waits.
pub fn work_channel<A, C>() -> (WorkQueue<A, C>, WorkInbox<A, C>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WorkQueue { tx }, WorkInbox { rx })
}

/// Executor side of a work queue
pub struct WorkQueue<A, C> {
    tx: UnboundedSender<(A, C)>,
}

impl<A, C> Clone for WorkQueue<A, C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<A, C> WorkSender<A, C> for WorkQueue<A, C>
where
    A: Send + 'static,
    C: Send + 'static,
{
    fn send_work(&self, assignment: A, completion: C) {
        // The executor sees a dead worker through its completion channel
        if self.tx.send((assignment, completion)).is_err() {
            debug!("work queue closed, assignment dropped");
        }
    }
}

/// Worker side of a work queue
pub struct WorkInbox<A, C> {
    rx: UnboundedReceiver<(A, C)>,
}

#[async_trait]
impl<A, C> WorkReceiver<A, C> for WorkInbox<A, C>
where
    A: Send,
    C: Send,
{
    async fn recv(&mut self) -> Option<(A, C)> {
        self.rx.recv().await
    }
}
