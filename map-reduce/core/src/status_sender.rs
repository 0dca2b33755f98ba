// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;

/// Outcome reported by a worker: Ok(worker_id) on success, Err(()) on failure.
/// A failure is attributed to the channel it arrives on, not to a payload.
pub type CompletionMessage = Result<usize, ()>;

/// Sends completion signals back to the executor
#[async_trait]
pub trait StatusSender: Send + Sync + Clone {
    /// Returns false when nobody listens anymore, which is the case for a
    /// worker that was superseded by a respawn
    async fn send(&self, result: CompletionMessage) -> bool;
}
