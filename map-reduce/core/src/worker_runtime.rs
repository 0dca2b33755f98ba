// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;

/// A unit of work that can be executed by a runtime
#[async_trait]
pub trait Runnable: Send + 'static {
    type Output;
    async fn run(self) -> Self::Output;
}

/// Abstracts how worker loops are hosted (tasks, threads, processes)
pub trait WorkerRuntime<Task>: Send + Sync + 'static {
    type Handle: Send;
    type Error: Display + Send;

    fn spawn(task: Task) -> Self::Handle;

    fn join(handle: Self::Handle) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
