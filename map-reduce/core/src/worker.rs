// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt::Display;
use std::future::Future;

/// A map or reduce worker, independent of how work reaches it
pub trait Worker: Send {
    type Assignment: Send;
    type Completion;
    type Error: Display;

    /// Hand one unit of work to this worker together with the sender it
    /// must use to report the outcome
    fn send_work(&self, assignment: Self::Assignment, completion: Self::Completion);

    /// Close the work channel and wait for the worker to exit
    fn wait(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
