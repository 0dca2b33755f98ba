// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Builds the workers of a phase.
///
/// The executor keeps the factory for the lifetime of the phase and calls it
/// again for the slot of every worker it gives up on.
pub trait WorkerFactory<W>: Send {
    fn create_worker(&mut self, worker_id: usize) -> W;
}
