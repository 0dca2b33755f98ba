// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Cooperative cancellation shared by the executor and every worker task
pub trait ShutdownSignal: Clone + Send + Sync + 'static {
    fn is_cancelled(&self) -> bool;
}
