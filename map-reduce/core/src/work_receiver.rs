// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;

/// Worker-side end of the work channel
#[async_trait]
pub trait WorkReceiver<A, C>: Send {
    /// Next assignment and its completion sender.
    /// Returns None once the sending side is gone.
    async fn recv(&mut self) -> Option<(A, C)>;
}
