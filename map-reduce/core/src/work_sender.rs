// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Delivers assignments to one worker.
/// Implementations decide the transport (mpsc, sockets, RPC).
pub trait WorkSender<A, C>: Clone + Send + 'static {
    fn send_work(&self, assignment: A, completion: C);
}
