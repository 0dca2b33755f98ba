// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::config::FaultConfig;
use rand::Rng;
use std::time::Duration;
use tracing::warn;

/// Roll against a 0-100 probability
fn roll(probability: u32) -> bool {
    probability > 0 && rand::rng().random_range(0..100) < probability
}

pub fn should_fail(faults: &FaultConfig, role: &str, worker_id: usize) -> bool {
    let fail = roll(faults.failure_probability);
    if fail {
        warn!(role, worker_id, "simulated failure");
    }
    fail
}

/// Sleep for a random delay when the worker is picked as a straggler
pub async fn maybe_straggle(faults: &FaultConfig, role: &str, worker_id: usize) {
    if !roll(faults.straggler_probability) {
        return;
    }
    let delay = rand::rng().random_range(1..=faults.straggler_delay_ms.max(1));
    warn!(role, worker_id, delay_ms = delay, "simulated straggler");
    tokio::time::sleep(Duration::from_millis(delay)).await;
}
