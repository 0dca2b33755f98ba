// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod config;
pub mod error;
pub mod executor;
pub mod in_memory_shuffle_store;
pub mod map_reduce_job;
pub mod partitioner;
pub mod shuffle_store;
pub mod shutdown_signal;
pub mod status_sender;
pub mod utils;
pub mod work_receiver;
pub mod work_sender;
pub mod worker;
pub mod worker_factory;
pub mod worker_runtime;
pub mod worker_synchronization;
