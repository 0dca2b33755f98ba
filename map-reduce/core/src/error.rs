// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::path::PathBuf;
use thiserror::Error;

/// Why a map or reduce phase did not complete
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhaseError {
    #[error("task {task} failed after {attempts} attempt(s)")]
    TaskFailed { task: usize, attempts: u32 },

    #[error("phase cancelled by shutdown signal")]
    Cancelled,

    #[error("no workers available for {pending} task(s)")]
    NoWorkers { pending: usize },

    #[error("all completion channels closed with {pending} task(s) outstanding")]
    SignalingClosed { pending: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
