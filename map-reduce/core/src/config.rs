// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Input records per map assignment
    pub partition_size: usize,
    pub num_mappers: usize,
    pub num_reducers: usize,
    /// Reduce partitions of the scoring stage, and the target number of
    /// score ranges of the sorting stage
    pub num_partitions: usize,
    /// Scores sampled to estimate the range boundaries of the sorting stage
    pub sample_size: usize,
    /// Pre-aggregate map output before the shuffle
    pub combine: bool,
    /// Attempts per assignment before the phase fails
    pub max_task_attempts: u32,
    /// Maximum allowed execution time for a mapper in milliseconds (0 = no timeout)
    pub mapper_timeout_ms: u64,
    /// Maximum allowed execution time for a reducer in milliseconds (0 = no timeout)
    pub reducer_timeout_ms: u64,
    /// Probability (0-100) that a mapper fails during execution
    pub mapper_failure_probability: u32,
    /// Probability (0-100) that a reducer fails during execution
    pub reducer_failure_probability: u32,
    /// Probability (0-100) that a mapper becomes a straggler (slow)
    pub mapper_straggler_probability: u32,
    /// Maximum delay in milliseconds for a mapper straggler
    pub mapper_straggler_delay_ms: u64,
    /// Probability (0-100) that a reducer becomes a straggler (slow)
    pub reducer_straggler_probability: u32,
    /// Maximum delay in milliseconds for a reducer straggler
    pub reducer_straggler_delay_ms: u64,
    /// Where the word scores between the two stages are kept.
    /// A scratch directory is used (and removed) when unset.
    pub intermediate_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            partition_size: 10_000,
            num_mappers: 8,
            num_reducers: 4,
            num_partitions: 8,
            sample_size: 10_000,
            combine: true,
            max_task_attempts: 4,
            mapper_timeout_ms: 0,
            reducer_timeout_ms: 0,
            mapper_failure_probability: 0,
            reducer_failure_probability: 0,
            mapper_straggler_probability: 0,
            mapper_straggler_delay_ms: 1000,
            reducer_straggler_probability: 0,
            reducer_straggler_delay_ms: 1000,
            intermediate_dir: None,
        }
    }
}

/// Fault injection settings for one kind of worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultConfig {
    pub failure_probability: u32,
    pub straggler_probability: u32,
    pub straggler_delay_ms: u64,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("partition_size", self.partition_size),
            ("num_mappers", self.num_mappers),
            ("num_reducers", self.num_reducers),
            ("num_partitions", self.num_partitions),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
        }
        if self.max_task_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_task_attempts must be at least 1".to_string(),
            ));
        }

        let probabilities = [
            ("mapper_failure_probability", self.mapper_failure_probability),
            ("reducer_failure_probability", self.reducer_failure_probability),
            ("mapper_straggler_probability", self.mapper_straggler_probability),
            ("reducer_straggler_probability", self.reducer_straggler_probability),
        ];
        if let Some((name, value)) = probabilities.iter().find(|(_, value)| *value > 100) {
            return Err(ConfigError::Invalid(format!(
                "{name} is {value}, expected a percentage in 0..=100"
            )));
        }
        Ok(())
    }

    pub fn mapper_faults(&self) -> FaultConfig {
        FaultConfig {
            failure_probability: self.mapper_failure_probability,
            straggler_probability: self.mapper_straggler_probability,
            straggler_delay_ms: self.mapper_straggler_delay_ms,
        }
    }

    pub fn reducer_faults(&self) -> FaultConfig {
        FaultConfig {
            failure_probability: self.reducer_failure_probability,
            straggler_probability: self.reducer_straggler_probability,
            straggler_delay_ms: self.reducer_straggler_delay_ms,
        }
    }

    pub fn log_summary(&self) {
        info!(
            partition_size = self.partition_size,
            num_mappers = self.num_mappers,
            num_reducers = self.num_reducers,
            num_partitions = self.num_partitions,
            sample_size = self.sample_size,
            combine = self.combine,
            max_task_attempts = self.max_task_attempts,
            "job configuration"
        );
        if self.mapper_failure_probability > 0 || self.reducer_failure_probability > 0 {
            info!(
                mapper = self.mapper_failure_probability,
                reducer = self.reducer_failure_probability,
                "failure injection enabled (%)"
            );
        }
        if self.mapper_straggler_probability > 0 || self.reducer_straggler_probability > 0 {
            info!(
                mapper = self.mapper_straggler_probability,
                reducer = self.reducer_straggler_probability,
                "straggler injection enabled (%)"
            );
        }
        if self.mapper_timeout_ms > 0 || self.reducer_timeout_ms > 0 {
            info!(
                mapper_ms = self.mapper_timeout_ms,
                reducer_ms = self.reducer_timeout_ms,
                "straggler timeouts"
            );
        }
    }
}
