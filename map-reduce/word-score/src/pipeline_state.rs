// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Lifecycle of one two-stage run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    ScoringInProgress,
    /// Every word score is materialized; the only state sorting may start from
    ScoringComplete,
    SortingInProgress,
    SortingComplete,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::SortingComplete | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::ScoringInProgress => "scoring in progress",
            Self::ScoringComplete => "scoring complete",
            Self::SortingInProgress => "sorting in progress",
            Self::SortingComplete => "sorting complete",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StageError {
    #[error("sorting requested while the pipeline is {0}; scoring must complete first")]
    OrderingViolation(PipelineState),

    #[error("cannot move pipeline from {from} to {to}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

/// Enforces the stage barrier: sorting only ever reads complete word scores
#[derive(Debug)]
pub struct PipelineTracker {
    state: PipelineState,
}

impl Default for PipelineTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineTracker {
    pub fn new() -> Self {
        Self {
            state: PipelineState::NotStarted,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn begin_scoring(&mut self) -> Result<(), StageError> {
        self.transition(PipelineState::NotStarted, PipelineState::ScoringInProgress)
    }

    pub fn complete_scoring(&mut self) -> Result<(), StageError> {
        self.transition(
            PipelineState::ScoringInProgress,
            PipelineState::ScoringComplete,
        )
    }

    /// Starting stage 2 early is fatal for the whole run
    pub fn begin_sorting(&mut self) -> Result<(), StageError> {
        if self.state != PipelineState::ScoringComplete {
            let violation = StageError::OrderingViolation(self.state);
            warn!(state = %self.state, "stage ordering violation");
            self.fail();
            return Err(violation);
        }
        self.transition(
            PipelineState::ScoringComplete,
            PipelineState::SortingInProgress,
        )
    }

    pub fn complete_sorting(&mut self) -> Result<(), StageError> {
        self.transition(
            PipelineState::SortingInProgress,
            PipelineState::SortingComplete,
        )
    }

    /// Move to Failed. A completed run stays completed.
    pub fn fail(&mut self) {
        if self.state != PipelineState::SortingComplete {
            debug!(from = %self.state, "pipeline failed");
            self.state = PipelineState::Failed;
        }
    }

    fn transition(&mut self, from: PipelineState, to: PipelineState) -> Result<(), StageError> {
        if self.state != from {
            return Err(StageError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        debug!(from = %from, to = %to, "pipeline transition");
        self.state = to;
        Ok(())
    }
}
