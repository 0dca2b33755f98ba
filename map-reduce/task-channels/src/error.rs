// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::error::PhaseError;
use map_reduce_word_score::{JobError, StageError};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("output path {} already exists", .0.display())]
    OutputExists(PathBuf),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Job(#[from] JobError),
}

/// Attach a path and what was being done to an I/O failure
pub(crate) fn io_error(context: &'static str, path: &Path) -> impl FnOnce(io::Error) -> PipelineError {
    let path = path.to_path_buf();
    move |source| PipelineError::Io {
        context,
        path,
        source,
    }
}
