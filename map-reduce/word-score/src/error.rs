// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

/// Why a single input line could not be turned into a record
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid review: {0}")]
    InvalidReview(String),

    #[error("star rating {0} is not an integer in 1..=5")]
    InvalidRating(String),

    #[error("expected `word<TAB>score`, found {0:?}")]
    InvalidScoreRecord(String),
}

/// Failure of a map or reduce unit
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("malformed record at {source_name}:{line}: {reason}")]
    MalformedRecord {
        source_name: String,
        line: usize,
        reason: RecordError,
    },
}
