// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Flat tab-delimited text records written between and after the stages.

use crate::error::RecordError;

/// `word<TAB>score`, the intermediate artifact line
pub fn format_word_score(word: &str, score: i64) -> String {
    format!("{word}\t{score}")
}

pub fn parse_word_score(line: &str) -> Result<(String, i64), RecordError> {
    let invalid = || RecordError::InvalidScoreRecord(line.to_string());

    let (word, score) = line.rsplit_once('\t').ok_or_else(invalid)?;
    if word.is_empty() {
        return Err(invalid());
    }
    let score = score.parse::<i64>().map_err(|_| invalid())?;
    Ok((word.to_string(), score))
}

/// `score<TAB>word`, the final ranked output line
pub fn format_ranked(score: i64, word: &str) -> String {
    format!("{score}\t{word}")
}
