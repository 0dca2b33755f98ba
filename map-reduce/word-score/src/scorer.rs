// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::review::{Rating, Review};

/// Per-occurrence score for ratings 1 through 5
const RATING_DELTAS: [i64; 5] = [-2, -1, 0, 1, 2];

/// One signed scoring event for one token occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub word: String,
    pub delta: i64,
}

impl From<Contribution> for (String, i64) {
    fn from(contribution: Contribution) -> Self {
        (contribution.word, contribution.delta)
    }
}

/// Token separators: space, tab, newline, carriage return, form feed.
/// Other Unicode spaces such as U+00A0 stay inside tokens.
const SEPARATORS: [char; 5] = [' ', '\t', '\n', '\r', '\x0C'];

pub fn rating_delta(rating: Rating) -> i64 {
    RATING_DELTAS[usize::from(rating.stars() - 1)]
}

/// Maximal runs of non-separator characters, verbatim
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(SEPARATORS).filter(|token| !token.is_empty())
}

/// One contribution per token occurrence, all carrying the review's delta
pub fn score(review: &Review) -> Vec<Contribution> {
    let delta = rating_delta(review.rating);
    tokenize(&review.text)
        .map(|word| Contribution {
            word: word.to_string(),
            delta,
        })
        .collect()
}
