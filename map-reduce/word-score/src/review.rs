// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::RecordError;
use serde::Deserialize;
use serde_json::{Number, Value};

/// A star rating, always in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rating(u8);

impl Rating {
    pub fn new(stars: i64) -> Result<Self, RecordError> {
        match u8::try_from(stars) {
            Ok(stars @ 1..=5) => Ok(Self(stars)),
            _ => Err(RecordError::InvalidRating(stars.to_string())),
        }
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<&Number> for Rating {
    type Error = RecordError;

    fn try_from(number: &Number) -> Result<Self, Self::Error> {
        if let Some(stars) = number.as_i64() {
            return Self::new(stars);
        }
        // 5.0 is a rating, 4.5 is not
        match number.as_f64() {
            Some(stars) if stars.fract() == 0.0 && (1.0..=5.0).contains(&stars) => {
                Self::new(stars as i64)
            }
            _ => Err(RecordError::InvalidRating(number.to_string())),
        }
    }
}

#[derive(Deserialize)]
struct RawReview {
    stars: Number,
    text: String,
}

/// One review line of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub rating: Rating,
    pub text: String,
}

impl Review {
    /// Parse a JSON object with at least `stars` and `text`. Other fields are ignored.
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let invalid = |e: serde_json::Error| RecordError::InvalidReview(e.to_string());

        // Derived struct deserializers also take positional arrays
        let object = match serde_json::from_str(line).map_err(invalid)? {
            Value::Object(object) => object,
            other => {
                return Err(RecordError::InvalidReview(format!(
                    "expected a JSON object, found {other}"
                )))
            }
        };
        let raw: RawReview = serde_json::from_value(Value::Object(object)).map_err(invalid)?;
        Ok(Self {
            rating: Rating::try_from(&raw.stars)?,
            text: raw.text,
        })
    }
}
