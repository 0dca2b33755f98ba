// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};

/// A run of input lines from one source, the unit of map work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextShard {
    pub shard_id: usize,
    /// File (or stream) the lines came from, for error reporting
    pub source: String,
    /// 1-based line number of `lines[0]` within `source`
    pub first_line: usize,
    pub lines: Vec<String>,
}

impl TextShard {
    /// Chunk the lines of one source into shards of at most `partition_size`
    /// lines. Shard ids continue from `next_id`, which is advanced.
    pub fn split(
        source: &str,
        contents: &str,
        partition_size: usize,
        next_id: &mut usize,
    ) -> Vec<TextShard> {
        let lines: Vec<&str> = contents.lines().collect();

        lines
            .chunks(partition_size.max(1))
            .enumerate()
            .map(|(chunk, lines)| {
                let shard = TextShard {
                    shard_id: *next_id,
                    source: source.to_string(),
                    first_line: chunk * partition_size.max(1) + 1,
                    lines: lines.iter().map(|line| line.to_string()).collect(),
                };
                *next_id += 1;
                shard
            })
            .collect()
    }

    /// Non-blank lines with their line numbers
    pub fn records(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(offset, line)| (self.first_line + offset, line.as_str()))
            .filter(|(_, line)| !line.trim().is_empty())
    }
}
