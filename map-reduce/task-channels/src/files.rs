// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{io_error, PipelineError};
use map_reduce_word_score::records::{format_ranked, format_word_score};
use map_reduce_word_score::TextShard;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

pub const PART_PREFIX: &str = "part-r-";
pub const SUCCESS_MARKER: &str = "_SUCCESS";
const STAGING_DIR: &str = "_temporary";

pub fn part_file_name(partition: usize) -> String {
    format!("{PART_PREFIX}{partition:05}")
}

/// The files making up an input path: the file itself, or the visible
/// regular files of a directory in name order
pub async fn input_files(input: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let metadata = fs::metadata(input)
        .await
        .map_err(io_error("cannot read input", input))?;
    if metadata.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut entries = fs::read_dir(input)
        .await
        .map_err(io_error("cannot list input directory", input))?;
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(io_error("cannot list input directory", input))?
    {
        // Hidden files and markers such as _SUCCESS are not data
        if entry.file_name().to_string_lossy().starts_with(['.', '_']) {
            continue;
        }
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(io_error("cannot inspect", &path))?;
        if file_type.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read an input path into shards of at most `partition_size` lines
pub async fn read_shards(input: &Path, partition_size: usize) -> Result<Vec<TextShard>, PipelineError> {
    let shards = shard_files(&input_files(input).await?, partition_size).await?;
    debug!(input = %input.display(), shards = shards.len(), "input sharded");
    Ok(shards)
}

/// Shard exactly the given files, numbering shards across all of them
pub async fn shard_files(files: &[PathBuf], partition_size: usize) -> Result<Vec<TextShard>, PipelineError> {
    let mut shards = Vec::new();
    let mut next_id = 0;
    for file in files {
        let contents = fs::read_to_string(file)
            .await
            .map_err(io_error("cannot read", file))?;
        let source = file.display().to_string();
        shards.extend(TextShard::split(&source, &contents, partition_size, &mut next_id));
    }
    Ok(shards)
}

/// Write one part file of word/score lines per partition and return the
/// word count with the files written. Part files left over from an earlier
/// run are removed first; other files in `dir` are not touched.
pub async fn write_word_scores(
    dir: &Path,
    partitions: Vec<Vec<(String, i64)>>,
) -> Result<(usize, Vec<PathBuf>), PipelineError> {
    fs::create_dir_all(dir)
        .await
        .map_err(io_error("cannot create intermediate directory", dir))?;
    remove_part_files(dir).await?;

    let mut words = 0;
    let mut part_files = Vec::with_capacity(partitions.len());
    for (partition, records) in partitions.into_iter().enumerate() {
        let path = dir.join(part_file_name(partition));
        let mut contents = String::new();
        for (word, score) in &records {
            contents.push_str(&format_word_score(word, *score));
            contents.push('\n');
        }
        words += records.len();
        fs::write(&path, contents)
            .await
            .map_err(io_error("cannot write", &path))?;
        part_files.push(path);
    }
    Ok((words, part_files))
}

async fn remove_part_files(dir: &Path) -> Result<(), PipelineError> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(io_error("cannot list intermediate directory", dir))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(io_error("cannot list intermediate directory", dir))?
    {
        if entry.file_name().to_string_lossy().starts_with(PART_PREFIX) {
            let path = entry.path();
            debug!(path = %path.display(), "removing stale part file");
            fs::remove_file(&path)
                .await
                .map_err(io_error("cannot remove", &path))?;
        }
    }
    Ok(())
}

/// Write the ranking as the single part file of `output`, concatenating the
/// partitions in order. The part file is staged and renamed into place and
/// the success marker is written last.
pub async fn write_ranked_output(
    output: &Path,
    partitions: Vec<Vec<(i64, String)>>,
) -> Result<(usize, PathBuf), PipelineError> {
    let staging = output.join(STAGING_DIR);
    fs::create_dir_all(&staging)
        .await
        .map_err(io_error("cannot create output directory", &staging))?;

    let staged = staging.join(part_file_name(0));
    let file = fs::File::create(&staged)
        .await
        .map_err(io_error("cannot create", &staged))?;
    let mut writer = BufWriter::new(file);
    let mut words = 0;
    for (score, word) in partitions.into_iter().flatten() {
        let line = format_ranked(score, &word);
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(io_error("cannot write", &staged))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(io_error("cannot write", &staged))?;
        words += 1;
    }
    writer
        .flush()
        .await
        .map_err(io_error("cannot write", &staged))?;

    let part = output.join(part_file_name(0));
    fs::rename(&staged, &part)
        .await
        .map_err(io_error("cannot move into place", &part))?;
    fs::remove_dir(&staging)
        .await
        .map_err(io_error("cannot remove", &staging))?;
    let marker = output.join(SUCCESS_MARKER);
    fs::write(&marker, b"")
        .await
        .map_err(io_error("cannot write", &marker))?;

    Ok((words, part))
}

/// Remove a partially written output directory
pub async fn discard_output(output: &Path) {
    match fs::remove_dir_all(output).await {
        Ok(()) => debug!(output = %output.display(), "partial output removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(output = %output.display(), error = %e, "cannot remove partial output"),
    }
}
