// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{io_error, PipelineError};
use crate::files::{
    discard_output, read_shards, shard_files, write_ranked_output, write_word_scores,
};
use crate::stage::run_stage;
use map_reduce_core::config::Config;
use map_reduce_core::shutdown_signal::ShutdownSignal;
use map_reduce_word_score::rank::sample_scores;
use map_reduce_word_score::{
    PipelineState, PipelineTracker, RangePartitioner, RankJob, WordScoreJob,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, info};

/// The word scores produced by the scoring stage.
/// A scratch directory lives as long as the artifact.
pub struct ScoreArtifact {
    dir: PathBuf,
    part_files: Vec<PathBuf>,
    words: usize,
    _scratch: Option<TempDir>,
}

impl ScoreArtifact {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The part files the scoring stage wrote, in partition order
    pub fn part_files(&self) -> &[PathBuf] {
        &self.part_files
    }

    /// Distinct words that received a score
    pub fn words(&self) -> usize {
        self.words
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankSummary {
    pub words: usize,
    pub output_file: PathBuf,
}

/// Drives the scoring stage and then the sorting stage
pub struct WordScorePipeline<SD> {
    config: Config,
    tracker: PipelineTracker,
    shutdown_signal: SD,
}

impl<SD: ShutdownSignal> WordScorePipeline<SD> {
    pub fn new(config: Config, shutdown_signal: SD) -> Self {
        Self {
            config,
            tracker: PipelineTracker::new(),
            shutdown_signal,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.tracker.state()
    }

    /// Both stages, back to back
    pub async fn run(&mut self, input: &Path, output: &Path) -> Result<RankSummary, PipelineError> {
        let artifact = self.score(input).await?;
        self.rank(&artifact, output).await
    }

    /// Stage 1: total score per word
    pub async fn score(&mut self, input: &Path) -> Result<ScoreArtifact, PipelineError> {
        self.tracker.begin_scoring()?;
        let start = Instant::now();
        match self.run_scoring(input).await {
            Ok(artifact) => {
                self.tracker.complete_scoring()?;
                info!(
                    words = artifact.words(),
                    intermediate = %artifact.dir().display(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "scoring stage complete"
                );
                Ok(artifact)
            }
            Err(e) => {
                self.tracker.fail();
                Err(e)
            }
        }
    }

    /// Stage 2: every scored word in descending score order.
    /// Fails without touching `output` unless scoring has completed.
    pub async fn rank(
        &mut self,
        artifact: &ScoreArtifact,
        output: &Path,
    ) -> Result<RankSummary, PipelineError> {
        self.tracker.begin_sorting()?;
        if output.exists() {
            self.tracker.fail();
            return Err(PipelineError::OutputExists(output.to_path_buf()));
        }

        let start = Instant::now();
        match self.run_ranking(artifact, output).await {
            Ok(summary) => {
                self.tracker.complete_sorting()?;
                info!(
                    words = summary.words,
                    output = %summary.output_file.display(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "sorting stage complete"
                );
                Ok(summary)
            }
            Err(e) => {
                self.tracker.fail();
                discard_output(output).await;
                Err(e)
            }
        }
    }

    async fn run_scoring(&self, input: &Path) -> Result<ScoreArtifact, PipelineError> {
        let shards = read_shards(input, self.config.partition_size).await?;
        let job = Arc::new(WordScoreJob::new(
            self.config.num_partitions,
            self.config.combine,
        ));
        let partitions =
            run_stage("scoring", job, shards, &self.config, &self.shutdown_signal).await?;

        let (dir, scratch) = self.intermediate_dir()?;
        let (words, part_files) = write_word_scores(&dir, partitions).await?;
        Ok(ScoreArtifact {
            dir,
            part_files,
            words,
            _scratch: scratch,
        })
    }

    async fn run_ranking(
        &self,
        artifact: &ScoreArtifact,
        output: &Path,
    ) -> Result<RankSummary, PipelineError> {
        let shards = shard_files(artifact.part_files(), self.config.partition_size).await?;
        let sample = sample_scores(&shards, self.config.sample_size, &mut rand::rng())?;
        let partitioner = RangePartitioner::from_sample(sample, self.config.num_partitions);
        debug!(boundaries = ?partitioner.boundaries(), "score ranges chosen");

        let job = Arc::new(RankJob::new(partitioner));
        let partitions =
            run_stage("sorting", job, shards, &self.config, &self.shutdown_signal).await?;

        let (words, output_file) = write_ranked_output(output, partitions).await?;
        Ok(RankSummary { words, output_file })
    }

    fn intermediate_dir(&self) -> Result<(PathBuf, Option<TempDir>), PipelineError> {
        match &self.config.intermediate_dir {
            Some(dir) => Ok((dir.clone(), None)),
            None => {
                let scratch = tempfile::Builder::new()
                    .prefix("word-score-")
                    .tempdir()
                    .map_err(io_error(
                        "cannot create scratch directory in",
                        &std::env::temp_dir(),
                    ))?;
                Ok((scratch.path().to_path_buf(), Some(scratch)))
            }
        }
    }
}
