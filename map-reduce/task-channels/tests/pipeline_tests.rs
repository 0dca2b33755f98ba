// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::config::Config;
use map_reduce_core::error::PhaseError;
use map_reduce_task_channels::{PipelineError, TokenShutdownSignal, WordScorePipeline};
use map_reduce_word_score::{PipelineState, StageError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const VOCABULARY: &[&str] = &[
    "good", "bad", "great", "awful", "fine", "meh", "love", "hate", "ok", "the", "a", "Good",
    "café", "well-made", "broken!", "cheap", "value", "slow", "fast", "again",
];

fn review(stars: u8, text: &str) -> String {
    format!(r#"{{"stars": {stars}, "text": "{text}"}}"#)
}

fn test_config() -> Config {
    Config {
        partition_size: 3,
        num_mappers: 3,
        num_reducers: 2,
        num_partitions: 3,
        sample_size: 50,
        ..Config::default()
    }
}

fn pipeline(config: Config) -> WordScorePipeline<TokenShutdownSignal> {
    WordScorePipeline::new(config, TokenShutdownSignal::new(CancellationToken::new()))
}

fn read_ranking(output: &Path) -> Vec<(i64, String)> {
    fs::read_to_string(output.join("part-r-00000"))
        .unwrap()
        .lines()
        .map(|line| {
            let (score, word) = line.split_once('\t').unwrap();
            (score.parse().unwrap(), word.to_string())
        })
        .collect()
}

fn assert_descending(ranking: &[(i64, String)]) {
    for pair in ranking.windows(2) {
        assert!(pair[0].0 >= pair[1].0, "{:?} ranked above {:?}", pair[0], pair[1]);
    }
}

fn as_map(ranking: Vec<(i64, String)>) -> HashMap<String, i64> {
    let mut map = HashMap::new();
    for (score, word) in ranking {
        assert!(map.insert(word.clone(), score).is_none(), "{word} ranked twice");
    }
    map
}

/// Random reviews and the word scores they should produce
fn generated_corpus(seed: u64, reviews: usize) -> (String, HashMap<String, i64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut contents = String::new();
    let mut expected: HashMap<String, i64> = HashMap::new();

    for _ in 0..reviews {
        let stars: u8 = rng.random_range(1..=5);
        let words: Vec<&str> = (0..rng.random_range(0..8))
            .map(|_| VOCABULARY[rng.random_range(0..VOCABULARY.len())])
            .collect();
        for word in &words {
            *expected.entry(word.to_string()).or_default() += i64::from(stars) - 3;
        }
        contents.push_str(&review(stars, &words.join(" ")));
        contents.push('\n');
    }
    (contents, expected)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_two_reviews_rank_good_above_bad() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    fs::write(
        &input,
        format!("{}\n{}\n", review(5, "good good bad"), review(1, "bad bad")),
    )
    .unwrap();
    let output = dir.path().join("ranking");

    let mut pipeline = pipeline(test_config());
    let summary = pipeline.run(&input, &output).await.unwrap();

    assert_eq!(summary.words, 2);
    assert_eq!(summary.output_file, output.join("part-r-00000"));
    assert_eq!(
        read_ranking(&output),
        vec![(4, "good".to_string()), (-2, "bad".to_string())]
    );
    assert!(output.join("_SUCCESS").exists());
    assert!(!output.join("_temporary").exists());
    assert_eq!(pipeline.state(), PipelineState::SortingComplete);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generated_corpus_is_complete_and_descending() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    let (contents, expected) = generated_corpus(7, 400);
    fs::write(&input, contents).unwrap();
    let output = dir.path().join("ranking");

    let summary = pipeline(test_config()).run(&input, &output).await.unwrap();

    let ranking = read_ranking(&output);
    assert_eq!(summary.words, expected.len());
    assert_descending(&ranking);
    assert_eq!(as_map(ranking), expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_combiner_does_not_change_scores() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    let (contents, expected) = generated_corpus(11, 200);
    fs::write(&input, contents).unwrap();

    let combined = dir.path().join("combined");
    pipeline(test_config()).run(&input, &combined).await.unwrap();

    let raw = dir.path().join("raw");
    let config = Config {
        combine: false,
        ..test_config()
    };
    pipeline(config).run(&input, &raw).await.unwrap();

    assert_eq!(as_map(read_ranking(&combined)), expected);
    assert_eq!(as_map(read_ranking(&raw)), expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rerun_produces_the_same_scores() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    let (contents, _) = generated_corpus(3, 150);
    fs::write(&input, contents).unwrap();

    let first = dir.path().join("first");
    let second = dir.path().join("second");
    pipeline(test_config()).run(&input, &first).await.unwrap();
    pipeline(test_config()).run(&input, &second).await.unwrap();

    // Tied words may come out in either order
    let mut first = read_ranking(&first);
    let mut second = read_ranking(&second);
    first.sort();
    second.sort();
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_injected_failures_are_retried() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    let (contents, expected) = generated_corpus(5, 120);
    fs::write(&input, contents).unwrap();
    let output = dir.path().join("ranking");

    let config = Config {
        mapper_failure_probability: 25,
        reducer_failure_probability: 25,
        max_task_attempts: 50,
        ..test_config()
    };
    let mut pipeline = pipeline(config);
    pipeline.run(&input, &output).await.unwrap();

    let ranking = read_ranking(&output);
    assert_descending(&ranking);
    assert_eq!(as_map(ranking), expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stragglers_are_reexecuted() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    let (contents, expected) = generated_corpus(13, 60);
    fs::write(&input, contents).unwrap();
    let output = dir.path().join("ranking");

    let config = Config {
        mapper_timeout_ms: 100,
        reducer_timeout_ms: 100,
        mapper_straggler_probability: 30,
        mapper_straggler_delay_ms: 400,
        reducer_straggler_probability: 30,
        reducer_straggler_delay_ms: 400,
        max_task_attempts: 50,
        ..test_config()
    };
    pipeline(config).run(&input, &output).await.unwrap();

    assert_eq!(as_map(read_ranking(&output)), expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exhausted_attempts_fail_the_run() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    fs::write(&input, review(4, "fine")).unwrap();
    let output = dir.path().join("ranking");

    let config = Config {
        mapper_failure_probability: 100,
        max_task_attempts: 2,
        ..test_config()
    };
    let mut pipeline = pipeline(config);
    let err = pipeline.run(&input, &output).await.unwrap_err();

    assert!(
        matches!(
            err,
            PipelineError::Phase(PhaseError::TaskFailed { attempts: 2, .. })
        ),
        "unexpected error: {err}"
    );
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert!(!output.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_review_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    fs::write(
        &input,
        format!("{}\n{{\"stars\": 9, \"text\": \"odd\"}}\n", review(5, "good")),
    )
    .unwrap();
    let output = dir.path().join("ranking");

    let config = Config {
        max_task_attempts: 2,
        ..test_config()
    };
    let mut pipeline = pipeline(config);
    let err = pipeline.run(&input, &output).await.unwrap_err();

    assert!(matches!(err, PipelineError::Phase(PhaseError::TaskFailed { .. })));
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert!(!output.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_existing_output_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    fs::write(&input, review(5, "good")).unwrap();
    let output = dir.path().join("ranking");
    fs::create_dir(&output).unwrap();
    fs::write(output.join("keep.txt"), "mine").unwrap();

    let err = pipeline(test_config()).run(&input, &output).await.unwrap_err();

    assert!(matches!(err, PipelineError::OutputExists(ref path) if path == &output));
    assert_eq!(fs::read_to_string(output.join("keep.txt")).unwrap(), "mine");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_input_writes_empty_ranking() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    fs::write(&input, "\n\n").unwrap();
    let output = dir.path().join("ranking");

    let summary = pipeline(test_config()).run(&input, &output).await.unwrap();

    assert_eq!(summary.words, 0);
    assert!(read_ranking(&output).is_empty());
    assert!(output.join("_SUCCESS").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_directory_input_skips_hidden_and_marker_files() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("a.json"), review(5, "good")).unwrap();
    fs::write(input.join("b.json"), review(2, "good slow")).unwrap();
    fs::write(input.join(".partial"), "not json").unwrap();
    fs::write(input.join("_SUCCESS"), "").unwrap();
    let output = dir.path().join("ranking");

    pipeline(test_config()).run(&input, &output).await.unwrap();

    assert_eq!(
        read_ranking(&output),
        vec![(1, "good".to_string()), (-1, "slow".to_string())]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_intermediate_dir_keeps_word_scores() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    fs::write(
        &input,
        format!("{}\n{}\n", review(5, "good good bad"), review(1, "bad bad")),
    )
    .unwrap();
    let intermediate = dir.path().join("scores");
    fs::create_dir(&intermediate).unwrap();
    fs::write(intermediate.join("part-r-00099"), "stale\t100\n").unwrap();

    let config = Config {
        intermediate_dir: Some(intermediate.clone()),
        ..test_config()
    };
    let output = dir.path().join("ranking");
    pipeline(config).run(&input, &output).await.unwrap();

    assert!(!intermediate.join("part-r-00099").exists());
    let mut lines: Vec<String> = fs::read_dir(&intermediate)
        .unwrap()
        .flat_map(|entry| {
            let contents = fs::read_to_string(entry.unwrap().path()).unwrap();
            contents.lines().map(str::to_string).collect::<Vec<_>>()
        })
        .collect();
    lines.sort();
    assert_eq!(lines, vec!["bad\t-2".to_string(), "good\t4".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_intermediate_dir_ignores_unrelated_files() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    fs::write(
        &input,
        format!("{}\n{}\n", review(5, "good good bad"), review(1, "bad bad")),
    )
    .unwrap();
    let intermediate = dir.path().join("scores");
    fs::create_dir(&intermediate).unwrap();
    fs::write(intermediate.join("README"), "scratch space\n").unwrap();

    let config = Config {
        intermediate_dir: Some(intermediate.clone()),
        ..test_config()
    };
    let output = dir.path().join("ranking");
    pipeline(config).run(&input, &output).await.unwrap();

    assert_eq!(
        read_ranking(&output),
        vec![(4, "good".to_string()), (-2, "bad".to_string())]
    );
    assert_eq!(
        fs::read_to_string(intermediate.join("README")).unwrap(),
        "scratch space\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ranking_requires_completed_scoring() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    fs::write(&input, review(5, "good")).unwrap();

    let mut scorer = pipeline(test_config());
    let artifact = scorer.score(&input).await.unwrap();
    assert_eq!(artifact.words(), 1);
    assert_eq!(scorer.state(), PipelineState::ScoringComplete);

    let output = dir.path().join("ranking");
    let mut early = pipeline(test_config());
    let err = early.rank(&artifact, &output).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Stage(StageError::OrderingViolation(PipelineState::NotStarted))
    ));
    assert_eq!(early.state(), PipelineState::Failed);
    assert!(!output.exists());

    scorer.rank(&artifact, &output).await.unwrap();
    assert_eq!(read_ranking(&output), vec![(2, "good".to_string())]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancelled_run_stops() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("reviews.json");
    fs::write(&input, review(5, "good")).unwrap();
    let output = dir.path().join("ranking");

    let token = CancellationToken::new();
    token.cancel();
    let mut pipeline = WordScorePipeline::new(test_config(), TokenShutdownSignal::new(token));
    let err = pipeline.run(&input, &output).await.unwrap_err();

    assert!(matches!(err, PipelineError::Phase(PhaseError::Cancelled)));
    assert!(!output.exists());
}
