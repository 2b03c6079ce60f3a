use std::sync::Arc;

use kvferry_cache::MemoryCache;
use kvferry_record::epoch_millis_now;

use super::*;
use crate::testutil::RecordingCache;
use crate::{Loader, RecordChecker, TtlPolicy};

use kvferry_validate::{HasTtl, ValidatorChain};

const HOUR_MS: i64 = 60 * 60 * 1000;

fn load_processor(cache: Arc<MemoryCache>) -> Arc<dyn LineProcessor> {
    Arc::new(Loader::new(cache, TtlPolicy::new()))
}

async fn run_load(
    input: &str,
    config: ExecutorConfig,
) -> (StatsReport, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let executor = BatchExecutor::new(config);
    let mut streams = OutputStreams::none();
    let report = executor
        .run(
            input.as_bytes(),
            load_processor(Arc::clone(&cache)),
            &mut streams,
        )
        .await
        .unwrap();
    (report, cache)
}

/// Deterministic mixed input: strings, hashes, parse errors, unsupported
/// tags and expired records in a fixed ratio.
fn mixed_input(lines: usize) -> String {
    let expired = epoch_millis_now() - HOUR_MS;
    let mut input = String::new();
    for i in 0..lines {
        let line = match i % 5 {
            0 => format!(r#"{{"key":"str-{i}","value":"v{i}","type":"string"}}"#),
            1 => format!(r#"{{"key":"hash-{i}","value":{{"f":"{i}"}},"type":"hash"}}"#),
            2 => format!("{{broken json {i}"),
            3 => format!(r#"{{"key":"k-{i}","value":"v","type":"stream"}}"#),
            _ => format!(
                r#"{{"key":"old-{i}","value":"v","type":"string","expiry":{expired}}}"#
            ),
        };
        input.push_str(&line);
        input.push('\n');
    }
    input
}

#[tokio::test]
async fn test_every_line_gets_one_outcome() {
    let (report, cache) = run_load(&mixed_input(10), ExecutorConfig::default()).await;

    assert_eq!(report.total, 10);
    assert_eq!(report.ok, 4); // 2 strings + 2 hashes
    assert_eq!(report.error, 4); // 2 invalid_json + 2 unsupported
    assert_eq!(report.filtered, 2); // 2 expired
    assert_eq!(report.reasons["invalid_json"], 2);
    assert_eq!(report.reasons["data_type_not_supported"], 2);
    assert_eq!(cache.len(), 4);
}

#[tokio::test]
async fn test_blank_lines_do_not_touch_counters() {
    let input = "\n   \n{\"key\":\"k\",\"value\":\"v\",\"type\":\"string\"}\n\t\n\n";
    let (report, _) = run_load(input, ExecutorConfig::default()).await;

    assert_eq!(report.total, 1);
    assert_eq!(report.ok, 1);
}

#[tokio::test]
async fn test_empty_input_is_an_empty_report() {
    let (report, cache) = run_load("", ExecutorConfig::default()).await;
    assert_eq!(report, StatsReport::default());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_final_partial_batch_is_flushed() {
    let config = ExecutorConfig {
        concurrency: 2,
        batch_size: 64,
        ..Default::default()
    };
    let (report, cache) = run_load(&mixed_input(7), config).await;

    assert_eq!(report.total, 7);
    assert_eq!(cache.len(), report.ok as usize);
}

#[tokio::test]
async fn test_counts_are_identical_across_concurrency_levels() {
    let input = mixed_input(2_000);

    let serial = ExecutorConfig {
        concurrency: 1,
        ..Default::default()
    };
    let parallel = ExecutorConfig {
        concurrency: 16,
        ..Default::default()
    };

    let (serial_report, _) = run_load(&input, serial).await;
    let (parallel_report, _) = run_load(&input, parallel).await;

    assert_eq!(serial_report.total, 2_000);
    assert_eq!(serial_report, parallel_report);
}

#[tokio::test]
async fn test_batch_size_is_raised_to_concurrency() {
    // A batch smaller than the pool would leave workers idle; the executor
    // normalizes rather than erroring. Counts must come out the same.
    let config = ExecutorConfig {
        concurrency: 8,
        batch_size: 1,
        ..Default::default()
    };
    let (report, _) = run_load(&mixed_input(20), config).await;
    assert_eq!(report.total, 20);
}

#[tokio::test]
async fn test_validate_mode_streams() {
    let dir = tempfile::tempdir().unwrap();
    let valid_path = dir.path().join("valid.jsonl");
    let error_path = dir.path().join("errors.tsv");

    let chain = ValidatorChain::new().with(HasTtl);
    let processor: Arc<dyn LineProcessor> = Arc::new(RecordChecker::new(chain));

    let expiry = epoch_millis_now() + HOUR_MS;
    let good = format!(r#"{{"key":"a","value":"1","type":"string","expiry":{expiry}}}"#);
    let no_ttl = r#"{"key":"b","value":"2","type":"string"}"#;
    let junk = "not json";
    let input = format!("{good}\n{no_ttl}\n{junk}\n");

    let executor = BatchExecutor::new(ExecutorConfig {
        concurrency: 1,
        ..Default::default()
    });
    let mut streams = OutputStreams::create(Some(&valid_path), Some(&error_path))
        .await
        .unwrap();
    let report = executor
        .run(input.as_bytes(), processor, &mut streams)
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.ok, 1);
    assert_eq!(report.error, 2);

    let valid = std::fs::read_to_string(&valid_path).unwrap();
    assert_eq!(valid, format!("{good}\n"));

    let errors = std::fs::read_to_string(&error_path).unwrap();
    assert!(errors.contains(&format!("no_ttl\t{no_ttl}\n")));
    assert!(errors.contains(&format!("invalid_json\t{junk}\n")));
}

#[tokio::test]
async fn test_dispatch_errors_recorded_and_run_continues() {
    let cache = Arc::new(RecordingCache::new().fail_writes_of("bad"));
    let processor: Arc<dyn LineProcessor> =
        Arc::new(Loader::new(cache.clone(), TtlPolicy::new()));

    let input = concat!(
        r#"{"key":"bad","value":"v","type":"string"}"#,
        "\n",
        r#"{"key":"good","value":"v","type":"string"}"#,
        "\n",
    );

    let dir = tempfile::tempdir().unwrap();
    let error_path = dir.path().join("errors.tsv");
    let executor = BatchExecutor::new(ExecutorConfig::default());
    let mut streams = OutputStreams::create(None, Some(&error_path)).await.unwrap();
    let report = executor
        .run(input.as_bytes(), processor, &mut streams)
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.ok, 1);
    assert_eq!(report.error, 1);
    assert_eq!(report.reasons["error_storing"], 1);

    let errors = std::fs::read_to_string(&error_path).unwrap();
    assert!(errors.starts_with("error_storing\t"));
    assert!(cache.inner.stored("good").is_some());
}
