//! Classification runs against a stub model.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axial_core::{ClassificationResult, Theme};
use axial_pipeline::{Pipeline, Progress, RunReport};
use axial_store::{ResultStore, load_results};
use chrono::Utc;
use common::{Reply, StubModel, classification, record, records};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn open_store(dir: &tempfile::TempDir) -> Arc<ResultStore> {
    Arc::new(ResultStore::open(dir.path().join("data").join("axial_coding.json")).unwrap())
}

fn stored_ids(store: &ResultStore) -> Vec<String> {
    let mut ids: Vec<String> = store
        .results()
        .unwrap()
        .into_iter()
        .map(|r| r.alert_id)
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn classifies_single_record_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let model = Arc::new(StubModel::classifying("AUTHORIZED_USER_ACTIVITY"));

    let report = Pipeline::new(model.clone(), Arc::clone(&store))
        .run(&[record("a1", "this is our offsec team")], None)
        .await;

    assert_eq!(
        report,
        RunReport {
            eligible: 1,
            already_processed: 0,
            submitted: 1,
            classified: 1,
            skipped: 0,
            write_failures: 0,
        }
    );

    let contents = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(contents.lines().count(), 1);
    let result: ClassificationResult = serde_json::from_str(contents.trim()).unwrap();
    assert_eq!(result.alert_id, "a1");
    assert_eq!(result.theme, Theme::AuthorizedUserActivity);
    assert_eq!(result.confidence, "HIGH");
    assert!(result.processed_at <= Utc::now());
    assert!(store.contains("a1"));
}

#[tokio::test]
async fn out_of_set_theme_is_stored_as_other() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let model = Arc::new(StubModel::classifying("NOT_A_REAL_THEME"));

    let report = Pipeline::new(model, Arc::clone(&store))
        .run(&records(&["a1"]), None)
        .await;

    assert_eq!(report.classified, 1);
    let results = store.results().unwrap();
    assert_eq!(results[0].theme, Theme::Other);
}

#[tokio::test]
async fn resume_skips_stored_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("axial_coding.json");
    {
        let seed = ResultStore::open(&path).unwrap();
        seed.append(&ClassificationResult {
            alert_id: "a1".into(),
            theme: Theme::LegitimateSoftware,
            confidence: "HIGH".into(),
            reasoning: String::new(),
            missing_context: String::new(),
            trend_insight: String::new(),
            processed_at: Utc::now(),
        })
        .unwrap();
    }

    let store = Arc::new(ResultStore::open(&path).unwrap());
    let model = Arc::new(StubModel::classifying("LEGITIMATE_SOFTWARE"));
    let report = Pipeline::new(model.clone(), Arc::clone(&store))
        .run(&records(&["a1", "a2"]), None)
        .await;

    assert_eq!(model.calls(), vec!["a2".to_string()]);
    assert_eq!(report.already_processed, 1);
    assert_eq!(report.classified, 1);
    assert_eq!(stored_ids(&store), vec!["a1", "a2"]);
}

#[tokio::test]
async fn rerun_after_completion_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let input = records(&["a1", "a2", "a3"]);

    let first = Pipeline::new(
        Arc::new(StubModel::classifying("OTHER")),
        open_store(&dir),
    )
    .run(&input, None)
    .await;
    assert_eq!(first.classified, 3);

    let model = Arc::new(StubModel::classifying("OTHER"));
    let store = open_store(&dir);
    let second = Pipeline::new(model.clone(), Arc::clone(&store))
        .run(&input, None)
        .await;

    assert_eq!(second.submitted, 0);
    assert_eq!(second.already_processed, 3);
    assert!(model.calls().is_empty());
    assert_eq!(load_results(store.path()).unwrap().len(), 3);
}

#[tokio::test]
async fn one_failure_does_not_affect_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let input = records(&["a1", "a2", "a3", "a4", "a5"]);
    let model = Arc::new(
        StubModel::classifying("LEGITIMATE_SOFTWARE")
            .reply("a3", Reply::Fail)
            .reply("a4", Reply::Text("not json at all".into())),
    );

    let report = Pipeline::new(model, Arc::clone(&store))
        .workers(2)
        .run(&input, None)
        .await;

    assert_eq!(report.classified, 3);
    assert_eq!(report.skipped, 2);
    assert_eq!(stored_ids(&store), vec!["a1", "a2", "a5"]);

    // The failed ids are picked up again on the next run.
    let retry_model = Arc::new(StubModel::classifying("LEGITIMATE_SOFTWARE"));
    let retry = Pipeline::new(retry_model.clone(), open_store(&dir))
        .run(&input, None)
        .await;
    let mut retried = retry_model.calls();
    retried.sort();
    assert_eq!(retried, vec!["a3", "a4"]);
    assert_eq!(retry.classified, 2);
}

#[rstest]
#[case::ten_chars("abcdefghij", false)]
#[case::ten_chars_padded("   abcdefghij   ", false)]
#[case::eleven_chars("abcdefghijk", true)]
#[tokio::test]
async fn eligibility_boundary(#[case] comment: &str, #[case] submitted: bool) {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(StubModel::classifying("OTHER"));

    let report = Pipeline::new(model.clone(), open_store(&dir))
        .run(&[record("a1", comment)], None)
        .await;

    assert_eq!(report.submitted, usize::from(submitted));
    assert_eq!(model.calls().len(), usize::from(submitted));
}

#[tokio::test]
async fn limit_caps_eligible_before_resume_filter() {
    let dir = tempfile::tempdir().unwrap();
    let input = vec![
        record("a1", "short"),
        record("a2", "this is our offsec team"),
        record("a3", "Legitimate application/binary"),
        record("a4", "No malicious activity noted"),
    ];

    let model = Arc::new(StubModel::classifying("OTHER"));
    let first = Pipeline::new(model.clone(), open_store(&dir))
        .run(&input, Some(2))
        .await;
    assert_eq!(first.eligible, 2);
    let mut seen = model.calls();
    seen.sort();
    assert_eq!(seen, vec!["a2", "a3"]);

    let again = Arc::new(StubModel::classifying("OTHER"));
    let second = Pipeline::new(again.clone(), open_store(&dir))
        .run(&input, Some(2))
        .await;
    assert_eq!(second.submitted, 0);
    assert!(again.calls().is_empty());
}

#[tokio::test]
async fn worker_limit_bounds_concurrency() {
    let dir = tempfile::tempdir().unwrap();
    let ids: Vec<String> = (0..20).map(|n| format!("alert-{n}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let model = Arc::new(StubModel::classifying("OTHER").delay(Duration::from_millis(5)));

    let report = Pipeline::new(model.clone(), open_store(&dir))
        .workers(3)
        .run(&records(&id_refs), None)
        .await;

    assert_eq!(report.classified, 20);
    assert!(model.max_in_flight() <= 3);
    assert!(model.max_in_flight() >= 1);
}

#[tokio::test]
async fn slow_call_is_skipped_after_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let model = Arc::new(StubModel::classifying("OTHER").delay(Duration::from_millis(500)));

    let report = Pipeline::new(model, Arc::clone(&store))
        .call_timeout(Duration::from_millis(20))
        .run(&records(&["a1"]), None)
        .await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.classified, 0);
    assert!(store.processed_ids().is_empty());
}

#[tokio::test]
async fn progress_reported_after_each_completion() {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(std::sync::Mutex::new(None));

    let observer = {
        let calls = Arc::clone(&calls);
        let last = Arc::clone(&last);
        Arc::new(move |progress: Progress| {
            calls.fetch_add(1, Ordering::SeqCst);
            *last.lock().unwrap() = Some(progress);
        })
    };

    let model = Arc::new(
        StubModel::new(Reply::Text(classification("OTHER", "LOW"))).reply("a2", Reply::Fail),
    );
    Pipeline::new(model, open_store(&dir))
        .with_progress(observer)
        .run(&records(&["a1", "a2", "a3"]), None)
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        *last.lock().unwrap(),
        Some(Progress {
            completed: 3,
            total: 3
        })
    );
}

#[tokio::test]
async fn many_workers_write_whole_lines() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let ids: Vec<String> = (0..120).map(|n| format!("alert-{n:03}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

    let report = Pipeline::new(Arc::new(StubModel::classifying("OTHER")), Arc::clone(&store))
        .workers(8)
        .run(&records(&id_refs), None)
        .await;
    assert_eq!(report.classified, 120);

    let contents = std::fs::read_to_string(store.path()).unwrap();
    let parsed: HashSet<String> = contents
        .lines()
        .map(|line| serde_json::from_str::<ClassificationResult>(line).unwrap().alert_id)
        .collect();
    assert_eq!(parsed.len(), 120);
}

#[tokio::test]
async fn repeated_alert_id_is_classified_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let model = Arc::new(StubModel::classifying("OTHER"));

    let report = Pipeline::new(model.clone(), Arc::clone(&store))
        .run(&records(&["a1", "a1", "a2"]), None)
        .await;

    assert_eq!(report.eligible, 2);
    assert_eq!(report.submitted, 2);
    assert_eq!(report.classified, 2);
    let mut calls = model.calls();
    calls.sort();
    assert_eq!(calls, vec!["a1", "a2"]);

    let contents = std::fs::read_to_string(store.path()).unwrap();
    let a1_lines = contents
        .lines()
        .filter(|line| {
            serde_json::from_str::<ClassificationResult>(line).unwrap().alert_id == "a1"
        })
        .count();
    assert_eq!(a1_lines, 1);
}

#[tokio::test]
async fn failed_write_is_counted_and_retried_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("axial_coding.json");
    let aside = dir.path().join("axial_coding.json.aside");
    let store = Arc::new(ResultStore::open(&path).unwrap());
    let input = records(&["a1", "a2", "a3"]);

    // The output path is a directory while the second result is written.
    let observer = {
        let (path, aside) = (path.clone(), aside.clone());
        Arc::new(move |progress: Progress| match progress.completed {
            1 => {
                std::fs::rename(&path, &aside).unwrap();
                std::fs::create_dir(&path).unwrap();
            }
            2 => {
                std::fs::remove_dir(&path).unwrap();
                std::fs::rename(&aside, &path).unwrap();
            }
            _ => {}
        })
    };

    let report = Pipeline::new(
        Arc::new(StubModel::classifying("OTHER")),
        Arc::clone(&store),
    )
    .with_progress(observer)
    .run(&input, None)
    .await;

    assert_eq!(report.submitted, 3);
    assert_eq!(report.classified, 2);
    assert_eq!(report.write_failures, 1);
    assert_eq!(report.skipped, 0);

    let stored = stored_ids(&store);
    assert_eq!(stored.len(), 2);
    let missing: Vec<&str> = ["a1", "a2", "a3"]
        .into_iter()
        .filter(|id| !stored.iter().any(|s| s == id))
        .collect();
    assert_eq!(missing.len(), 1);
    assert!(!store.contains(missing[0]));

    let retry_model = Arc::new(StubModel::classifying("OTHER"));
    let retry = Pipeline::new(
        retry_model.clone(),
        Arc::new(ResultStore::open(&path).unwrap()),
    )
    .run(&input, None)
    .await;
    assert_eq!(retry_model.calls(), vec![missing[0].to_string()]);
    assert_eq!(retry.classified, 1);
}
