mod common;

use common::{foo_tools, write_bundle, write_report, CRASH_REPORT};
use symbolicator::domain::{Dialect, Field, SymbolicationError};
use symbolicator::pipeline::{JobRequest, Symbolicator, Worker};

#[tokio::test]
async fn test_worker_completes_each_job_once() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_report(dir.path(), "Foo.crash", CRASH_REPORT);
    let bad = write_report(dir.path(), "Bar.crash", "Process: Bar [2]\n");
    let bundle = write_bundle(dir.path(), "Foo", "app");
    let tools = foo_tools();

    let worker = Worker::spawn(Symbolicator::new(tools.clone(), dir.path().to_path_buf()));
    let first = worker
        .submit(JobRequest { report: good, bundles: vec![bundle.clone()], dialect: None })
        .await;
    let second = worker
        .submit(JobRequest { report: bad, bundles: vec![bundle], dialect: Some(Dialect::Crash) })
        .await;

    let output = first.await.unwrap().unwrap();
    assert!(output.output_path.ends_with("Foo_Symbolicated-File.txt"));
    assert_eq!(output.uuids.len(), 2);

    let err = second.await.unwrap().unwrap_err();
    assert!(matches!(err, SymbolicationError::MissingField(Field::BundleIdentifier)));

    worker.shutdown().await;
    // Only the first job got as far as the resolver
    assert_eq!(tools.resolve_calls().len(), 2);
}

#[tokio::test]
async fn test_run_returns_job_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.crash");

    let worker = Worker::spawn(Symbolicator::new(foo_tools(), dir.path().to_path_buf()));
    let err = worker
        .run(JobRequest { report: missing, bundles: Vec::new(), dialect: None })
        .await
        .unwrap_err();
    assert!(matches!(err, SymbolicationError::ReportUnreadable { .. }));
    worker.shutdown().await;
}

#[tokio::test]
async fn test_output_serializes_for_json() {
    let dir = tempfile::tempdir().unwrap();
    let report = write_report(dir.path(), "Foo.crash", CRASH_REPORT);
    let bundle = write_bundle(dir.path(), "Foo", "app");

    let worker = Worker::spawn(Symbolicator::new(foo_tools(), dir.path().to_path_buf()));
    let output = worker
        .run(JobRequest { report, bundles: vec![bundle], dialect: None })
        .await
        .unwrap();
    worker.shutdown().await;

    let json: serde_json::Value = serde_json::to_value(&output).unwrap();
    assert_eq!(json["images"], serde_json::json!(["Foo", "com.acme.Foo"]));
    assert!(json["output_path"].as_str().unwrap().ends_with("Foo_Symbolicated-File.txt"));
}
