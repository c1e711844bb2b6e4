//! Tests for NDJSON trace export and import.

#![cfg(feature = "ndjson")]

use bracket_pda::*;
use std::io::Write;

fn write_lines(dir: &tempfile::TempDir, filename: &str, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join(filename);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

#[test]
fn test_emitter_creates_ndjson() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.ndjson");

    let trace = simulate("([)");
    let count = write_ndjson(&trace, &path).unwrap();
    assert_eq!(count, trace.len());

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);

    let line0: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(line0["index"], 0);
    assert_eq!(line0["state"], "initial");
    assert_eq!(line0["action"], "initialize");
    assert_eq!(line0["stack"], "Z");
    assert_eq!(line0["input"], "([)");

    let line2: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
    assert_eq!(line2["action"], "push");
    assert_eq!(line2["read"], "[");
    assert_eq!(line2["stack"], "Z([");
    assert!(line2.get("previousTop").is_none());

    let line3: serde_json::Value = serde_json::from_str(lines[3]).unwrap();
    assert_eq!(line3["state"], "reject");
    assert_eq!(line3["action"], "pop");
    assert_eq!(line3["rejectReason"], "mismatch");
    assert_eq!(line3["previousTop"], "[");
    assert_eq!(line3["position"], 2);
}

#[test]
fn test_export_then_load_preserves_trace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.ndjson");

    for input in ["", "{[()]}", "((", "}"] {
        let trace = simulate(input);
        write_ndjson(&trace, &path).unwrap();
        let loaded = read_ndjson(&path).unwrap();
        assert_eq!(loaded, trace, "input {input:?}");
        assert!(replay_trace(&loaded).is_ok(), "input {input:?}");
    }
}

#[test]
fn test_emitter_counts_steps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.ndjson");

    let trace = simulate("()");
    let mut emitter = TraceEmitter::new(&path).unwrap();
    emitter.emit(&trace[0]).unwrap();
    assert_eq!(emitter.count(), 1);
    emitter.emit(&trace[1]).unwrap();
    assert_eq!(emitter.count(), 2);
    assert_eq!(emitter.finish().unwrap(), 2);
}

#[test]
fn test_load_skips_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(
        &dir,
        "blank.ndjson",
        &[
            r#"{"index": 0, "state": "initial", "action": "initialize", "stack": "Z", "input": ")", "position": 0}"#,
            "",
            "   ",
            r#"{"index": 1, "state": "reject", "action": "pop", "stack": "Z", "input": ")", "position": 0, "read": ")", "rejectReason": "emptyStack"}"#,
        ],
    );

    let trace = read_ndjson(&path).unwrap();
    assert_eq!(trace.len(), 2);
    assert_eq!(trace.terminal().unwrap().reject_reason(), Some(RejectReason::EmptyStack));
}

#[test]
fn test_load_reports_invalid_json_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(
        &dir,
        "bad.ndjson",
        &[
            r#"{"index": 0, "state": "initial", "action": "initialize", "stack": "Z", "input": "", "position": 0}"#,
            r#"{"index": 1, "state": "accept""#,
        ],
    );

    let err = read_ndjson(&path).unwrap_err();
    assert!(
        matches!(err, Error::Export(ExportError::InvalidJson { line: 2, .. })),
        "{err}"
    );
}

#[test]
fn test_load_reports_out_of_order_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(
        &dir,
        "order.ndjson",
        &[
            r#"{"index": 1, "state": "initial", "action": "initialize", "stack": "Z", "input": "", "position": 0}"#,
        ],
    );

    let err = read_ndjson(&path).unwrap_err();
    assert!(
        matches!(
            err,
            Error::Export(ExportError::OutOfOrder { line: 1, expected: 0, found: 1 })
        ),
        "{err}"
    );
}

#[test]
fn test_load_reports_inconsistent_record() {
    let content = concat!(
        r#"{"state": "initial", "action": "initialize", "stack": "Z", "input": "(", "position": 0}"#,
        "\n",
        r#"{"state": "processing", "action": "push", "stack": "Z(", "input": "(", "position": 0, "read": ")"}"#,
    );

    let err = parse_ndjson(content).unwrap_err();
    match err {
        Error::Export(ExportError::InvalidRecord { line, reason }) => {
            assert_eq!(line, 2);
            assert!(reason.contains("opening bracket"), "reason: {reason}");
        }
        other => panic!("Expected invalid record, got: {other}"),
    }
}

#[test]
fn test_load_checks_trace_invariants() {
    let content = concat!(
        r#"{"state": "initial", "action": "initialize", "stack": "Z", "input": "(", "position": 0}"#,
        "\n",
        r#"{"state": "processing", "action": "push", "stack": "Z(", "input": "(", "position": 0, "read": "("}"#,
    );

    let err = parse_ndjson(content).unwrap_err();
    assert!(
        matches!(err, Error::Replay(ReplayError::Unterminated { .. })),
        "{err}"
    );
}

#[test]
fn test_load_refuses_corrupted_stack() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(
        &dir,
        "corrupted.ndjson",
        &[
            r#"{"index": 0, "state": "initial", "action": "initialize", "stack": "Z", "input": "(", "position": 0}"#,
            r#"{"index": 1, "state": "processing", "action": "push", "stack": "Z[[[[", "input": "(", "position": 0, "read": "("}"#,
            r#"{"index": 2, "state": "reject", "action": "complete", "stack": "Z[[[[", "input": "(", "position": 1, "rejectReason": "nonEmptyStack"}"#,
        ],
    );

    let err = read_ndjson(&path).unwrap_err();
    assert!(
        matches!(err, Error::Replay(ReplayError::StackMismatch { step: 1, .. })),
        "{err}"
    );
}

#[test]
fn test_load_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_lines(&dir, "empty.ndjson", &[]);

    let err = read_ndjson(&path).unwrap_err();
    assert!(matches!(err, Error::Export(ExportError::EmptyTrace(_))), "{err}");
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_ndjson(&dir.path().join("missing.ndjson")).unwrap_err();
    assert!(
        matches!(err, Error::Export(ExportError::TraceFileNotFound(_))),
        "{err}"
    );
}
