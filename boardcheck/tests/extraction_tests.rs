//! Tests for pulling designs out of streamed tool calls

use boardcheck::extract::{ProjectType, ToolCallAccumulator};
use boardcheck::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Splits the fixture's argument string into SSE lines the way a chat
/// completion stream delivers them.
fn stream_lines(chunk_size: usize) -> Vec<String> {
    let content = std::fs::read_to_string(fixture_path("tool_call.json")).unwrap();
    let call: serde_json::Value = serde_json::from_str(&content).unwrap();
    let arguments = call["function"]["arguments"].as_str().unwrap().to_string();

    let mut lines = vec![format!(
        "data: {}",
        serde_json::json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "function": {"name": "generate_pcb_project", "arguments": ""}}]}}]})
    )];
    let chars: Vec<char> = arguments.chars().collect();
    for piece in chars.chunks(chunk_size) {
        let fragment: String = piece.iter().collect();
        lines.push(format!(
            "data: {}",
            serde_json::json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "function": {"arguments": fragment}}]}}]})
        ));
        lines.push(String::new());
    }
    lines.push(format!(
        "data: {}",
        serde_json::json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}]})
    ));
    lines.push("data: [DONE]".to_string());
    lines
}

#[test]
fn test_streamed_tool_call_matches_document() {
    let mut call = ToolCallAccumulator::new();
    let mut finished = false;
    for line in stream_lines(17) {
        finished = call.feed_sse_line(&line);
    }
    assert!(finished);
    assert_eq!(call.name(), Some("generate_pcb_project"));

    let project = call.finish().expect("complete arguments should parse");
    assert_eq!(project.project_name, "Meshtastic Node");
    assert_eq!(project.project_type, ProjectType::Meshtastic);

    let streamed = project.snapshot();
    let (loaded, board) = boardcheck::load_design(&fixture_path("tool_call.json")).unwrap();
    assert_eq!(streamed, loaded);
    assert_eq!(project.board(), board.unwrap());
}

#[test]
fn test_streamed_design_validates_like_file() {
    let mut call = ToolCallAccumulator::new();
    for line in stream_lines(5) {
        call.feed_sse_line(&line);
    }
    let snapshot = call.finish().unwrap().snapshot();

    let from_stream = BoardCheckCore::validate(&snapshot, &ValidationOptions::default()).unwrap();
    let from_file =
        BoardCheckCore::validate_file(&fixture_path("tool_call.json"), &ValidationOptions::default())
            .unwrap();
    assert_eq!(from_stream.findings, from_file.findings);
}

#[test]
fn test_truncated_stream_fails_to_finish() {
    let lines = stream_lines(20);
    let mut call = ToolCallAccumulator::new();
    // drop the tail: arguments are cut mid-object
    for line in &lines[..lines.len() / 2] {
        call.feed_sse_line(line);
    }
    assert!(!call.is_finished());
    assert!(call.finish().is_err());
}
