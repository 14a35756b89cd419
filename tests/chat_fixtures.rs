mod common;

use common::read_fixture;
use portfolio_report::{ChatResponse, ReportError};

#[test]
fn parse_generation_completion() {
    let content = read_fixture("chat/completion.json");
    let response: ChatResponse = serde_json::from_str(&content).unwrap();

    assert_eq!(response.model.as_deref(), Some("o3-mini-2025-01-31"));
    let usage = response.usage.clone().unwrap();
    assert_eq!(usage.prompt_tokens, 1532);
    assert_eq!(usage.completion_tokens, 4210);
    assert_eq!(usage.total_tokens, 5742);
    assert!(response.citations.is_empty());

    let text = response.into_text().unwrap();
    assert!(text.starts_with("### Executive Summary"));
    assert!(text.contains("| Frontline (FRO) | Long | 20% |"));
}

#[test]
fn parse_search_completion() {
    let content = read_fixture("chat/search_completion.json");
    let response: ChatResponse = serde_json::from_str(&content).unwrap();

    assert_eq!(response.citations.len(), 2);
    let text = response.into_text().unwrap();
    assert!(text.contains("Baltic Dry Index"));
}

#[test]
fn completion_without_content_is_an_error() {
    let response: ChatResponse = serde_json::from_str(
        r#"{"choices":[{"index":0,"message":{"role":"assistant","content":null}}]}"#,
    )
    .unwrap();

    assert!(matches!(
        response.into_text(),
        Err(ReportError::EmptyCompletion)
    ));
}

#[test]
fn completion_without_choices_is_an_error() {
    let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
    assert!(matches!(
        response.into_text(),
        Err(ReportError::EmptyCompletion)
    ));
}
