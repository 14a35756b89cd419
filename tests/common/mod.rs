use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use portfolio_report::{
    ChatMessage, GenerationOperations, ReportConfig, ReportError, SearchOperations,
};

pub fn fixture_path(relative: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn read_fixture(relative: impl AsRef<Path>) -> String {
    fs::read_to_string(fixture_path(relative)).expect("fixture file should be readable")
}

#[allow(dead_code)]
pub fn config(output_dir: impl AsRef<Path>) -> ReportConfig {
    ReportConfig::new("sk-test", "pplx-test")
        .unwrap()
        .with_report_date("April 4, 2025")
        .with_output_dir(output_dir.as_ref())
}

/// Search stub. Answers every query, answers nothing, or fails.
#[allow(dead_code)]
pub enum SearchMode {
    Echo,
    Empty,
    Fail,
}

#[allow(dead_code)]
pub struct StubSearch {
    mode: SearchMode,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl StubSearch {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchOperations for StubSearch {
    async fn search(&self, query: &str) -> portfolio_report::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            SearchMode::Echo => Ok(format!("answer for {}", query)),
            SearchMode::Empty => Ok(String::new()),
            SearchMode::Fail => Err(ReportError::ApiError {
                status: 503,
                body: "search unavailable".to_string(),
            }),
        }
    }
}

/// Generation stub returning `replies[n]` for the n-th call.
#[allow(dead_code)]
pub struct StubGenerator {
    replies: Vec<String>,
    failing: Vec<usize>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

#[allow(dead_code)]
impl StubGenerator {
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies,
            failing: Vec::new(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Makes the given 0-based calls fail.
    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.failing = calls.to_vec();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationOperations for StubGenerator {
    async fn complete(&self, messages: Vec<ChatMessage>) -> portfolio_report::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages);

        if self.failing.contains(&n) {
            return Err(ReportError::ApiError {
                status: 500,
                body: "stub failure".to_string(),
            });
        }
        Ok(self.replies[n % self.replies.len()].clone())
    }
}
