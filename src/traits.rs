//! Trait definitions for the two boundary calls.
//!
//! The pipeline only talks to the outside world through these traits: one
//! web search per query, one chat completion per section. The HTTP clients
//! in [`crate::SearchClient`] and [`crate::GenerationClient`] implement them,
//! and tests swap in stubs that return fixed text.

use super::chat::ChatMessage;
use super::error::Result;
use async_trait::async_trait;

/// A web-search API: query in, snippet text out.
#[async_trait]
pub trait SearchOperations: Send + Sync {
    /// Runs one search query and returns the answer text.
    async fn search(&self, query: &str) -> Result<String>;
}

/// A text-generation API: messages in, markdown out.
#[async_trait]
pub trait GenerationOperations: Send + Sync {
    /// Sends one prompt and returns the generated text.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

#[async_trait]
impl<T: SearchOperations + ?Sized> SearchOperations for &T {
    async fn search(&self, query: &str) -> Result<String> {
        (**self).search(query).await
    }
}

#[async_trait]
impl<T: GenerationOperations + ?Sized> GenerationOperations for &T {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        (**self).complete(messages).await
    }
}
