//! Section generation against the text-generation API.
//!
//! Each section becomes one chat completion: the shared analyst instructions
//! as the system message, the section's rendered template as the user
//! message, and, when the section's sectors produced any search results, a
//! second user message carrying that context. Requests go out with the
//! configured model and reasoning effort; a failure is returned to the
//! caller, which decides whether the run can continue.

use async_trait::async_trait;

use super::chat::{ChatMessage, ChatRequest};
use super::config::{ReasoningEffort, ReportConfig};
use super::core::{ApiClient, ClientSettings};
use super::error::Result;
use super::prompts;
use super::section::SectionId;
use super::traits::GenerationOperations;

const SEARCH_PREAMBLE: &str = "Here is the latest information from web searches:\n\n";

/// Values substituted into prompt templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptVars {
    pub firm_name: String,
    pub report_date: String,
    pub year: String,
}

impl PromptVars {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            firm_name: config.firm_name.clone(),
            report_date: config.report_date.clone(),
            year: config.report_year(),
        }
    }
}

/// Replaces `{firm_name}`, `{report_date}` and `{year}` in a template.
///
/// Unknown braces are left alone, so templates may contain literal `{` text.
pub fn render_prompt(template: &str, vars: &PromptVars) -> String {
    template
        .replace("{firm_name}", &vars.firm_name)
        .replace("{report_date}", &vars.report_date)
        .replace("{year}", &vars.year)
}

/// Builds section prompts and sends them to a [`GenerationOperations`] backend.
#[derive(Debug, Clone)]
pub struct SectionGenerator<G> {
    generator: G,
    vars: PromptVars,
}

impl<G: GenerationOperations> SectionGenerator<G> {
    pub fn new(generator: G, vars: PromptVars) -> Self {
        Self { generator, vars }
    }

    pub fn vars(&self) -> &PromptVars {
        &self.vars
    }

    /// The messages sent for `section` given its formatted search context.
    pub fn build_messages(&self, section: SectionId, search_context: &str) -> Vec<ChatMessage> {
        let mut messages = vec![
            ChatMessage::system(render_prompt(prompts::SYSTEM, &self.vars)),
            ChatMessage::user(render_prompt(section.template(), &self.vars)),
        ];

        if !search_context.trim().is_empty() {
            messages.push(ChatMessage::user(format!(
                "{}{}",
                SEARCH_PREAMBLE, search_context
            )));
        }

        messages
    }

    /// Generates one section. Exactly one boundary call.
    ///
    /// # Arguments
    ///
    /// * `section` - Which section to write; selects the prompt template
    /// * `search_context` - Output of [`crate::SearchContext::for_sectors`];
    ///   blank text means no search message is sent
    ///
    /// # Errors
    ///
    /// Whatever the backend returns. The pipeline records it as a section
    /// failure rather than stopping the run.
    pub async fn generate(&self, section: SectionId, search_context: &str) -> Result<String> {
        let messages = self.build_messages(section, search_context);
        tracing::info!(
            "Generating section {}/{}: {}",
            section.order(),
            SectionId::ALL.len(),
            section.title()
        );
        self.generator.complete(messages).await
    }
}

/// Generation API client for OpenAI chat completions.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    api: ApiClient,
    model: String,
    reasoning_effort: ReasoningEffort,
    temperature: Option<f32>,
}

impl GenerationClient {
    /// Creates a generation client from the report configuration.
    ///
    /// Every request carries `config.generation_model` and
    /// `config.reasoning_effort`; `temperature` is only sent when configured.
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration; only the generation fields are read
    ///
    /// # Errors
    ///
    /// Returns `ReportError::ConfigError` if the underlying [`ApiClient`]
    /// cannot be built.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use portfolio_report::{ChatMessage, GenerationClient, GenerationOperations, ReportConfig};
    ///
    /// let config = ReportConfig::from_env()?;
    /// let client = GenerationClient::new(&config)?;
    /// let text = client.complete(vec![ChatMessage::user("Summarize LNG shipping.")]).await?;
    /// ```
    pub fn new(config: &ReportConfig) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(ClientSettings::generation(config))?,
            model: config.generation_model.clone(),
            reasoning_effort: config.reasoning_effort,
            temperature: config.temperature,
        })
    }

    pub fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest::new(&self.model, messages)
            .with_reasoning_effort(self.reasoning_effort.as_str())
            .with_temperature(self.temperature)
    }
}

#[async_trait]
impl GenerationOperations for GenerationClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = self.request(messages);
        let response = self.api.chat(&request).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                "Completion used {} prompt + {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }
        response.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl GenerationOperations for Recorder {
        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
            self.seen.lock().unwrap().push(messages);
            Ok("body".to_string())
        }
    }

    fn vars() -> PromptVars {
        PromptVars {
            firm_name: "Orasis Capital".to_string(),
            report_date: "April 4, 2025".to_string(),
            year: "2025".to_string(),
        }
    }

    #[test]
    fn test_render_prompt() {
        let rendered = render_prompt("{firm_name} on {report_date} ({year}) {other}", &vars());
        assert_eq!(rendered, "Orasis Capital on April 4, 2025 (2025) {other}");
    }

    #[test]
    fn test_messages_without_context() {
        let generator = SectionGenerator::new(
            Recorder {
                seen: Mutex::new(Vec::new()),
            },
            vars(),
        );
        let messages = generator.build_messages(SectionId::ExecutiveSummary, "  ");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("Orasis Capital"));
        assert!(messages[1].content.contains("April 4, 2025"));
        assert!(!messages[1].content.contains("{report_date}"));
    }

    #[test]
    fn test_messages_with_context() {
        let generator = SectionGenerator::new(
            Recorder {
                seen: Mutex::new(Vec::new()),
            },
            vars(),
        );
        let messages = generator.build_messages(SectionId::EnergyMarkets, "Brent at $80");

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, Role::User);
        assert_eq!(
            messages[2].content,
            "Here is the latest information from web searches:\n\nBrent at $80"
        );
    }

    #[tokio::test]
    async fn test_generate_makes_one_call() {
        let recorder = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        let generator = SectionGenerator::new(&recorder, vars());

        let text = generator.generate(SectionId::Shipping, "").await.unwrap();
        assert_eq!(text, "body");
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_request_carries_reasoning_effort() {
        let config = ReportConfig::new("sk-test", "pplx-test").unwrap();
        let client = GenerationClient::new(&config).unwrap();
        let request = client.request(vec![ChatMessage::user("hi")]);

        assert_eq!(request.model, "o3-mini");
        assert_eq!(request.reasoning_effort.as_deref(), Some("high"));
        assert_eq!(request.temperature, None);
    }
}
