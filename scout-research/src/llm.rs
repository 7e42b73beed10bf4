//! LLM client integration using siumai
//!
//! This module provides the [`TextGenerator`] seam used by every research
//! component, plus a siumai-backed implementation supporting multiple
//! providers. Structured ("object") generation is prompt-for-JSON with a
//! tolerant bracket-extraction parse, since chat providers frequently wrap
//! JSON in prose or code fences.

use async_trait::async_trait;
use scout_core::{ScoutError, ScoutResult};
use serde::de::DeserializeOwned;
use siumai::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A single generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System prompt establishing the persona and output contract.
    pub system: String,
    /// User prompt.
    pub prompt: String,
    /// Ask the provider to perform its own live web retrieval before
    /// answering. Only honored by search-capable providers; others answer
    /// from model knowledge.
    pub search_grounding: bool,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            search_grounding: false,
        }
    }

    pub fn grounded(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            search_grounding: true,
        }
    }
}

/// A structured source citation returned alongside generated text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceRef {
    pub url: String,
    pub title: Option<String>,
}

/// The outcome of a generation call.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub text: String,
    /// Structured citations, when the provider supplies them. Providers
    /// without native citation support leave this empty and callers fall
    /// back to parsing `SOURCE:` lines out of the text.
    pub sources: Vec<SourceRef>,
}

/// Text/object-generation service boundary.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> ScoutResult<Generation>;
}

/// Provider configuration for a siumai-backed generator.
#[derive(Debug, Clone)]
pub struct LlmProviderConfig {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Unified LLM client that supports multiple providers.
///
/// Holds a primary chat client and, optionally, a second client backed by a
/// search-capable provider used for grounded requests.
pub struct SiumaiGenerator {
    client: Box<dyn LlmClient>,
    grounded_client: Option<Box<dyn LlmClient>>,
    config: LlmProviderConfig,
}

impl SiumaiGenerator {
    /// Create a new generator for the given provider configuration.
    pub async fn new(config: LlmProviderConfig) -> ScoutResult<Self> {
        let client = Self::build_client(&config).await?;

        info!(
            "Created LLM client for provider: {} with model: {}",
            config.provider, config.model
        );

        Ok(Self {
            client,
            grounded_client: None,
            config,
        })
    }

    /// Attach a search-capable provider used when grounding is requested.
    pub async fn with_grounded(mut self, config: LlmProviderConfig) -> ScoutResult<Self> {
        let client = Self::build_client(&config).await?;
        info!(
            "Attached grounded LLM client: {} ({})",
            config.provider, config.model
        );
        self.grounded_client = Some(client);
        Ok(self)
    }

    /// Build the appropriate siumai client based on configuration
    async fn build_client(config: &LlmProviderConfig) -> ScoutResult<Box<dyn LlmClient>> {
        match config.provider.as_str() {
            "openai" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .ok_or_else(|| ScoutError::config("OpenAI API key not found", "llm"))?;

                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                if let Some(base_url) = &config.base_url {
                    builder = builder.base_url(base_url);
                }

                let client = builder.build().await.map_err(|e| {
                    ScoutError::generation(format!("Failed to build OpenAI client: {}", e), "llm")
                })?;

                Ok(Box::new(client))
            }
            "anthropic" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                    .ok_or_else(|| ScoutError::config("Anthropic API key not found", "llm"))?;

                let mut builder = LlmBuilder::new()
                    .anthropic()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    ScoutError::generation(format!("Failed to build Anthropic client: {}", e), "llm")
                })?;

                Ok(Box::new(client))
            }
            "groq" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("GROQ_API_KEY").ok())
                    .ok_or_else(|| ScoutError::config("Groq API key not found", "llm"))?;

                let mut builder = LlmBuilder::new()
                    .groq()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    ScoutError::generation(format!("Failed to build Groq client: {}", e), "llm")
                })?;

                Ok(Box::new(client))
            }
            "ollama" => {
                let base_url = config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string());

                let mut builder = LlmBuilder::new()
                    .ollama()
                    .model(&config.model)
                    .base_url(&base_url)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    ScoutError::generation(format!("Failed to build Ollama client: {}", e), "llm")
                })?;

                Ok(Box::new(client))
            }
            provider => Err(ScoutError::config(
                format!("Unsupported LLM provider: {}", provider),
                "llm",
            )),
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &LlmProviderConfig {
        &self.config
    }
}

#[async_trait]
impl TextGenerator for SiumaiGenerator {
    async fn generate(&self, request: GenerationRequest) -> ScoutResult<Generation> {
        let start_time = Instant::now();

        let client = if request.search_grounding {
            match &self.grounded_client {
                Some(client) => client,
                None => {
                    debug!("No grounded provider configured, using primary client");
                    &self.client
                }
            }
        } else {
            &self.client
        };

        let messages = vec![
            system!(request.system.as_str()),
            user!(request.prompt.as_str()),
        ];

        let response = client
            .chat(messages)
            .await
            .map_err(|e| ScoutError::generation(format!("LLM generation failed: {}", e), "llm"))?;

        let generation_time = start_time.elapsed();

        if let Some(content) = response.content_text() {
            info!(
                "Generated response in {:?} ({} chars, grounded: {})",
                generation_time,
                content.len(),
                request.search_grounding
            );
            // siumai does not surface provider citation metadata uniformly,
            // so structured sources stay empty here; grounded callers parse
            // SOURCE: lines out of the text instead.
            Ok(Generation {
                text: content.to_string(),
                sources: Vec::new(),
            })
        } else {
            Err(ScoutError::generation(
                "No text content in LLM response",
                "llm",
            ))
        }
    }
}

/// Helper functions for creating common LLM configurations
pub mod configs {
    use super::*;

    /// Create OpenAI GPT-4o-mini configuration
    pub fn openai_gpt4o_mini() -> LlmProviderConfig {
        LlmProviderConfig {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(4000),
        }
    }

    /// Create Anthropic Claude Haiku configuration
    pub fn anthropic_claude_haiku() -> LlmProviderConfig {
        LlmProviderConfig {
            provider: "anthropic".to_string(),
            model: "claude-3-5-haiku-20241022".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(4000),
        }
    }

    /// Create Groq configuration
    pub fn groq_llama3() -> LlmProviderConfig {
        LlmProviderConfig {
            provider: "groq".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(4000),
        }
    }

    /// Perplexity exposes an OpenAI-compatible API whose sonar models
    /// perform live web retrieval, which is what grounded requests need.
    pub fn perplexity_sonar() -> LlmProviderConfig {
        LlmProviderConfig {
            provider: "openai".to_string(),
            model: "sonar-pro".to_string(),
            api_key: std::env::var("PERPLEXITY_API_KEY").ok(),
            base_url: Some("https://api.perplexity.ai".to_string()),
            temperature: 0.3,
            max_tokens: Some(4000),
        }
    }
}

/// Create a generator with automatic provider detection.
///
/// Tries providers in order of preference based on which API keys are
/// present, and attaches a grounded client when a search-capable provider
/// is configured.
pub async fn create_auto_generator() -> ScoutResult<SiumaiGenerator> {
    let providers = vec![
        ("openai", "OPENAI_API_KEY", configs::openai_gpt4o_mini()),
        (
            "anthropic",
            "ANTHROPIC_API_KEY",
            configs::anthropic_claude_haiku(),
        ),
        ("groq", "GROQ_API_KEY", configs::groq_llama3()),
    ];

    for (provider_name, env_var, config) in providers {
        if std::env::var(env_var).is_ok() {
            info!("Auto-detected {} provider", provider_name);
            match SiumaiGenerator::new(config).await {
                Ok(generator) => {
                    if std::env::var("PERPLEXITY_API_KEY").is_ok() {
                        return generator.with_grounded(configs::perplexity_sonar()).await;
                    }
                    return Ok(generator);
                }
                Err(e) => {
                    warn!("Failed to create {} client: {}", provider_name, e);
                    continue;
                }
            }
        }
    }

    Err(ScoutError::config(
        "No LLM provider configured (set OPENAI_API_KEY, ANTHROPIC_API_KEY, or GROQ_API_KEY)",
        "llm",
    ))
}

/// Issue a generation call and parse the response as a typed JSON value.
///
/// The generation error and any schema mismatch both surface as
/// `ScoutError::Generation`; callers are expected to degrade to empty
/// results rather than aborting the job.
pub async fn generate_object<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    system: &str,
    prompt: &str,
) -> ScoutResult<T> {
    let generation = generator
        .generate(GenerationRequest::new(system, prompt))
        .await?;
    parse_json_response(&generation.text)
}

/// Extract and deserialize the first JSON object or array embedded in text.
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> ScoutResult<T> {
    let json_str = extract_json(text)
        .ok_or_else(|| ScoutError::generation("No JSON found in LLM response", "llm"))?;

    serde_json::from_str(json_str).map_err(|e| {
        ScoutError::generation(format!("Failed to parse LLM response as JSON: {}", e), "llm")
    })
}

/// Slice out the outermost JSON object or array from a chat response that
/// may wrap it in prose or markdown fences.
fn extract_json(text: &str) -> Option<&str> {
    let object_start = text.find('{');
    let array_start = text.find('[');

    let (start, close) = match (object_start, array_start) {
        (Some(o), Some(a)) if a < o => (a, ']'),
        (Some(o), _) => (o, '}'),
        (None, Some(a)) => (a, ']'),
        (None, None) => return None,
    };

    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
