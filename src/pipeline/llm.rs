//! Analysis invoker: one completion call per request.
//!
//! The extracted document text goes out as the user turn and the locale's
//! rubric prompt as the system turn. There is no retry: a failed or timed-out
//! call ends the request with a model error, so the caller never waits longer
//! than `api_timeout_secs` for this stage.
//!
//! [`CompletionBackend`] is the seam between the pipeline and the network.
//! [`ProviderBackend`] adapts any `edgequake-llm` provider; tests and hosts
//! with their own client implement the trait directly.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::locale::LocaleProfile;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Sampling parameters for a completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl CompletionSettings {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// The model's answer plus token accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// Anything that can turn a system prompt plus user text into a completion.
///
/// Errors are plain messages; the invoker wraps them into
/// [`AnalysisError::ModelCallFailed`].
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        settings: &CompletionSettings,
    ) -> Result<Completion, String>;
}

/// [`CompletionBackend`] over an `edgequake-llm` chat provider.
pub struct ProviderBackend {
    provider: Arc<dyn LLMProvider>,
}

impl ProviderBackend {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl CompletionBackend for ProviderBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        settings: &CompletionSettings,
    ) -> Result<Completion, String> {
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_text),
        ];
        let options = build_options(settings);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| e.to_string())?;

        Ok(Completion {
            content: response.content,
            input_tokens: response.prompt_tokens,
            output_tokens: response.completion_tokens,
        })
    }
}

fn build_options(settings: &CompletionSettings) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(settings.temperature),
        max_tokens: Some(settings.max_tokens),
        ..Default::default()
    }
}

/// Send `text` for analysis under `profile`'s rubric, using the backend
/// resolved from `config`.
pub async fn invoke_analysis(
    text: &str,
    profile: &LocaleProfile,
    config: &AnalysisConfig,
) -> Result<Completion, AnalysisError> {
    let backend = resolve_backend(config)?;
    invoke_with_backend(backend.as_ref(), text, profile, config).await
}

/// Same as [`invoke_analysis`] with an explicit backend.
///
/// Returns the raw completion; normalisation and parsing happen downstream.
pub async fn invoke_with_backend(
    backend: &dyn CompletionBackend,
    text: &str,
    profile: &LocaleProfile,
    config: &AnalysisConfig,
) -> Result<Completion, AnalysisError> {
    let settings = CompletionSettings::from_config(config);
    let secs = config.api_timeout_secs;
    let start = Instant::now();

    debug!(
        "Requesting {} analysis of {} chars (max_tokens={}, temperature={})",
        profile.locale,
        text.chars().count(),
        settings.max_tokens,
        settings.temperature
    );

    let call = backend.complete(&profile.system_prompt, text, &settings);
    let completion = match timeout(Duration::from_secs(secs), call).await {
        Err(_) => {
            warn!("Completion call exceeded {}s", secs);
            return Err(AnalysisError::ModelTimeout { secs });
        }
        Ok(Err(message)) => {
            warn!("Completion call failed: {}", message);
            return Err(AnalysisError::ModelCallFailed { message });
        }
        Ok(Ok(c)) => c,
    };

    info!(
        "Completion: {} input tokens, {} output tokens, {:?}",
        completion.input_tokens,
        completion.output_tokens,
        start.elapsed()
    );
    Ok(completion)
}

/// Resolve the completion backend, from most-specific to least-specific.
///
/// 1. `config.backend`, used as-is.
/// 2. `config.provider`, wrapped in a [`ProviderBackend`].
/// 3. `config.provider_name` plus `config.model` (default `gpt-4.1-mini`).
/// 4. `CLAUSECHECK_LLM_PROVIDER` + `CLAUSECHECK_MODEL`, when both are set.
/// 5. OpenAI, when `OPENAI_API_KEY` is set.
/// 6. Whatever [`ProviderFactory::from_env`] detects.
pub fn resolve_backend(config: &AnalysisConfig) -> Result<Arc<dyn CompletionBackend>, AnalysisError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }
    let provider = resolve_provider(config)?;
    Ok(Arc::new(ProviderBackend::new(provider)))
}

fn resolve_provider(config: &AnalysisConfig) -> Result<Arc<dyn LLMProvider>, AnalysisError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("CLAUSECHECK_LLM_PROVIDER"),
        std::env::var("CLAUSECHECK_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AnalysisError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, AnalysisError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        AnalysisError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{Locale, LocaleCatalog};
    use std::sync::Mutex;

    struct Scripted {
        reply: Result<String, String>,
        delay: Option<Duration>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Scripted {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                delay: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for Scripted {
        async fn complete(
            &self,
            system_prompt: &str,
            user_text: &str,
            _settings: &CompletionSettings,
        ) -> Result<Completion, String> {
            self.seen
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_text.to_string()));
            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            self.reply.clone().map(|content| Completion {
                content,
                input_tokens: 10,
                output_tokens: 5,
            })
        }
    }

    #[test]
    fn build_options_carries_settings() {
        let config = AnalysisConfig::default();
        let opts = build_options(&CompletionSettings::from_config(&config));
        assert_eq!(opts.temperature, Some(0.7));
        assert_eq!(opts.max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn sends_locale_prompt_and_text() {
        let catalog = LocaleCatalog::builtin();
        let profile = catalog.profile(Locale::Fr);
        let backend = Scripted::ok("Recommandation:");
        let config = AnalysisConfig::default();

        let c = invoke_with_backend(&backend, "Contrat de bail", profile, &config)
            .await
            .unwrap();
        assert_eq!(c.content, "Recommandation:");
        assert_eq!(c.input_tokens, 10);

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, profile.system_prompt);
        assert_eq!(seen[0].1, "Contrat de bail");
    }

    #[tokio::test]
    async fn backend_error_becomes_model_call_failed() {
        let backend = Scripted {
            reply: Err("503 upstream".into()),
            delay: None,
            seen: Mutex::new(Vec::new()),
        };
        let catalog = LocaleCatalog::builtin();
        let err = invoke_with_backend(
            &backend,
            "text",
            catalog.profile(Locale::En),
            &AnalysisConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(
            matches!(err, AnalysisError::ModelCallFailed { ref message } if message == "503 upstream")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let backend = Scripted {
            reply: Ok("late".into()),
            delay: Some(Duration::from_secs(120)),
            seen: Mutex::new(Vec::new()),
        };
        let config = AnalysisConfig::builder().api_timeout_secs(5).build().unwrap();
        let catalog = LocaleCatalog::builtin();
        let err = invoke_with_backend(&backend, "text", catalog.profile(Locale::En), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ModelTimeout { secs: 5 }));
    }

    #[test]
    fn injected_backend_wins() {
        let backend: Arc<dyn CompletionBackend> = Arc::new(Scripted::ok("x"));
        let config = AnalysisConfig::builder()
            .backend(Arc::clone(&backend))
            .build()
            .unwrap();
        let resolved = resolve_backend(&config).unwrap();
        assert!(Arc::ptr_eq(&resolved, &backend));
    }
}
