//! Provider selection from configuration.

use std::sync::Arc;
use std::time::Duration;

use isenior_config::AppConfig;
use isenior_core::error::ProviderError;
use isenior_core::provider::Provider;
use tracing::{info, warn};

use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named by `[llm]`.
///
/// `llm.api_url` overrides the well-known base URL and is required for any
/// other provider name. A missing API key is not an error here: the server
/// still starts, and chat requests report the provider as not configured.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let llm = &config.llm;
    let base_url = match (&llm.api_url, default_base_url(&llm.provider)) {
        (Some(url), _) => url.clone(),
        (None, Some(url)) => url,
        (None, None) => {
            return Err(ProviderError::NotConfigured(format!(
                "unknown provider '{}'; set llm.api_url to use it",
                llm.provider
            )));
        }
    };

    if llm.api_key.is_none() && llm.provider != "ollama" {
        warn!(
            provider = %llm.provider,
            "No API key configured; chat requests will fail until one is set"
        );
    }

    let provider = OpenAiCompatProvider::new(
        &llm.provider,
        &base_url,
        llm.api_key.clone(),
        Duration::from_secs(llm.timeout_secs),
    )?;
    info!(provider = %llm.provider, base_url = %base_url, model = %llm.model, "LLM provider ready");
    Ok(Arc::new(provider))
}

/// Base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        _ => return None,
    };
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").unwrap().contains("api.openai.com"));
        assert!(default_base_url("openrouter").unwrap().contains("openrouter.ai"));
        assert!(default_base_url("ollama").unwrap().contains("localhost:11434"));
        assert!(default_base_url("opneai").is_none());
    }

    #[test]
    fn builds_default_openai_provider() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-test".into());
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn builds_without_key() {
        let mut config = AppConfig::default();
        config.llm.provider = "ollama".into();
        config.llm.api_key = None;
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn unknown_provider_without_url_is_rejected() {
        let mut config = AppConfig::default();
        config.llm.provider = "opneai".into();
        config.llm.api_key = Some("sk-secret".into());
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(ref m) if m.contains("opneai")));
    }

    #[test]
    fn unknown_provider_with_explicit_url_builds() {
        let mut config = AppConfig::default();
        config.llm.provider = "vllm".into();
        config.llm.api_url = Some("http://10.0.0.5:8000/v1".into());
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "vllm");
    }
}
