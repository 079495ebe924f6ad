//! Configuration types for docweave
//!
//! A config file has two top-level paths and two sections:
//!
//! ```toml
//! input = "src/Invoice.cs"
//! output = "out/Invoice.cs"
//!
//! [service]
//! endpoint = "https://acme.openai.azure.com"
//! apiKey = "..."
//! deployment = "gpt-4o"
//!
//! [generation]
//! maxConcurrency = 3
//! onFailure = "skip"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::coordinator::{CoordinatorOptions, DEFAULT_MAX_CONCURRENCY, FailurePolicy};
use crate::error::DocweaveError;
use crate::result::Result;
use crate::rewriter::{DEFAULT_INDENT, RewriteOptions, TriviaPlacement};

pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocweaveConfig {
    /// C# file to document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    /// Where the documented source is written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Text-generation service settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Deployment (model) name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Per-request timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl ServiceConfig {
    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

/// Generation and rewriting behavior
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requests in flight at once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Deadline for the whole batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<FailurePolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<TriviaPlacement>,

    /// Indent for declarations that share a line with earlier code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_indent: Option<String>,
}

impl GenerationConfig {
    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            max_concurrency: self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
            timeout: self.timeout_secs.map(Duration::from_secs),
            on_failure: self.on_failure.unwrap_or_default(),
        }
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            placement: self.placement.unwrap_or_default(),
            default_indent: self
                .default_indent
                .clone()
                .unwrap_or_else(|| DEFAULT_INDENT.to_string()),
        }
    }
}

impl DocweaveConfig {
    /// Check everything a documentation run needs
    ///
    /// Every missing or placeholder field is reported at once.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if path_unset(self.input.as_ref()) {
            missing.push("input");
        }
        if path_unset(self.output.as_ref()) {
            missing.push("output");
        }
        for (field, value) in [
            ("service.endpoint", &self.service.endpoint),
            ("service.apiKey", &self.service.api_key),
            ("service.deployment", &self.service.deployment),
        ] {
            if value.as_deref().is_none_or(is_placeholder) {
                missing.push(field);
            }
        }

        if !missing.is_empty() {
            return Err(DocweaveError::configuration_missing(missing));
        }
        self.validate_generation()
    }

    /// Check only what offline commands need
    pub fn validate_input(&self) -> Result<()> {
        if path_unset(self.input.as_ref()) {
            return Err(DocweaveError::configuration_missing(["input"]));
        }
        Ok(())
    }

    fn validate_generation(&self) -> Result<()> {
        if self.generation.max_concurrency == Some(0) {
            return Err(DocweaveError::config_error(
                "generation.maxConcurrency must be at least 1",
            ));
        }
        if self.generation.timeout_secs == Some(0) {
            return Err(DocweaveError::config_error(
                "generation.timeoutSecs must be at least 1",
            ));
        }
        let indent_ok = self
            .generation
            .default_indent
            .as_deref()
            .is_none_or(|indent| indent.chars().all(|c| c == ' ' || c == '\t'));
        if !indent_ok {
            return Err(DocweaveError::config_error(
                "generation.defaultIndent may only contain spaces and tabs",
            ));
        }
        Ok(())
    }

    /// Starter config with placeholder values that `validate` rejects
    pub fn template() -> Self {
        Self {
            input: Some(PathBuf::from("<path/to/Input.cs>")),
            output: Some(PathBuf::from("<path/to/Output.cs>")),
            service: ServiceConfig {
                endpoint: Some("https://your-resource.openai.azure.com".to_string()),
                api_key: Some("your-api-key".to_string()),
                deployment: Some("your-deployment".to_string()),
                api_version: Some(DEFAULT_API_VERSION.to_string()),
                temperature: Some(DEFAULT_TEMPERATURE),
                max_tokens: Some(DEFAULT_MAX_TOKENS),
                request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            },
            generation: GenerationConfig {
                max_concurrency: Some(DEFAULT_MAX_CONCURRENCY),
                timeout_secs: None,
                on_failure: Some(FailurePolicy::Skip),
                placement: Some(TriviaPlacement::AfterExisting),
                default_indent: Some(DEFAULT_INDENT.to_string()),
            },
        }
    }
}

fn path_unset(path: Option<&PathBuf>) -> bool {
    path.is_none_or(|p| is_placeholder(&p.to_string_lossy()))
}

/// Is `value` empty or an obvious stand-in for a real setting?
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();

    value.is_empty()
        || lower.contains("your-")
        || lower.contains("your_")
        || (value.contains('<') && value.contains('>'))
        || lower.contains("placeholder")
        || lower.starts_with("xxx")
        || matches!(lower.as_str(), "changeme" | "change-me" | "todo" | "tbd")
}
