//! Runtime configuration resolved from environment variables (and `.env`).

use crate::{
    core::agent::DEFAULT_MODEL,
    error::{PlannerError, Result},
    services::openai_client::DEFAULT_BASE_URL,
};
use std::time::Duration;

pub const LLM_API_KEY_VAR: &str = "DASHSCOPE_API_KEY";
pub const LLM_BASE_URL_VAR: &str = "DASHSCOPE_BASE_URL";
pub const SEARCH_API_KEY_VAR: &str = "SERP_API_KEY";
pub const MODEL_VAR: &str = "PLANNER_MODEL";

/// Everything the planner and its shells need at runtime
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub model: String,
    pub search_api_key: Option<String>,
    pub stream: bool,
    /// Bound on each chat-completion call
    pub request_timeout: Duration,
    /// Bound on each search call
    pub search_timeout: Duration,
    pub max_iterations: usize,
    pub host: String,
    pub port: u16,
}

/// Credentials confirmed present
#[derive(Debug, Clone)]
pub struct Credentials {
    pub llm_api_key: String,
    pub search_api_key: String,
}

impl PlannerConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`; blank values count as unset.
    ///
    /// Credentials are not checked here, see [`require_credentials`](Self::require_credentials).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            llm_api_key: get(LLM_API_KEY_VAR).or_else(|| get("OPENAI_API_KEY")),
            llm_base_url: get(LLM_BASE_URL_VAR)
                .or_else(|| get("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            search_api_key: get(SEARCH_API_KEY_VAR),
            stream: parse_or(get("PLANNER_STREAM"), "PLANNER_STREAM", true)?,
            request_timeout: Duration::from_secs(parse_or(
                get("PLANNER_TIMEOUT_SECS"),
                "PLANNER_TIMEOUT_SECS",
                120,
            )?),
            search_timeout: Duration::from_secs(parse_or(
                get("SEARCH_TIMEOUT_SECS"),
                "SEARCH_TIMEOUT_SECS",
                20,
            )?),
            max_iterations: parse_or(get("PLANNER_MAX_ITERATIONS"), "PLANNER_MAX_ITERATIONS", 10)?,
            host: get("PLANNER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(get("PLANNER_PORT"), "PLANNER_PORT", 8080)?,
        })
    }

    /// Names of the required credentials that are missing, in a fixed order
    pub fn missing_credentials(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.llm_api_key.is_none() {
            missing.push(format!("chat completion API key ({})", LLM_API_KEY_VAR));
        }
        if self.search_api_key.is_none() {
            missing.push(format!("SerpAPI key ({})", SEARCH_API_KEY_VAR));
        }
        missing
    }

    /// Fail with every missing credential named at once
    pub fn require_credentials(&self) -> Result<Credentials> {
        match (&self.llm_api_key, &self.search_api_key) {
            (Some(llm_api_key), Some(search_api_key)) => Ok(Credentials {
                llm_api_key: llm_api_key.clone(),
                search_api_key: search_api_key.clone(),
            }),
            _ => Err(PlannerError::MissingCredentials(self.missing_credentials())),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PlannerError::Config(format!("{key} has an invalid value: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<PlannerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PlannerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.model, "qwen-max");
        assert_eq!(config.llm_base_url, DEFAULT_BASE_URL);
        assert!(config.stream);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.search_timeout, Duration::from_secs(20));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn every_missing_credential_is_named() {
        let err = config_from(&[]).unwrap().require_credentials().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("DASHSCOPE_API_KEY"));
        assert!(message.contains("SERP_API_KEY"));

        let err = config_from(&[("DASHSCOPE_API_KEY", "llm")])
            .unwrap()
            .require_credentials()
            .unwrap_err();
        match err {
            PlannerError::MissingCredentials(missing) => {
                assert_eq!(missing, vec!["SerpAPI key (SERP_API_KEY)".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = config_from(&[("DASHSCOPE_API_KEY", "  "), ("SERP_API_KEY", "serp")]).unwrap();
        assert_eq!(config.missing_credentials().len(), 1);
    }

    #[test]
    fn openai_variables_are_fallbacks() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:4000/v1"),
            ("SERP_API_KEY", "serp"),
        ])
        .unwrap();
        let credentials = config.require_credentials().unwrap();
        assert_eq!(credentials.llm_api_key, "sk-test");
        assert_eq!(config.llm_base_url, "http://localhost:4000/v1");
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        let err = config_from(&[("PLANNER_PORT", "eighty")]).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("PLANNER_PORT"));
    }
}
