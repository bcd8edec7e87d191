use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported backends behind the `RagClient`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    /// A LightRAG server doing retrieval and generation.
    LightRag,
    /// An OpenAI-compatible chat endpoint, no retrieval.
    Completion,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub lightrag_url: Option<String>,
    pub lightrag_api_key: Option<String>,
    pub lightrag_query_mode: String,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub chat_model: String,
    pub rag_timeout: Option<Duration>,
    pub max_scenario_attempts: Option<u32>,
    pub log_level: Level,
    pub prompts_path: PathBuf,
}

fn parse_optional<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str = std::env::var("RAG_PROVIDER").unwrap_or_else(|_| "lightrag".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "lightrag" => Provider::LightRag,
            "completion" => Provider::Completion,
            other => {
                return Err(ConfigError::InvalidValue(
                    "RAG_PROVIDER".to_string(),
                    format!("'{}' is not one of 'lightrag', 'completion'", other),
                ));
            }
        };

        let lightrag_url = std::env::var("LIGHTRAG_URL").ok();
        let lightrag_api_key = std::env::var("LIGHTRAG_API_KEY").ok();
        let lightrag_query_mode =
            std::env::var("LIGHTRAG_QUERY_MODE").unwrap_or_else(|_| "hybrid".to_string());

        let llm_api_key = std::env::var("LLM_BINDING_API_KEY").ok();
        let llm_base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());
        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "google/gemini-2.5-flash".to_string());

        let rag_timeout = parse_optional::<u64>("RAG_TIMEOUT_SECS")?.map(Duration::from_secs);
        let max_scenario_attempts = parse_optional::<u32>("MAX_SCENARIO_ATTEMPTS")?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./prompts"));

        match provider {
            Provider::LightRag => {
                if lightrag_url.is_none() {
                    return Err(ConfigError::MissingVar(
                        "LIGHTRAG_URL must be set for 'lightrag' provider".to_string(),
                    ));
                }
            }
            Provider::Completion => {
                if llm_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "LLM_BINDING_API_KEY must be set for 'completion' provider".to_string(),
                    ));
                }
            }
        }

        Ok(Self {
            bind_address,
            provider,
            lightrag_url,
            lightrag_api_key,
            lightrag_query_mode,
            llm_api_key,
            llm_base_url,
            chat_model,
            rag_timeout,
            max_scenario_attempts,
            log_level,
            prompts_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("RAG_PROVIDER");
            env::remove_var("LIGHTRAG_URL");
            env::remove_var("LIGHTRAG_API_KEY");
            env::remove_var("LIGHTRAG_QUERY_MODE");
            env::remove_var("LLM_BINDING_API_KEY");
            env::remove_var("LLM_BASE_URL");
            env::remove_var("CHAT_MODEL");
            env::remove_var("RAG_TIMEOUT_SECS");
            env::remove_var("MAX_SCENARIO_ATTEMPTS");
            env::remove_var("RUST_LOG");
            env::remove_var("PROMPTS_PATH");
        }
    }

    fn set_minimal_env_lightrag() {
        unsafe {
            env::set_var("LIGHTRAG_URL", "http://localhost:9621");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal_lightrag() {
        clear_env_vars();
        set_minimal_env_lightrag();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.provider, Provider::LightRag);
        assert_eq!(config.lightrag_url.as_deref(), Some("http://localhost:9621"));
        assert_eq!(config.lightrag_api_key, None);
        assert_eq!(config.lightrag_query_mode, "hybrid");
        assert_eq!(config.llm_base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.chat_model, "google/gemini-2.5-flash");
        assert_eq!(config.rag_timeout, None);
        assert_eq!(config.max_scenario_attempts, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.prompts_path, PathBuf::from("./prompts"));
    }

    #[test]
    #[serial]
    fn test_config_from_env_completion_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("RAG_PROVIDER", "completion");
            env::set_var("LLM_BINDING_API_KEY", "test-key");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.provider, Provider::Completion);
        assert_eq!(config.llm_api_key.as_deref(), Some("test-key"));
        assert_eq!(config.lightrag_url, None);
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("LIGHTRAG_URL", "http://rag:9621");
            env::set_var("LIGHTRAG_API_KEY", "rag-key");
            env::set_var("LIGHTRAG_QUERY_MODE", "mix");
            env::set_var("CHAT_MODEL", "openai/gpt-4o-mini");
            env::set_var("RAG_TIMEOUT_SECS", "45");
            env::set_var("MAX_SCENARIO_ATTEMPTS", "3");
            env::set_var("RUST_LOG", "debug");
            env::set_var("PROMPTS_PATH", "/custom/prompts");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.lightrag_api_key.as_deref(), Some("rag-key"));
        assert_eq!(config.lightrag_query_mode, "mix");
        assert_eq!(config.chat_model, "openai/gpt-4o-mini");
        assert_eq!(config.rag_timeout, Some(Duration::from_secs(45)));
        assert_eq!(config.max_scenario_attempts, Some(3));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.prompts_path, PathBuf::from("/custom/prompts"));
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        set_minimal_env_lightrag();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("RAG_PROVIDER", "pinecone");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, msg) => {
                assert_eq!(var, "RAG_PROVIDER");
                assert!(msg.contains("pinecone"));
            }
            _ => panic!("Expected InvalidValue for RAG_PROVIDER"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_retry_limit() {
        clear_env_vars();
        set_minimal_env_lightrag();
        unsafe {
            env::set_var("MAX_SCENARIO_ATTEMPTS", "many");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "MAX_SCENARIO_ATTEMPTS"),
            _ => panic!("Expected InvalidValue for MAX_SCENARIO_ATTEMPTS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        set_minimal_env_lightrag();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_lightrag_url() {
        clear_env_vars();

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => assert!(msg.contains("LIGHTRAG_URL")),
            _ => panic!("Expected MissingVar for LIGHTRAG_URL"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_llm_key() {
        clear_env_vars();
        unsafe {
            env::set_var("RAG_PROVIDER", "completion");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => assert!(msg.contains("LLM_BINDING_API_KEY")),
            _ => panic!("Expected MissingVar for LLM_BINDING_API_KEY"),
        }
    }
}
