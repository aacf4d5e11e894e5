// Config loader and validator
//
// Loads laoshi.yaml, validates structure, resolves variable interpolation
// in secrets, and produces typed endpoint and generation settings.

mod error;
mod interpolation;
mod loader;
mod raw;
mod source;
mod types;

pub use error::ConfigError;
pub use loader::{load_config, MAX_SENTENCE_COUNT};
pub use source::{ConfigSource, FileSource, StringSource};
pub use types::{Config, EndpointConfig, GenerationDefaults};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::CourseLevel;

    fn load_str(content: &str) -> Result<Config, ConfigError> {
        load_config(&StringSource {
            content: content.to_string(),
        })
    }

    #[test]
    fn loads_full_config() {
        let config = load_str(
            r#"
laoshi: v1
default_endpoint: openai
endpoints:
  openai:
    base_url: https://api.openai.com
    model: gpt-4o
    timeout_ms: 30000
  local:
    base_url: http://localhost:11434/
    model: qwen2.5
generation:
  sentence_count: 15
  level: intermediate
"#,
        )
        .unwrap();

        assert_eq!(config.version, "v1");
        assert_eq!(config.default_endpoint, "openai");
        assert_eq!(config.endpoints.len(), 2);

        let openai = config.endpoint(None).unwrap();
        assert_eq!(openai.name, "openai");
        assert_eq!(openai.timeout_ms, 30_000);
        assert_eq!(openai.api_key, None);

        // Trailing slash trimmed, timeout defaulted
        let local = config.endpoint(Some("local")).unwrap();
        assert_eq!(local.base_url, "http://localhost:11434");
        assert_eq!(local.timeout_ms, 120_000);

        assert_eq!(config.generation.sentence_count, 15);
        assert_eq!(config.generation.level, CourseLevel::Intermediate);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = load_str("laoshi: v2\nendpoints:\n  a:\n    base_url: http://x\n    model: m\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "{err}");
    }

    #[test]
    fn rejects_empty_endpoints() {
        let err = load_str("laoshi: v1\n").unwrap_err();
        assert!(err.to_string().contains("at least one endpoint"));
    }

    #[test]
    fn single_endpoint_is_implicit_default() {
        let config =
            load_str("laoshi: v1\nendpoints:\n  only:\n    base_url: http://x\n    model: m\n")
                .unwrap();
        assert_eq!(config.default_endpoint, "only");
        assert_eq!(config.generation.sentence_count, 20);
        assert_eq!(config.generation.level, CourseLevel::Beginner);
    }

    #[test]
    fn multiple_endpoints_require_explicit_default() {
        let err = load_str(
            "laoshi: v1\nendpoints:\n  a:\n    base_url: http://x\n    model: m\n  b:\n    base_url: http://y\n    model: m\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("default_endpoint is required"));
    }

    #[test]
    fn rejects_unknown_default_endpoint() {
        let err = load_str(
            "laoshi: v1\ndefault_endpoint: nope\nendpoints:\n  a:\n    base_url: http://x\n    model: m\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("\"nope\""));
    }

    #[test]
    fn interpolates_api_key_from_environment() {
        std::env::set_var("LAOSHI_TEST_KEY_A", "sk-secret");
        let config = load_str(
            "laoshi: v1\nendpoints:\n  a:\n    base_url: http://x\n    model: m\n    api_key: ${LAOSHI_TEST_KEY_A}\n",
        )
        .unwrap();
        assert_eq!(
            config.endpoints["a"].api_key.as_deref(),
            Some("sk-secret")
        );
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let err = load_str(
            "laoshi: v1\nendpoints:\n  a:\n    base_url: http://x\n    model: m\n    api_key: ${LAOSHI_TEST_KEY_MISSING}\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UndefinedVariable { ref name } if name == "LAOSHI_TEST_KEY_MISSING"));
    }

    #[test]
    fn empty_resolved_api_key_means_unauthenticated() {
        std::env::set_var("LAOSHI_TEST_KEY_EMPTY", "");
        let config = load_str(
            "laoshi: v1\nendpoints:\n  a:\n    base_url: http://x\n    model: m\n    api_key: ${LAOSHI_TEST_KEY_EMPTY}\n",
        )
        .unwrap();
        assert_eq!(config.endpoints["a"].api_key, None);
    }

    #[test]
    fn rejects_out_of_range_sentence_count() {
        for count in ["0", "101"] {
            let err = load_str(&format!(
                "laoshi: v1\nendpoints:\n  a:\n    base_url: http://x\n    model: m\ngeneration:\n  sentence_count: {count}\n",
            ))
            .unwrap_err();
            assert!(err.to_string().contains("sentence_count"), "{err}");
        }
    }

    #[test]
    fn rejects_unknown_level() {
        let err = load_str(
            "laoshi: v1\nendpoints:\n  a:\n    base_url: http://x\n    model: m\ngeneration:\n  level: expert\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("\"expert\""));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = load_str(
            "laoshi: v1\nendpoints:\n  a:\n    base_url: http://x\n    model: m\n    timeout_ms: 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let source = FileSource::new("/nonexistent/laoshi.yaml");
        let err = load_config(&source).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/laoshi.yaml"));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = load_str("laoshi: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
