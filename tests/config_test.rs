//! Tests for server configuration loading.

use bytenames::{CluePolicy, Difficulty, LlmProvider, ServerConfig};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = ServerConfig::default();
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(*config.port(), 3000);
    assert_eq!(*config.difficulty(), Difficulty::Medium);
    assert_eq!(*config.clue_policy(), CluePolicy::AllowReuse);
    assert!(config.seed().is_none());
    assert!(config.llm().is_none());
}

#[test]
fn test_empty_toml_is_default() {
    let config = ServerConfig::from_toml("").unwrap();
    assert_eq!(config, ServerConfig::default());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
host = "0.0.0.0"
port = 8080
difficulty = "hard"
clue_policy = "forbid-reuse"
seed = 42

[llm]
provider = "anthropic"
timeout_secs = 3
generate_words = true
"#
    )
    .unwrap();

    let config = ServerConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(*config.port(), 8080);
    assert_eq!(*config.difficulty(), Difficulty::Hard);
    assert_eq!(*config.clue_policy(), CluePolicy::ForbidReuse);
    assert_eq!(*config.seed(), Some(42));

    let llm = config.llm().as_ref().unwrap();
    assert_eq!(*llm.provider(), LlmProvider::Anthropic);
    assert_eq!(llm.model_name(), "claude-3-haiku-20240307");
    assert_eq!(*llm.temperature(), 0.7);
    assert_eq!(*llm.max_tokens(), 100);
    assert_eq!(llm.timeout(), Duration::from_secs(3));
    assert!(*llm.generate_words());
}

#[test]
fn test_load_without_path_uses_defaults() {
    let config = ServerConfig::load(None).unwrap();
    assert_eq!(config, ServerConfig::default());
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ServerConfig::from_file(dir.path().join("absent.toml"));
    assert!(result.is_err());
}

#[test]
fn test_malformed_toml_is_error() {
    assert!(ServerConfig::from_toml("port = \"many\"").is_err());
}

#[test]
fn test_port_override() {
    let config = ServerConfig::default()
        .with_port_override(Some(" 9000 "))
        .unwrap();
    assert_eq!(*config.port(), 9000);

    let unchanged = ServerConfig::default().with_port_override(None).unwrap();
    assert_eq!(*unchanged.port(), 3000);

    assert!(ServerConfig::default().with_port_override(Some("http")).is_err());
}

#[test]
fn test_builders_override_fields() {
    let config = ServerConfig::default()
        .with_host("localhost".to_string())
        .with_port(4000)
        .with_difficulty(Difficulty::Easy)
        .with_clue_policy(CluePolicy::ForbidReuse)
        .with_seed(Some(7));
    assert_eq!(config.host(), "localhost");
    assert_eq!(*config.port(), 4000);
    assert_eq!(*config.difficulty(), Difficulty::Easy);
    assert_eq!(*config.clue_policy(), CluePolicy::ForbidReuse);
    assert_eq!(*config.seed(), Some(7));
}
