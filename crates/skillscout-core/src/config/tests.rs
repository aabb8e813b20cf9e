use std::io::Write;
use std::path::Path;

use serial_test::serial;
use skillscout_skills::{EmbeddingBasis, SourceConfig};

use super::*;

const ENV_KEYS: [&str; 6] = [
    "SKILLSCOUT_EMBEDDING_PROVIDER",
    "SKILLSCOUT_EMBEDDING_BASE_URL",
    "SKILLSCOUT_EMBEDDING_MODEL",
    "SKILLSCOUT_OPENAI_API_KEY",
    "SKILLSCOUT_DEFAULT_TOP_K",
    "SKILLSCOUT_MAX_CONTENT_CHARS",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    write!(f, "{content}").unwrap();
    path
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.skills.sources, [SourceConfig::github(DEFAULT_SKILLS_REPO)]);
    assert_eq!(config.skills.max_content_chars, None);
    assert_eq!(config.skills.embedding_basis, EmbeddingBasis::Description);
    assert!(!config.skills.watch);
    assert_eq!(config.embedding.provider, ProviderKind::Ollama);
    assert_eq!(config.embedding.base_url(), "http://localhost:11434");
    assert_eq!(config.embedding.model, "all-minilm");
    assert_eq!(config.remote.timeout_secs, 30);
    assert_eq!(config.remote.fetch_concurrency, 4);
    assert_eq!(config.remote.fallback_branch, "master");
    assert_eq!(config.server.default_top_k, 3);
    assert_eq!(config.server.max_top_k, 20);
}

#[test]
#[serial]
fn no_path_and_missing_file_give_defaults() {
    clear_env();
    assert_eq!(Config::load(None).unwrap(), Config::default());
    assert_eq!(
        Config::load(Some(Path::new("/nonexistent/skillscout.toml"))).unwrap(),
        Config::default()
    );
}

#[test]
#[serial]
fn parse_toml_with_partial_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "config.toml",
        r#"
[skills]
sources = [
    { type = "local", path = "~/skills" },
    { type = "github", url = "https://github.com/o/r", subpath = "skills" },
]
max_content_chars = 500
embedding_basis = "description_and_content"

[embedding]
provider = "openai"
model = "text-embedding-3-small"
"#,
    );
    clear_env();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(
        config.skills.sources,
        [
            SourceConfig::local("~/skills"),
            SourceConfig::github("https://github.com/o/r").with_subpath("skills"),
        ]
    );
    assert_eq!(config.skills.max_content_chars, Some(500));
    assert_eq!(
        config.skills.embedding_basis,
        EmbeddingBasis::DescriptionAndContent
    );
    assert_eq!(config.embedding.provider, ProviderKind::OpenAi);
    assert_eq!(config.embedding.base_url(), "https://api.openai.com/v1");
    assert_eq!(config.remote, RemoteConfig::default());
    assert_eq!(config.server, ServerConfig::default());
}

#[test]
#[serial]
fn parse_json_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "config.json",
        r#"{
            "skills": {"sources": [{"type": "local", "path": "/opt/skills"}]},
            "server": {"default_top_k": 5}
        }"#,
    );
    clear_env();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.skills.sources, [SourceConfig::local("/opt/skills")]);
    assert_eq!(config.server.default_top_k, 5);
    assert_eq!(config.server.max_top_k, 20);
}

#[test]
#[serial]
fn invalid_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "broken.toml", "[skills\nsources = ");
    clear_env();
    let err = Config::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("failed to parse config file"));
}

#[test]
#[serial]
fn out_of_range_top_k_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "config.toml",
        "[server]\ndefault_top_k = 30\nmax_top_k = 20\n",
    );
    clear_env();
    assert!(Config::load(Some(&path)).is_err());
}

#[test]
fn zero_timeouts_are_rejected() {
    let mut config = Config::default();
    config.remote.timeout_secs = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("remote.timeout_secs"));

    let mut config = Config::default();
    config.embedding.timeout_secs = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("embedding.timeout_secs"));

    assert!(Config::default().validate().is_ok());
}

#[test]
#[serial]
fn env_overrides() {
    clear_env();
    let mut config = Config::default();

    unsafe {
        std::env::set_var("SKILLSCOUT_EMBEDDING_PROVIDER", "OpenAI");
        std::env::set_var("SKILLSCOUT_EMBEDDING_MODEL", "nomic-embed-text");
        std::env::set_var("SKILLSCOUT_EMBEDDING_BASE_URL", "http://embed:8080/v1");
        std::env::set_var("SKILLSCOUT_OPENAI_API_KEY", "sk-test");
        std::env::set_var("SKILLSCOUT_DEFAULT_TOP_K", "7");
        std::env::set_var("SKILLSCOUT_MAX_CONTENT_CHARS", "1200");
    }
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.embedding.provider, ProviderKind::OpenAi);
    assert_eq!(config.embedding.model, "nomic-embed-text");
    assert_eq!(config.embedding.base_url(), "http://embed:8080/v1");
    assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.server.default_top_k, 7);
    assert_eq!(config.skills.max_content_chars, Some(1200));
}

#[test]
#[serial]
fn invalid_env_values_are_ignored() {
    clear_env();
    let mut config = Config::default();

    unsafe {
        std::env::set_var("SKILLSCOUT_EMBEDDING_PROVIDER", "candle");
        std::env::set_var("SKILLSCOUT_DEFAULT_TOP_K", "many");
    }
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.embedding.provider, ProviderKind::Ollama);
    assert_eq!(config.server.default_top_k, 3);
}

#[test]
fn example_config_parses() {
    let config: Config = toml::from_str(Config::example()).unwrap();
    assert_eq!(config.skills.sources.len(), 3);
    assert_eq!(config.skills.sources[2], SourceConfig::local("~/.claude/skills"));
    config.validate().unwrap();
}

#[test]
fn debug_redacts_api_key() {
    let config = EmbeddingConfig {
        api_key: Some("sk-secret".into()),
        ..EmbeddingConfig::default()
    };
    let debug = format!("{config:?}");
    assert!(!debug.contains("sk-secret"));
    assert!(debug.contains("[REDACTED]"));
}

#[test]
fn default_config_roundtrips_through_toml() {
    let config = Config::default();
    let rendered = toml::to_string_pretty(&config).unwrap();
    let back: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(back, config);
}
