use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use skillscout_core::bootstrap::{create_provider, local_directories};
use skillscout_core::{Config, SkillEngine};
use skillscout_llm::EmbeddingProvider;
use skillscout_llm::any::AnyProvider;
use skillscout_mcp::{ResponseOptions, SkillServer, serve_stdio};
use skillscout_skills::watcher::{SkillEvent, SkillWatcher};
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
#[command(name = "skillscout", version)]
#[command(about = "Semantic search over SKILL.md documents, served over MCP on stdio", long_about = None)]
struct Args {
    /// Config file path, TOML or JSON (default: SKILLSCOUT_CONFIG, else built-in defaults)
    #[arg(long, short, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print an example configuration file and exit
    #[arg(long)]
    example_config: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.example_config {
        print!("{}", Config::example());
        return Ok(());
    }

    init_subscriber(args.verbose);

    let config_path = resolve_config_path(args.config);
    let config = Config::load(config_path.as_deref())?;

    let provider = create_provider(&config)?;
    health_check(&provider).await;
    tracing::info!(
        provider = provider.name(),
        model = %config.embedding.model,
        "embedding provider ready"
    );

    let engine = Arc::new(
        SkillEngine::bootstrap(&config, provider)
            .await
            .context("failed to build skill index")?,
    );

    let _watcher = if config.skills.watch {
        start_reload_watcher(&engine, &config)?
    } else {
        None
    };

    let server = SkillServer::new(
        Arc::clone(&engine),
        ResponseOptions::new(&config.server, config.skills.max_content_chars),
    );

    tokio::select! {
        result = serve_stdio(server) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted, shutting down"),
    }
    Ok(())
}

/// Logs go to stderr; stdout carries the MCP transport.
fn init_subscriber(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config_path(cli: Option<PathBuf>) -> Option<PathBuf> {
    cli.or_else(|| std::env::var_os("SKILLSCOUT_CONFIG").map(PathBuf::from))
}

async fn health_check(provider: &AnyProvider) {
    if let AnyProvider::Ollama(ollama) = provider {
        match ollama.health_check().await {
            Ok(()) => tracing::info!("ollama health check passed"),
            Err(e) => tracing::warn!("ollama health check failed: {e:#}"),
        }
    }
}

/// Watch local sources and rebuild the index on SKILL.md changes.
fn start_reload_watcher(
    engine: &Arc<SkillEngine<AnyProvider>>,
    config: &Config,
) -> anyhow::Result<Option<SkillWatcher>> {
    let dirs = local_directories(engine.sources());
    if dirs.is_empty() {
        tracing::info!("skills.watch is set but no local sources are configured");
        return Ok(None);
    }

    let (tx, mut rx) = mpsc::channel(4);
    let watcher = SkillWatcher::start(&dirs, config.skills.watch_debounce(), tx)
        .context("failed to start skill watcher")?;

    let engine = Arc::clone(engine);
    tokio::spawn(async move {
        while let Some(SkillEvent::Changed { paths }) = rx.recv().await {
            tracing::info!(changed = paths.len(), "SKILL.md change detected, reloading");
            if let Err(e) = engine.reload().await {
                tracing::warn!("skill reload failed, keeping previous index: {e}");
            }
        }
    });

    Ok(Some(watcher))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from(["skillscout", "--config", "/etc/s.toml", "-v"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/etc/s.toml")));
        assert!(args.verbose);
        assert!(!args.example_config);
    }

    #[test]
    fn example_config_flag() {
        let args = Args::try_parse_from(["skillscout", "--example-config"]).unwrap();
        assert!(args.example_config);
    }

    #[test]
    fn cli_path_wins_over_env() {
        assert_eq!(
            resolve_config_path(Some(PathBuf::from("/a.toml"))),
            Some(PathBuf::from("/a.toml"))
        );
    }

    #[tokio::test]
    async fn health_check_ollama_unreachable() {
        let provider = AnyProvider::Ollama(skillscout_llm::ollama::OllamaProvider::new(
            "http://127.0.0.1:1",
            "embed".into(),
        ));
        health_check(&provider).await;
    }
}
