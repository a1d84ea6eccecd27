use anyhow::{Context as _, Result};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use trnist::config::Config;
use trnist::retry::RetryConfig;
use trnist::runtime::{GlossaryRuntime, RuntimeGuard};
use trnist::translation::{ApiTranslator, Dispatcher, IdentityTranslator, TranslatorRegistry};
use trnist::{Context, Text};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trnist=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    // Text comes from the arguments, or stdin when there are none
    let args: Vec<String> = std::env::args().skip(1).collect();
    let input = if args.is_empty() {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read text from stdin")?;
        buf
    } else {
        args.join(" ")
    };

    info!("Starting embedded runtime with glossary {}", config.glossary_path);
    let guard = RuntimeGuard::install_global(Arc::new(RuntimeGuard::new(
        GlossaryRuntime::from_path(&config.glossary_path),
    )))?;
    guard.initialize()?;

    let mut api = ApiTranslator::new(Arc::clone(&guard));
    if let Some(timeout) = config.acquire_timeout {
        api = api.with_acquire_timeout(timeout);
    }

    let mut registry = TranslatorRegistry::new();
    registry.register(api).register(IdentityTranslator);
    registry.set_default(&config.backend)?;

    let dispatcher = Arc::new(
        Dispatcher::new(registry).with_retry(RetryConfig::backend(config.retry_max_attempts)),
    );

    let context = Context::new(&config.source_lang, &config.target_lang);
    info!(
        "Translating with '{}' ({})",
        config.backend,
        context.pair()
    );
    let result = dispatcher
        .translate_async(None, Text::from(input.trim_end()), context)
        .await;

    info!("Runtime metrics: {:?}", guard.metrics().report());
    guard.shutdown()?;

    let translated = result?;
    println!("{}", translated.to_string_checked()?);
    Ok(())
}
