mod agent;
mod api_client;
mod gateway;
mod resolver;
mod tools;

use agent::AgentRunner;
use api_client::ApiClient;
use clap::{Parser, Subcommand};
use finbot_channels::WahaClient;
use finbot_core::config::Config;
use finbot_memory::Store;
use finbot_providers::{GroqProvider, OpenAiProvider};
use gateway::Services;
use resolver::MappingService;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "finbot",
    version,
    about = "finbot — WhatsApp personal-finance assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server.
    Start,
    /// Print the resolved configuration and exit.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            let cfg = Config::from_env()?;
            let services = build_services(&cfg).await?;
            println!("finbot — starting webhook server on {}", cfg.bind_addr);
            gateway::serve(&cfg.bind_addr, services).await?;
        }
        Commands::Status => {
            let cfg = Config::from_env()?;
            println!("finbot — configuration\n");
            println!("  bind addr:      {}", cfg.bind_addr);
            println!("  database:       {}", cfg.database_path);
            println!("  waha:           {} (session {})", cfg.waha.base_url, cfg.waha.session);
            println!("  backend api:    {}", cfg.backend.base_url);
            println!("  primary model:  {}", cfg.providers.primary_model);
            println!("  fallback model: {}", cfg.providers.fallback_model);
            println!("  country code:   {}", cfg.country_code);
        }
    }

    Ok(())
}

/// Wire up the long-lived services from config.
async fn build_services(cfg: &Config) -> anyhow::Result<Arc<Services>> {
    let waha = Arc::new(WahaClient::new(&cfg.waha, &cfg.country_code));
    let api = Arc::new(ApiClient::new(&cfg.backend));
    let mapping = MappingService::new(waha.clone(), api.clone(), cfg.country_code.clone());

    let agent = AgentRunner::new(
        Box::new(GroqProvider::from_config(
            cfg.providers.groq_api_key.clone(),
            cfg.providers.primary_model.clone(),
        )),
        Box::new(OpenAiProvider::from_config(
            cfg.providers.openai_api_key.clone(),
            cfg.providers.fallback_model.clone(),
        )),
    );

    let store = Store::new(&cfg.database_path).await?;
    let audit = finbot_memory::audit::AuditLogger::new(store.pool().clone());

    Ok(Arc::new(Services {
        mapping,
        api,
        waha,
        agent,
        audit,
    }))
}
