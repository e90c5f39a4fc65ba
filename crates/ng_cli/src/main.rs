use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ng_upstream::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use ng_upstream::{NewsApiClient, Orchestrator, UpstreamConfig};
use ng_web::handlers::ArticlesResponse;
use ng_web::profiles::{self, ProfileOverrides};
use ng_web::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Filtering proxy in front of a NewsAPI-compatible news source", long_about = None)]
struct Cli {
    /// API key for the upstream news source
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Base URL of the upstream API
    #[arg(long, env = "NEWS_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Upstream request timeout (e.g. 10s, 1m30s, 500ms)
    #[arg(long, env = "NEWS_API_TIMEOUT")]
    timeout: Option<HumanDuration>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,
    },
    /// Run one profile once and print the response body
    Fetch {
        /// Profile name (see `profiles`)
        profile: String,
        /// Replace the keywords of every primary query
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        /// Skip filtering and fallback
        #[arg(long)]
        raw: bool,
    },
    /// List the built-in profiles
    Profiles,
}

impl Cli {
    fn upstream_config(&self) -> anyhow::Result<UpstreamConfig> {
        let api_key = self
            .api_key
            .clone()
            .context("NEWS_API_KEY is not set (use --api-key or the environment)")?;
        let timeout = self.timeout.map(|t| t.0).unwrap_or(DEFAULT_TIMEOUT);
        Ok(UpstreamConfig::new(api_key)?
            .with_base_url(&self.base_url)?
            .with_timeout(timeout))
    }

    fn orchestrator(&self) -> anyhow::Result<Orchestrator> {
        let config = self.upstream_config()?;
        info!(?config, "🔧 upstream configured");
        let client = NewsApiClient::new(config)?;
        Ok(Orchestrator::new(Arc::new(client)))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment defaults have to be in place before clap reads them.
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { host, port } => {
            let state = AppState::new(cli.orchestrator()?);
            ng_web::serve(state, &format!("{}:{}", host, port)).await?;
        }
        Commands::Fetch {
            profile,
            q,
            limit,
            raw,
        } => {
            let orchestrator = cli.orchestrator()?;
            let profile = profiles::builtin()
                .into_iter()
                .find(|p| &p.name == profile)
                .with_context(|| format!("Unknown profile: {}", profile))?;
            let overrides = ProfileOverrides {
                q: q.clone(),
                limit: *limit,
                raw: Some(*raw),
            };
            let outcome = profile
                .with_overrides(&overrides)
                .resolve(&orchestrator)
                .await?;
            let response = ArticlesResponse::from(outcome);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Profiles => {
            for profile in profiles::builtin() {
                println!("{} - {}", profile.name, profile.description);
                for query in &profile.queries {
                    println!("  {}", query);
                }
                if let Some(fallback) = &profile.fallback {
                    for query in &fallback.queries {
                        println!("  fallback: {}", query);
                    }
                }
            }
        }
    }

    Ok(())
}
