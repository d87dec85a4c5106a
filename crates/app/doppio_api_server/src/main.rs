//! DoppioBot API server binary.
//!
//! Connects the settings/record database and the session store, then serves
//! the chatbot endpoint until interrupted.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use doppio_api::config::{ApiConfig, DEFAULT_REDIS_CACHE};
use doppio_core::chart::DEFAULT_CHART_DIR;
use doppio_core::llm::openai::OPENAI_API_BASE;
use doppio_core::memory::redis_store::RedisChatMemory;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "doppio_api_server", about = "DoppioBot API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3100")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/doppio"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Chat-completion API key. Chat requests fail while unset.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long, env = "OPENAI_API_BASE", default_value = OPENAI_API_BASE)]
    openai_api_base: String,

    /// Session history store URL.
    #[arg(long, env = "REDIS_CACHE", default_value = DEFAULT_REDIS_CACHE)]
    redis_cache: String,

    /// Expire idle session histories after this many seconds.
    #[arg(long, env = "SESSION_TTL_SECS")]
    session_ttl_secs: Option<i64>,

    /// Directory chart images are written to.
    #[arg(long, env = "CHART_DIR", default_value = DEFAULT_CHART_DIR)]
    chart_dir: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,doppio_api=debug,doppio_core=debug"))?,
        )
        .init();

    let args = Args::parse();

    let config = ApiConfig {
        bind_addr: args.bind_addr,
        pg_connection_url: args.database_url,
        openai_api_key: args.openai_api_key.filter(|k| !k.trim().is_empty()),
        openai_api_base: args.openai_api_base,
        redis_cache: args.redis_cache,
        chart_dir: args.chart_dir,
    };

    info!(
        bind_addr = %config.bind_addr,
        max_connections = args.max_connections,
        "starting doppio_api_server"
    );
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; chatbot requests will be rejected");
    }

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.pg_connection_url)
        .await?;

    info!("running database migrations");
    doppio_api::migrate(&pool).await?;

    let mut memory = RedisChatMemory::connect(&config.redis_cache).await?;
    if let Some(ttl) = args.session_ttl_secs {
        memory = memory.with_ttl(ttl);
    }
    info!(url = %config.redis_cache, "session store ready");

    let state = doppio_api::AppState::from_config(&config, pool, Arc::new(memory))?;
    let app = doppio_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
