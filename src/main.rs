use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use uuid::Uuid;

use rumour_ledger::{DatabasePool, EngineConfig, EngineError, PgStore, ReputationEngine};

const USAGE: &str = "usage: rumour-ledger <init-schema | confirm-latest | confirm <rumour-id> | deny <rumour-id> | reconcile <rumour-id>>";

#[tokio::main]
async fn main() -> Result<()> {
    let config = EngineConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        eprintln!("Please check RUMOUR_* environment variables.");
        e
    })?;

    init_logging(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).context(USAGE)?;

    let db = Arc::new(
        DatabasePool::connect(&config)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );

    if command == "init-schema" {
        db.init_schema().await.context("Failed to initialize schema")?;
        return Ok(());
    }

    let store = Arc::new(PgStore::new(db));
    let engine = ReputationEngine::new(
        store,
        config.gamification.to_policy(),
        &config.consistency,
    );

    let result: Result<serde_json::Value, EngineError> = match command {
        "confirm-latest" => engine
            .confirm_latest_pending()
            .await
            .map(|outcome| serde_json::json!(outcome)),
        "confirm" => {
            let rumour_id = rumour_id_arg(&args)?;
            engine.confirm(rumour_id).await.map(|outcome| serde_json::json!(outcome))
        }
        "deny" => {
            let rumour_id = rumour_id_arg(&args)?;
            engine.deny(rumour_id).await.map(|()| serde_json::json!({ "denied": rumour_id }))
        }
        "reconcile" => {
            let rumour_id = rumour_id_arg(&args)?;
            engine.reconcile_tally(rumour_id).await.map(|tally| serde_json::json!(tally))
        }
        other => return Err(anyhow::anyhow!("Unknown command '{}'\n{}", other, USAGE)),
    };

    match result {
        Ok(value) => {
            println!("{}", value);
            Ok(())
        }
        Err(e) if e.is_user_rejection() => {
            info!("Rejected: {}", e);
            eprintln!("{}", e);
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

fn rumour_id_arg(args: &[String]) -> Result<Uuid> {
    let raw = args.get(1).context(USAGE)?;
    Uuid::parse_str(raw).with_context(|| format!("Invalid rumour id: {}", raw))
}

fn init_logging(config: &EngineConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
