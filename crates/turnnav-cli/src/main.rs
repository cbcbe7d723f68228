mod config;
mod plan_cmds;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use turnnav_core::{HttpCompletionClient, HttpRetriever, KnowledgeService, PlanService};
use turnnav_db::{PgPlanStore, pool};

use config::TurnnavConfig;
use serve_cmd::AppState;

#[derive(Parser)]
#[command(
    name = "turnnav",
    about = "Turnaround plan generation and knowledge service"
)]
struct Cli {
    /// Database URL (overrides TURNNAV_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a turnnav config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/turnnav")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the turnnav database (requires config file or env vars)
    DbInit,
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8001)]
        port: u16,
    },
    /// Plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show plan details (or list all plans)
    Show {
        /// Plan ID to show (omit to list all)
        plan_id: Option<String>,
    },
    /// Delete a plan
    Delete {
        /// Plan ID to delete
        plan_id: String,
    },
}

/// Execute the `turnnav init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        completions: None,
        retrieval: None,
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!();
    println!("The serve command also needs a completions endpoint and a retrieval");
    println!("endpoint: add [completions] and [retrieval] sections to the config");
    println!("file, or set TURNNAV_COMPLETIONS_URL and TURNNAV_RETRIEVAL_URL.");
    println!();
    println!("Next: run `turnnav db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `turnnav db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = TurnnavConfig::resolve(cli_db_url);

    println!("Initializing turnnav database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run the embedded migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Print success with table counts.
    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    // 5. Clean shutdown.
    db_pool.close().await;

    println!("turnnav db-init complete.");
    Ok(())
}

/// Assemble the serve state from resolved config and a live pool. Fails with
/// guidance when a required endpoint is not configured anywhere.
fn build_state(resolved: &TurnnavConfig, db_pool: sqlx::PgPool) -> anyhow::Result<AppState> {
    let Some(completions) = resolved.completions.clone() else {
        anyhow::bail!(
            "no completions endpoint configured; set TURNNAV_COMPLETIONS_URL or add a \
             [completions] section to {}",
            config::config_path().display()
        );
    };
    let Some(retrieval_url) = resolved.retrieval_url.clone() else {
        anyhow::bail!(
            "no retrieval endpoint configured; set TURNNAV_RETRIEVAL_URL or add a \
             [retrieval] section to {}",
            config::config_path().display()
        );
    };

    let completion = Arc::new(HttpCompletionClient::new(
        completions.url,
        completions.api_key,
        completions.model,
    ));
    let store = Arc::new(PgPlanStore::new(db_pool));
    let retriever = Arc::new(HttpRetriever::new(retrieval_url));

    Ok(AppState {
        plans: Arc::new(PlanService::new(store, completion.clone())),
        knowledge: Arc::new(KnowledgeService::new(retriever, completion)),
    })
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
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = TurnnavConfig::resolve(cli.database_url.as_deref());
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let state = build_state(&resolved, db_pool.clone())?;
            let result = serve_cmd::run_serve(state, &bind, port).await;
            db_pool.close().await;
            result?;
        }
        Commands::Plan { command } => {
            let resolved = TurnnavConfig::resolve(cli.database_url.as_deref());
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::run_plan_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
