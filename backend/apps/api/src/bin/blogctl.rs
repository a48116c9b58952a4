//! Database and account maintenance for the blog API
//!
//! Reads the same environment (and `.env`) as the server.

use anyhow::Context;
use api::{ServerConfig, db};
use clap::Parser;
use platform::password::generate_password;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "blogctl")]
#[command(about = "Maintenance commands for the blog API", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Manage the database schema
    Migrate(MigrateCommand),

    /// Create the seed accounts and sample content
    Seed {
        /// Password for both seed accounts; generated when omitted
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: Option<String>,
    },

    /// Print a random password
    Genpass {
        #[arg(long, default_value_t = 16)]
        length: usize,

        /// How many of the characters are digits
        #[arg(long, default_value_t = 4)]
        digits: usize,
    },
}

#[derive(Debug, clap::Parser)]
struct MigrateCommand {
    #[command(subcommand)]
    action: MigrateAction,
}

#[derive(Debug, Clone, Copy, clap::Subcommand)]
enum MigrateAction {
    /// Apply pending migrations
    Up,
    /// Drop all tables and the migration history
    Down,
    /// Down, then up
    Reset,
    /// Show which tables exist and their row counts
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "blogctl=debug,api=debug,auth=debug,blog=debug,sqlx=info"
    } else {
        "blogctl=info,api=info,auth=info,blog=info,sqlx=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Genpass { length, digits } => {
            if length == 0 {
                anyhow::bail!("--length must be at least 1");
            }
            println!("{}", generate_password(length, digits));
            Ok(())
        }
        Commands::Migrate(cmd) => {
            let config = ServerConfig::from_env().context("invalid configuration")?;
            let pool = db::connect(&config.database_url, 1).await?;
            run_migrate(&pool, cmd.action).await?;
            pool.close().await;
            Ok(())
        }
        Commands::Seed { admin_password } => {
            let config = ServerConfig::from_env().context("invalid configuration")?;
            let pool = db::connect(&config.database_url, 1).await?;
            db::migrate(&pool).await?;
            db::seed_database(&pool, admin_password).await?;
            pool.close().await;
            Ok(())
        }
    }
}

async fn run_migrate(pool: &sqlx::PgPool, action: MigrateAction) -> anyhow::Result<()> {
    match action {
        MigrateAction::Up => db::migrate(pool).await,
        MigrateAction::Down => db::drop_all(pool).await,
        MigrateAction::Reset => {
            db::drop_all(pool).await?;
            db::migrate(pool).await
        }
        MigrateAction::Status => {
            for table in db::table_status(pool).await? {
                match table.rows {
                    Some(rows) => println!("{:<12} {rows} rows", table.name),
                    None => println!("{:<12} missing", table.name),
                }
            }
            Ok(())
        }
    }
}
