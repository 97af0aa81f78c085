mod db;
mod stock;
mod users;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{db::DbCommands, stock::StockCommands, users::UsersCommands};

#[derive(Debug, Parser)]
#[command(name = "vitrine-cli")]
#[command(about = "Vitrine catalog operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database connectivity, migrations and catalog seeding
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Customer account administration
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Inventory reports
    Stock {
        #[command(subcommand)]
        command: StockCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("vitrine-cli: run with --help for available commands");
        return Ok(());
    };

    let config = vitrine_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = vitrine_db::PoolConfig::from_app_config(&config);
    let pool = vitrine_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => db::run(&pool, &config, command).await,
        Commands::Users { command } => users::run(&pool, command).await,
        Commands::Stock { command } => stock::run(&pool, command).await,
    }
}

#[cfg(test)]
mod tests;
