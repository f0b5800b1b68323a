mod api;
pub mod store;

use clap::{Parser, Subcommand};
use eyre::Result;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

use api::AppState;
use base::setting::{generate_default, get_settings, load, Settings, SETTINGS};
use base::{database::open_database, CLI_NAME};
use store::{DatabaseStore, DocumentStore};

#[derive(Parser)]
#[command(name = CLI_NAME,author, version, about, long_about = None)]
#[command(next_line_help = true)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    DefaultConfig,
    Serve,
}

/// Opens and migrates the database. Failures are logged and leave the server without a store.
async fn connect(settings: &Settings) -> Option<Arc<dyn DocumentStore>> {
    let conn = match open_database(settings).await {
        Ok(conn) => conn,
        Err(error) => {
            tracing::warn! {%error, "Serving without a database"};
            return None;
        }
    };
    if let Err(error) = migration::Migrator::up(&conn, None).await {
        tracing::warn! {%error, "Could not migrate the database, serving without it"};
        return None;
    }
    tracing::info! {name = ?settings.db_name, "Connected to database"};
    Some(Arc::new(DatabaseStore::new(conn)))
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    color_eyre::install()?;
    let tracing_builder = tracing_subscriber::registry().with(fmt::layer());
    if std::env::var(base::TRACKS_LOGLEVEL).is_ok() {
        tracing_builder.with(EnvFilter::from_env(base::TRACKS_LOGLEVEL))
    } else {
        tracing_builder.with(EnvFilter::default().add_directive(LevelFilter::INFO.into()))
    }
    .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::DefaultConfig => {
            let default = generate_default(Settings::default())?;
            println!("{}", toml::to_string(&default)?);
            Ok(())
        }
        Command::Serve => {
            SETTINGS.get_or_try_init(async { load(cli.config) }).await?;
            let settings = get_settings()?;
            let store = connect(settings).await;

            let addr = SocketAddr::new(settings.host, settings.port);
            tracing::info! {%addr, "Listening"};
            let router = api::router(AppState(store));
            axum::Server::bind(&addr)
                .serve(router.into_make_service())
                .await?;
            Ok(())
        }
    }
}
