use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use device_inventory::config::Config;
use device_inventory::db::{self, AppState};
use device_inventory::handlers;
use device_inventory::models::DeviceSchema;
use device_inventory::transfer;

#[derive(Parser)]
#[command(name = "device-inventory", version, about = "Device inventory service")]
struct Cli {
    /// Bind host (overrides HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Field set: asset or team (overrides DEVICE_SCHEMA)
    #[arg(long, global = true)]
    schema: Option<DeviceSchema>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Import devices from a semicolon-delimited CSV file
    Import { file: PathBuf },
    /// Export all devices as CSV (stdout unless --output is given)
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "device_inventory=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(schema) = cli.schema {
        config.schema = schema;
    }

    let pool = db::create_pool(&config.database_path, config.db_pool_size)
        .with_context(|| format!("opening database {}", config.database_path))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, pool).await,
        Command::Import { file } => {
            let reader = BufReader::new(
                File::open(&file).with_context(|| format!("opening {}", file.display()))?,
            );
            let mut conn = pool.get()?;
            let summary = transfer::import_csv(&mut conn, reader, config.schema)?;
            for error in &summary.errors {
                eprintln!("{}", error);
            }
            println!("Imported {} devices.", summary.imported);
            Ok(())
        }
        Command::Export { output } => {
            let conn = pool.get()?;
            let csv = transfer::export_csv(&conn, config.schema)?;
            match output {
                Some(path) => std::fs::write(&path, csv)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => std::io::stdout().write_all(csv.as_bytes())?,
            }
            Ok(())
        }
    }
}

async fn serve(config: Config, pool: db::DbPool) -> anyhow::Result<()> {
    let state = AppState {
        db: pool,
        schema: config.schema,
    };
    let app = handlers::app(state, config.max_upload_bytes);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(
        "Device inventory listening on {} (schema: {})",
        addr,
        config.schema.as_ref()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
