use anyhow::Context;
use bookapi_app::Application;
use bookapi_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// CRUD service for book records.
#[derive(Debug, Parser)]
#[command(name = "bookapi", version, about)]
struct Cli {
    /// Environment overlay to load (local, staging, production).
    /// Defaults to `BOOKAPI_ENV`, then `local`.
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until Ctrl-C or SIGTERM.
    Serve,
    /// Create the database schema and exit.
    InitDb,
    /// Print the resolved settings as JSON.
    ShowConfig {
        /// Indent the output.
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_for(cli.env.as_deref())
        .with_context(|| "failed to load book API settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::InitDb => {
            bookapi_telemetry::init(&settings.telemetry)?;
            Application::init_database(&settings).await?;
            tracing::info!(db = %settings.database.redacted_url(), "database schema ready");
            Ok(())
        }
        Command::ShowConfig { pretty } => {
            let rendered = if pretty {
                serde_json::to_string_pretty(&settings)?
            } else {
                serde_json::to_string(&settings)?
            };
            println!("{}", rendered);
            Ok(())
        }
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    bookapi_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.redacted_url(),
        "bookapi bootstrap starting"
    );

    let app = Application::bootstrap(settings).await?;
    app.serve(bookapi_http::shutdown::shutdown_signal()).await?;

    tracing::info!("bookapi shutdown complete");
    Ok(())
}
