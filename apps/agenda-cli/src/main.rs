use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use shared_config::AppConfig;

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Doctor availability and appointment rescheduling")]
struct Cli {
    /// Backend base URL, overrides AGENDA_BACKEND_URL
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Days of a month with at least one open slot
    Month {
        doctor_id: String,
        /// Month as yyyy-MM
        month: String,
    },
    /// Slots of a single day
    Day {
        doctor_id: String,
        /// Day as yyyy-MM-dd
        day: String,
    },
    /// Scheduled appointments
    List {
        /// Only those on this day (yyyy-MM-dd)
        #[arg(long)]
        day: Option<String>,
    },
    /// Move a scheduled appointment to another slot
    Reschedule {
        appointment_id: String,
        /// Browse this month (yyyy-MM) instead of the appointment's own
        #[arg(long)]
        month: Option<String>,
        /// Pick this day (yyyy-MM-dd) instead of the default one
        #[arg(long)]
        day: Option<String>,
        /// Slot time to commit; without it the options are only printed
        #[arg(long)]
        slot: Option<String>,
    },
    /// Cancel a scheduled appointment
    Cancel { appointment_id: String },
    /// Mark a scheduled appointment as a no-show
    NoShow { appointment_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if !config.is_configured() {
        anyhow::bail!("no backend configured; set AGENDA_BACKEND_URL or pass --backend-url");
    }

    info!("Using backend {}", config.backend_url);

    match cli.command {
        Commands::Month { doctor_id, month } => commands::month(&config, &doctor_id, &month).await,
        Commands::Day { doctor_id, day } => commands::day(&config, &doctor_id, &day).await,
        Commands::List { day } => commands::list(&config, day.as_deref()).await,
        Commands::Reschedule {
            appointment_id,
            month,
            day,
            slot,
        } => {
            commands::reschedule(
                &config,
                &appointment_id,
                month.as_deref(),
                day.as_deref(),
                slot.as_deref(),
            )
            .await
        }
        Commands::Cancel { appointment_id } => commands::cancel(&config, &appointment_id).await,
        Commands::NoShow { appointment_id } => commands::no_show(&config, &appointment_id).await,
    }
}
