use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use skywatch_core::{AppError, Config, TelegramCredentials, WeatherCredentials};
use skywatch_telegram::TelegramClient;
use skywatch_weather::{HistoryStore, OpenWeatherProvider};

mod jobs;

use jobs::ConsoleSink;

/// Weather notifier meant to be started by a scheduler (cron, CI, systemd timer).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration file (.json or .toml)
    #[arg(long, global = true, default_value = "weather_config.json")]
    config: PathBuf,

    /// Reading history file
    #[arg(long, global = true, default_value = "weather_history.json")]
    history: PathBuf,

    /// Print the message instead of sending it; history is left untouched
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    job: Job,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Job {
    /// Current weather with clothing and activity suggestions; records the reading
    Daily,
    /// Hazard check (heat, frost, wind, thunderstorm, snow)
    Alert,
    /// Summary of the last 7 days of recorded readings
    Weekly,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = skywatch_core::init() {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    skywatch_core::credentials::load_dotenv();

    tracing::info!("Starting {:?} job", cli.job);

    match run(&cli).await {
        Ok(()) => {
            tracing::info!("{:?} job finished", cli.job);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:?} job failed: {}", cli.job, e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let now = chrono::Utc::now();

    match cli.job {
        Job::Daily => {
            let weather = WeatherCredentials::from_env()?;
            let telegram = telegram_credentials(cli)?;
            let (config, _) = Config::load_validated(&cli.config)?;

            let source = OpenWeatherProvider::new(weather, &config.provider)?;
            match telegram {
                Some(creds) => {
                    let sink = TelegramClient::new(creds, &config.telegram)?;
                    let store = HistoryStore::new(&cli.history);
                    jobs::run_daily(&config, &source, &sink, Some(&store), now).await
                }
                None => jobs::run_daily(&config, &source, &ConsoleSink, None, now).await,
            }
        }
        Job::Alert => {
            let weather = WeatherCredentials::from_env()?;
            let telegram = telegram_credentials(cli)?;
            let (config, _) = Config::load_lenient(&cli.config)?;

            let source = OpenWeatherProvider::new(weather, &config.provider)?;
            match telegram {
                Some(creds) => {
                    let sink = TelegramClient::new(creds, &config.telegram)?;
                    jobs::run_alert(&config, &source, &sink, now).await
                }
                None => jobs::run_alert(&config, &source, &ConsoleSink, now).await,
            }
        }
        Job::Weekly => {
            let telegram = telegram_credentials(cli)?;
            let (config, _) = Config::load_lenient(&cli.config)?;
            let store = HistoryStore::new(&cli.history);

            match telegram {
                Some(creds) => {
                    let sink = TelegramClient::new(creds, &config.telegram)?;
                    jobs::run_weekly(&config, &sink, &store, now).await
                }
                None => jobs::run_weekly(&config, &ConsoleSink, &store, now).await,
            }
        }
    }
}

/// Telegram credentials are not needed when printing to the console.
fn telegram_credentials(cli: &Cli) -> Result<Option<TelegramCredentials>, AppError> {
    if cli.dry_run {
        return Ok(None);
    }
    Ok(Some(TelegramCredentials::from_env()?))
}
