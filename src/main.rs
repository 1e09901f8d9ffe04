mod cli;
use cli::{CliMode, parse_cli_mode, run_agenda_mode};
mod tui;
use tui::{connect_accounts, run_tui};

use calstrip::storage::config::Config;
use calstrip::sync::SessionTokens;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let cli_mode = match parse_cli_mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("Usage: calstrip [--sample] [--agenda [YYYY/MM/DD]]");
            return Ok(());
        }
    };

    let config = Config::load_or_create()?;

    if let CliMode::Default { sample: true } = cli_mode {
        return run_tui(config, SessionTokens::new(), true).await;
    }

    let tokens = match connect_accounts(&config).await {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Authentication error: {}", e);
            tracing::error!("Authentication failed: {}", e);
            return Ok(());
        }
    };

    match cli_mode {
        CliMode::AgendaDate(date) => run_agenda_mode(&config, &tokens, date).await,
        CliMode::Default { .. } => run_tui(config, tokens, false).await,
    }
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "calstrip.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("calstrip started");
}
