use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ttal::app::App;
use ttal::config::{default_log_path, GameConfig};
use ttal::error::user_friendly_message;
use ttal::util::clock::parse_duration;
use ttal::Result;

#[derive(Parser, Debug)]
#[command(name = "ttal")]
#[command(about = "Two Truths and a Lie: spot the false statement before time runs out")]
#[command(version)]
struct Cli {
    /// Question catalog (JSON)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Countdown budget per category, e.g. `60s` or `1m 30s`
    #[arg(long, value_parser = parse_duration)]
    time_limit: Option<Duration>,

    /// Correct answers needed to pass a category
    #[arg(long)]
    pass_mark: Option<u32>,

    /// Fixed seed for reproducible statement order
    #[arg(long)]
    seed: Option<u64>,

    /// Write the default config file and exit
    #[arg(long)]
    write_default_config: bool,
}

fn init_tracing(log_path: PathBuf) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("ttal=info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file = log_path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&log_path));

    match file {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %log_path.display(), "Logging initialized");
        }
        // Never write logs over the game screen
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let config = match &cli.config {
        Some(path) => GameConfig::load_from(path)?,
        None => GameConfig::load()?,
    };
    Ok(apply_overrides(config, cli))
}

fn apply_overrides(mut config: GameConfig, cli: &Cli) -> GameConfig {
    if let Some(path) = &cli.catalog {
        config = config.with_catalog_path(path.clone());
    }
    if let Some(time_limit) = cli.time_limit {
        config = config.with_time_limit(time_limit);
    }
    if let Some(count) = cli.pass_mark {
        config = config.with_min_correct_to_pass(count);
    }
    config
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_file.clone().unwrap_or_else(default_log_path));

    if let Err(e) = run(cli).await {
        tracing::error!("Fatal: {}", e);
        eprintln!("Error: {}", user_friendly_message(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.write_default_config {
        let config = GameConfig::default();
        match &cli.config {
            Some(path) => {
                config.save_to(path)?;
                println!("Wrote {}", path.display());
            }
            None => {
                config.save()?;
                println!("Wrote {}", GameConfig::config_file_path()?.display());
            }
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    config.validate()?;
    tracing::info!(catalog = %config.catalog_path.display(), seed = ?cli.seed, "Starting");

    let mut app = App::new(config, cli.seed)?;
    app.init()?;
    let result = app.run().await;
    app.shutdown()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["ttal", "--time-limit", "1m 30s", "--pass-mark", "5"]);
        let config = apply_overrides(GameConfig::default(), &cli);
        assert_eq!(config.time_limit, Duration::from_secs(90));
        assert_eq!(config.min_correct_to_pass, 5);
        assert_eq!(config.catalog_path, GameConfig::default().catalog_path);
    }

    #[test]
    fn test_zero_pass_mark_fails_validation() {
        let cli = Cli::parse_from(["ttal", "--pass-mark", "0"]);
        assert!(apply_overrides(GameConfig::default(), &cli).validate().is_err());
    }

    #[test]
    fn test_bad_time_limit_is_rejected() {
        assert!(Cli::try_parse_from(["ttal", "--time-limit", "soon"]).is_err());
    }
}
