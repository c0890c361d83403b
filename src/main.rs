use clap::Parser;
use mutant_scan::cli::{Cli, Commands};
use mutant_scan::types::config::Config;
use mutant_scan::ScanResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ScanResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let loaded = if cli.config.exists() {
        Config::load(&cli.config).map_err(Some)
    } else {
        Err(None)
    };
    let (config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (Config::default_config(), e),
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("mutant_scan={}", log_level)
            .parse()
            .unwrap_or_else(|_| "mutant_scan=info".parse().expect("fallback directive is valid")),
    );

    // stdout carries command output and server responses; logs go to stderr
    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    match load_error {
        Some(e) => tracing::warn!(
            path = %cli.config.display(),
            error = %e,
            "Invalid configuration, using defaults"
        ),
        None => tracing::debug!("Configuration loaded from: {}", cli.config.display()),
    }

    match cli.command {
        Commands::Init { path } => {
            mutant_scan::cli::commands::init(path).await?;
        }
        Commands::Analyze { rows, file } => {
            mutant_scan::cli::commands::analyze(rows, file, &config).await?;
        }
        Commands::Stats => {
            mutant_scan::cli::commands::stats(&config).await?;
        }
        Commands::Serve => {
            mutant_scan::cli::commands::serve(&config).await?;
        }
        Commands::Status => {
            mutant_scan::cli::commands::status(&config).await?;
        }
        Commands::Version => {
            mutant_scan::cli::commands::version();
        }
    }

    Ok(())
}
