use clap::Parser;
use leitbox::cli::{Cli, Commands};
use leitbox::types::config::Config;
use leitbox::LeitboxResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> LeitboxResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = Config::load_or_default(&cli.config);

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("leitbox={}", log_level)
            .parse()
            .unwrap_or_else(|_| "leitbox=info".parse().expect("fallback directive is valid")),
    );

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

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            leitbox::cli::commands::init(path).await?;
        }
        Commands::Import { input } => {
            leitbox::cli::commands::import_workbook(&input, &config).await?;
        }
        Commands::Sheets => {
            leitbox::cli::commands::sheets(&config).await?;
        }
        Commands::Review { sheet, limit } => {
            leitbox::cli::commands::review(sheet, limit, &config).await?;
        }
        Commands::Stats { sheet } => {
            leitbox::cli::commands::stats(sheet, &config).await?;
        }
        Commands::History { sheet, limit } => {
            leitbox::cli::commands::history(sheet, limit, &config).await?;
        }
        Commands::Reset { sheet, yes } => {
            leitbox::cli::commands::reset(&sheet, yes, &config).await?;
        }
        Commands::Export { output } => {
            leitbox::cli::commands::export_progress(&output, &config).await?;
        }
        Commands::Restore { input } => {
            leitbox::cli::commands::restore_progress(&input, &config).await?;
        }
        Commands::Version => {
            leitbox::cli::commands::version();
        }
    }

    Ok(())
}
