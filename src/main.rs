use anyhow::Result;
use clap::Parser;
use tracing::error;

use mania_baseline::config::Config;
use mania_baseline::pipeline;
use mania_baseline::submission::SubmissionError;

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    match pipeline::run(&config.settings()) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<SubmissionError>() {
            Some(invalid) if invalid.is_rejection() => {
                error!("Submission rejected: {}", invalid);
                std::process::exit(1);
            }
            _ => Err(err),
        },
    }
}
