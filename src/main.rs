use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use quakecharts::config::{ErrorPolicy, Settings, CONFIG_ENV_VAR};
use quakecharts::logging::{self, Component, LogLevel};
use quakecharts::profiles::Profile;
use quakecharts::render::{OutputDir, OutputFormat};
use quakecharts::{ingest, pipeline, QuakeError};

/// Render earthquake records as categorical pie charts.
#[derive(Debug, Parser)]
#[command(name = "quakecharts", version)]
struct Cli {
    /// JSON array of earthquake records.
    input: PathBuf,

    /// Directory to (re)create and fill with charts.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// TOML settings file.
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Bucket scheme and chart set: by_city or by_magnitude.
    #[arg(short, long)]
    profile: Option<Profile>,

    /// Chart file format: svg or json.
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Skip records that cannot be classified instead of aborting.
    #[arg(long)]
    skip_invalid: bool,

    #[arg(long)]
    log_level: Option<LogLevel>,
}

impl Cli {
    /// Settings file values with command-line overrides applied.
    fn settings(&self) -> Result<Settings, QuakeError> {
        let mut settings = Settings::load_or_default(self.config.as_deref())?;
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(profile) = self.profile {
            settings.profile = profile;
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if self.skip_invalid {
            settings.on_error = ErrorPolicy::Skip;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
        Ok(settings)
    }
}

fn run(cli: &Cli) -> Result<(), QuakeError> {
    let settings = cli.settings()?;
    logging::init_logger(settings.log_level, settings.log_file.as_deref(), false);

    let records = ingest::load_records(&cli.input)?;
    let mut sink = settings.format.sink(OutputDir::new(&settings.output_dir));
    pipeline::run(&records, &settings, sink.as_mut())?;

    logging::info(
        Component::System,
        None,
        &format!("Charts written to {}", settings.output_dir.display()),
    );
    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("quakecharts: {}", e);
            ExitCode::FAILURE
        }
    }
}
