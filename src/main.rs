use clap::Parser;
use packmate::Provider;
use packmate::core::config::{self, ResolvedConfig};
use packmate::core::controller::Controller;
use packmate::core::state::{ErrorGate, GenerationSettings};
use packmate::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "packmate", about = "Turn a trip description into a packing checklist")]
struct Args {
    /// Generation service to use (overrides config and PACKMATE_PROVIDER)
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Model name (overrides config and PACKMATE_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Generate one list for this trip, print it, and exit without the TUI
    #[arg(short, long)]
    trip: Option<String>,
}

/// One-shot mode: print the reply and the checklist to stdout.
async fn run_headless(config: ResolvedConfig, trip: &str) -> ExitCode {
    let mut controller = Controller::new(GenerationSettings {
        provider: tui::build_provider(&config),
        model_name: config.model_name.clone(),
    });
    controller.submit(trip).await;

    let snapshot = controller.snapshot();
    if let Some(reply) = snapshot.messages.last() {
        println!("{}", reply.content);
    }
    match (&snapshot.packing_list, snapshot.gate) {
        (Some(list), ErrorGate::None) => {
            println!();
            print!("{list}");
            ExitCode::SUCCESS
        }
        _ => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> std::io::Result<ExitCode> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to packmate.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("packmate.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Failed to load config, using defaults: {}", e);
        config::PackmateConfig::default()
    });
    let resolved = match config::resolve(&file_config, args.provider, args.model.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            eprintln!("packmate: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    log::info!(
        "packmate starting up with provider: {}, model: {}, key configured: {}",
        resolved.provider.as_str(),
        resolved.model_name,
        resolved.api_key.is_some()
    );

    match args.trip {
        Some(trip) => Ok(run_headless(resolved, &trip).await),
        None => {
            tui::run(resolved)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
