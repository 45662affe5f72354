use cdn_resize::settings::{self, FileConfigStore};
use cdn_resize::{ResizePipeline, ResizeRequest, config, output};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cdn-resize")]
#[command(about = "Resize stored images in place, safely")]
#[command(long_about = "\
Resize stored images in place, safely

Images live in a single flat directory (<storage.root>/<storage.images_dir>)
and are addressed by filename only. Each resize decodes the stored file,
stretches it to exactly the requested size, re-encodes it in the format its
extension names, and atomically replaces the original.

Supported extensions: png, jpg, jpeg, bmp, webp.

Run 'cdn-resize gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize one stored image
    Resize {
        /// Stored filename, e.g. photo.png
        filename: String,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Print the JSON response instead of text
        #[arg(long)]
        json: bool,
    },
    /// Resize many images in parallel from a JSON array of requests
    Batch {
        /// File containing [{"filename": ..., "width": ..., "height": ...}, ...]
        requests: PathBuf,
        /// Print one JSON response per line instead of text
        #[arg(long)]
        json: bool,
    },
    /// Read or change runtime settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// List supported formats and their encode parameters
    Formats,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show whether registration is enabled
    GetRegistration,
    /// Enable or disable registration
    SetRegistration {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Show the access token lifetime in minutes
    GetTtl,
    /// Set the access token lifetime in minutes (5-1440)
    SetTtl {
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
}

fn init_logging(verbose: bool) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "cdn_resize=debug".to_string()
        } else {
            "cdn_resize=info".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Resize {
            filename,
            width,
            height,
            json,
        } => {
            let service_config = config::load_config(&cli.config_dir)?;
            let pipeline = ResizePipeline::from_config(&service_config);
            let request = ResizeRequest::new(filename, width, height);
            let result = pipeline.resize(&request);
            output::print_result(1, &request.filename, &result, json);
            result?;
        }
        Command::Batch { requests, json } => {
            let service_config = config::load_config(&cli.config_dir)?;
            let content = std::fs::read_to_string(&requests)?;
            let requests: Vec<ResizeRequest> = serde_json::from_str(&content)?;
            init_thread_pool(&service_config.processing);

            let pipeline = ResizePipeline::from_config(&service_config);
            let results: Vec<_> = requests
                .par_iter()
                .map(|request| pipeline.resize(request))
                .collect();

            for (i, (request, result)) in requests.iter().zip(&results).enumerate() {
                output::print_result(i + 1, &request.filename, result, json);
            }
            let succeeded = results.iter().filter(|r| r.is_ok()).count();
            if !json {
                println!();
                println!("{}", output::format_summary(succeeded, results.len()));
            }
            if succeeded != results.len() {
                return Err(format!("{} resize(s) failed", results.len() - succeeded).into());
            }
        }
        Command::Settings(command) => {
            let service_config = config::load_config(&cli.config_dir)?;
            let store = FileConfigStore::new(&service_config.settings.path);
            match command {
                SettingsCommand::GetRegistration => {
                    println!("enabled: {}", settings::registration_enabled(&store));
                }
                SettingsCommand::SetRegistration { enabled } => {
                    let enabled = settings::set_registration_enabled(&store, enabled)?;
                    println!("enabled: {}", enabled);
                }
                SettingsCommand::GetTtl => {
                    println!("ttl: {}", settings::access_token_ttl(&store));
                }
                SettingsCommand::SetTtl { minutes } => {
                    let ttl = settings::set_access_token_ttl(&store, minutes)?;
                    println!("ttl: {}", ttl);
                }
            }
        }
        Command::Formats => output::print_formats(),
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
