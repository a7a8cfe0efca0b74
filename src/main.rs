//! provenant CLI - analyse files for AI provenance or run the HTTP service.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use provenant::config::DetectorConfig;
use provenant::inspect::ManifestDump;
use provenant::io::IOLimits;
use provenant::logging;
use provenant::manifest::C2paTool;
use provenant::platforms::PlatformRegistry;
use provenant::server::{self, AppState};
use provenant::{report, Detector};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "provenant")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one image or video file
    Analyze {
        /// File to analyse
        file: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Skip the remote verification service
        #[arg(long)]
        offline: bool,

        /// Remote verification service base URL
        #[arg(long)]
        api_endpoint: Option<String>,

        /// Image classifier inference URL
        #[arg(long)]
        classifier_endpoint: Option<String>,
    },

    /// Dump a file's manifest store, validation and raw C2PA markers
    Inspect {
        /// File to inspect
        file: PathBuf,

        /// Print the dump as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP verification service
    Serve {
        /// Listen address (default from config: 0.0.0.0:8000)
        #[arg(long)]
        bind: Option<String>,
    },

    /// List registered vendor platforms
    Platforms,
}

fn load_config(path: Option<&PathBuf>) -> Result<DetectorConfig> {
    DetectorConfig::load(path.map(PathBuf::as_path)).with_context(|| match path {
        Some(p) => format!("loading config {}", p.display()),
        None => "loading config".to_string(),
    })
}

fn run_analyze(
    mut config: DetectorConfig,
    file: PathBuf,
    json: bool,
    offline: bool,
    api_endpoint: Option<String>,
    classifier_endpoint: Option<String>,
) -> Result<ExitCode> {
    if offline {
        config.remote.enabled = false;
    }
    if let Some(endpoint) = api_endpoint {
        config.remote.endpoint = endpoint;
    }
    if classifier_endpoint.is_some() {
        config.classifier.endpoint = classifier_endpoint;
    }

    let detector = Detector::from_config(&config);
    if !json {
        println!("{}", "Initializing AI content detector...".dimmed());
        print!("{}", report::render_status(&detector.collaborator_status()));
        println!("\n{} {}", "Analyzing:".cyan().bold(), file.display());
    }

    let result = detector.analyze(&file);
    if json {
        println!("{}", result.to_json_string().context("serializing result")?);
    } else {
        print!("{}", report::render(&result));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_inspect(config: DetectorConfig, file: PathBuf, json: bool) -> Result<ExitCode> {
    let dump = ManifestDump::collect(
        &C2paTool::new(&config.manifest),
        &PlatformRegistry::with_default_platforms(),
        &file,
        &IOLimits::from(&config.io),
    )
    .with_context(|| format!("inspecting {}", file.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&dump).context("serializing dump")?
        );
    } else {
        print!("{}", report::render_dump(&dump));
    }

    if dump.found_anything() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_serve(mut config: DetectorConfig, bind: Option<String>) -> Result<ExitCode> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    let state = Arc::new(AppState::from_config(&config).context("building server state")?);
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime
        .block_on(server::serve(state, &config.server.bind))
        .with_context(|| format!("serving on {}", config.server.bind))?;
    Ok(ExitCode::SUCCESS)
}

fn run_platforms() -> ExitCode {
    let registry = PlatformRegistry::with_default_platforms();
    println!("{} {}", "Registered platforms:".cyan().bold(), registry.len());
    for name in registry.platform_names() {
        let company = registry
            .get(&name)
            .map(|e| e.company_name().to_string())
            .unwrap_or_default();
        println!("  {:<12} {}", name, company.dimmed());
    }
    ExitCode::SUCCESS
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_tracing_json();
    } else {
        logging::init_tracing();
    }

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Analyze {
            file,
            json,
            offline,
            api_endpoint,
            classifier_endpoint,
        } => {
            let Some(file) = file else {
                let mut cmd = Cli::command();
                if let Some(sub) = cmd.find_subcommand_mut("analyze") {
                    let _ = sub.print_help();
                }
                println!("\nExample:\n  provenant analyze samples/ChatGPT_Image.png");
                return Ok(ExitCode::FAILURE);
            };
            run_analyze(config, file, json, offline, api_endpoint, classifier_endpoint)
        }
        Commands::Inspect { file, json } => run_inspect(config, file, json),
        Commands::Serve { bind } => run_serve(config, bind),
        Commands::Platforms => Ok(run_platforms()),
    }
}
