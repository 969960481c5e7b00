use anyhow::Result;
use clap::{Parser, Subcommand};
use gamescan::{
    config::Config,
    model::{DiscoverResponse, ErrorResponse, Source},
    output::{format_result_to_string, print_games, print_json, print_result, OutputFormat},
    scanner::{all_scanners, get_scanner, Scanner},
    service::GameService,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "gamescan")]
#[command(
    author,
    version,
    about = "Discover installed games across storefronts and launch them"
)]
struct Cli {
    /// Log discovery details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover installed games
    Discover {
        /// Only scan one source (steam, epic, gog, ubisoft, ea, battle_net, xbox, installed_programs)
        #[arg(short, long)]
        source: Option<String>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write JSON output to file
        #[arg(short, long)]
        output: Option<String>,

        /// Disable concurrent scanning (scan sources sequentially)
        #[arg(long)]
        no_parallel: bool,
    },

    /// Show details for games whose name contains NAME
    Info {
        name: String,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Launch the game named NAME
    Launch { name: String },

    /// List available sources
    ListSources,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("ignoring unreadable config: {:#}", e);
        Config::default()
    });

    match cli.command {
        Commands::Discover {
            source,
            format,
            output,
            no_parallel,
        } => {
            let mut config = config;
            if no_parallel {
                config.parallel = false;
            }
            let format = resolve_format(format, &config)?;
            run_discover(config, source, format, output).await
        }
        Commands::Info { name, format } => {
            let format = resolve_format(format, &config)?;
            let service = build_service(config, None)?;
            let progress = spinner(format == OutputFormat::Table, "Discovering games...");
            let result = service.get_game_info(&name).await;
            finish_spinner(progress);

            match result {
                Ok(games) => {
                    print_games(&games, format)?;
                    Ok(exit_codes::SUCCESS)
                }
                Err(error) => report_error(&error, format),
            }
        }
        Commands::Launch { name } => {
            let service = build_service(config, None)?;
            let progress = spinner(true, "Discovering games...");
            let result = service.launch_game(&name).await;
            finish_spinner(progress);

            match result {
                Ok(response) => {
                    println!("{}", response.message);
                    Ok(exit_codes::SUCCESS)
                }
                Err(error) => report_error(&error, OutputFormat::Table),
            }
        }
        Commands::ListSources => {
            list_sources(&config);
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_discover(
    config: Config,
    source_filter: Option<String>,
    format: OutputFormat,
    output_file: Option<String>,
) -> Result<u8> {
    let is_interactive = format == OutputFormat::Table && output_file.is_none();
    let service = build_service(config, source_filter.as_deref())?;

    let progress = spinner(is_interactive, "Discovering games...");
    let response = match service.discover_games().await {
        Ok(response) => response,
        Err(error) => {
            finish_spinner(progress);
            return report_error(&error, format);
        }
    };
    if let Some(pb) = progress {
        pb.finish_with_message(format!("Found {} games", response.total));
    }
    if service.context().cancel.is_cancelled() {
        eprintln!("Interrupted; showing partial results.");
    }

    write_response(&response, format, output_file)?;
    Ok(exit_codes::SUCCESS)
}

fn write_response(
    response: &DiscoverResponse,
    format: OutputFormat,
    output_file: Option<String>,
) -> Result<()> {
    if let Some(path) = output_file {
        std::fs::write(&path, format_result_to_string(response)?)?;
        if format == OutputFormat::Table {
            println!("Results written to: {}", path);
        }
        Ok(())
    } else {
        print_result(response, format)
    }
}

/// A service whose discovery stops early on Ctrl-C.
fn build_service(config: Config, source_filter: Option<&str>) -> Result<GameService> {
    let scanners: Vec<Box<dyn Scanner>> = match source_filter {
        Some(name) => vec![get_scanner(parse_source(name)?)],
        None => all_scanners(),
    };

    let service = GameService::new(config).with_scanners(scanners);
    let cancel = service.context().cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping discovery");
            cancel.cancel();
        }
    });

    Ok(service)
}

fn resolve_format(format: Option<String>, config: &Config) -> Result<OutputFormat> {
    let format = format.unwrap_or_else(|| config.default_format.clone());
    OutputFormat::from_str(&format).map_err(|e| anyhow::anyhow!(e))
}

fn report_error(error: &ErrorResponse, format: OutputFormat) -> Result<u8> {
    match format {
        OutputFormat::Json => print_json(error)?,
        OutputFormat::Table => eprintln!("Error: {}", error.error),
    }
    Ok(exit_codes::ERROR)
}

fn spinner(enabled: bool, message: &'static str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Some(pb)
}

fn finish_spinner(progress: Option<ProgressBar>) {
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
}

fn list_sources(config: &Config) {
    println!("Available sources (in priority order):");
    println!();

    for source in Source::ALL {
        let scanner = get_scanner(source);
        let supported = if scanner.is_supported() { "yes" } else { "no" };
        let enabled = if config.is_source_enabled(source) {
            "yes"
        } else {
            "no"
        };

        println!(
            "  {:<20} {:<20} [supported: {}, enabled: {}]",
            source.as_str(),
            scanner.name(),
            supported,
            enabled
        );
        for root in config.roots_for(source) {
            println!("  {:<20} Root override: {}", "", root.display());
        }
    }
    println!();
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'gamescan config --init' to create one.");
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}

fn parse_source(s: &str) -> Result<Source> {
    Source::parse(s).ok_or_else(|| {
        let known: Vec<&str> = Source::ALL.iter().map(|s| s.as_str()).collect();
        anyhow::anyhow!("Unknown source: {}. Use: {}", s, known.join(", "))
    })
}
