mod cli; // Command implementations

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use sluice_core::InterceptorRegistry;

/// Sluice: host-side runner for hidden record interceptors
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Log framework activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered interceptors
    List,
    /// Run a batch of records through the host's interceptor chain
    Run {
        /// Host configuration file (.json, .yaml or .toml)
        #[arg(short, long)]
        config: PathBuf,
        /// JSON array of records; read from stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    // RUST_LOG still wins when set
    if let Err(e) = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

/// Every interceptor this binary knows about, built-ins included
fn registry() -> InterceptorRegistry {
    let mut registry = InterceptorRegistry::with_builtins();
    if let Err(e) = registry.register(audit_trail::descriptor()) {
        log::error!("Failed to register audit-trail interceptor: {}", e);
    }
    registry
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);
    debug!("Parsed args: {:?}", args);

    let registry = registry();
    match args.command {
        Commands::List => {
            cli::list(&registry);
            ExitCode::SUCCESS
        }
        Commands::Run { config, input } => match cli::run(&registry, &config, input.as_deref()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}
