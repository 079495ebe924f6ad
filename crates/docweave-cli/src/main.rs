//! docweave CLI
//!
//! Generates XML documentation comments for undocumented C# declarations

mod client;
mod commands;
mod output;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use colored::*;
use docweave_core::{DocweaveConfig, DocweaveError, ErrorKind, FailurePolicy, TriviaPlacement, init_tracing};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "docweave")]
#[command(about = "docweave: generate XML documentation comments for C# sources")]
#[command(version = docweave_core::VERSION)]
#[command(
    long_about = "docweave finds undocumented classes, structs, interfaces, enums, records and\n\
methods in a C# file, asks a text-generation deployment to document them, and\n\
writes the file back with `///` comments inserted. Everything else in the file is\n\
left byte for byte as it was.\n\
\n\
Examples:\n  \
docweave document Invoice.cs -o Invoice.documented.cs\n  \
docweave list Invoice.cs          # Show what would be documented\n  \
docweave config init              # Create a docweave.toml to fill in"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (docweave.toml/.json/.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Document every undocumented declaration in a file
    Document(DocumentArgs),

    /// List undocumented declarations without contacting the service
    List {
        /// C# file to inspect
        #[arg(help = "C# source file (default: `input` from the config)")]
        input: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: ListFormat,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version {
        /// Show detailed version information
        #[arg(long)]
        detailed: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct DocumentArgs {
    /// C# file to document
    #[arg(help = "C# source file (default: `input` from the config)")]
    pub input: Option<PathBuf>,

    /// Where to write the documented file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Service endpoint, e.g. https://acme.openai.azure.com
    #[arg(long, env = "DOCWEAVE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Service API key
    #[arg(long, env = "DOCWEAVE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Deployment (model) name
    #[arg(long, env = "DOCWEAVE_DEPLOYMENT")]
    pub deployment: Option<String>,

    /// Service API version
    #[arg(long)]
    pub api_version: Option<String>,

    /// Maximum concurrent generation requests
    #[arg(short = 'j', long)]
    pub max_concurrency: Option<usize>,

    /// Overall generation deadline in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// What to do for declarations whose generation fails
    #[arg(long, value_enum)]
    pub on_failure: Option<FailureArg>,

    /// Where generated comments go relative to existing comments
    #[arg(long, value_enum)]
    pub placement: Option<PlacementArg>,

    /// Write `<output>.bak` before overwriting an existing output file
    #[arg(long)]
    pub backup: bool,

    /// Do not print the documented source
    #[arg(short, long)]
    pub quiet: bool,
}

impl DocumentArgs {
    /// Layer flags (and their environment fallbacks) over the file config
    pub fn apply_to(&self, config: &mut DocweaveConfig) {
        if let Some(input) = &self.input {
            config.input = Some(input.clone());
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.service.endpoint = Some(endpoint.clone());
        }
        if let Some(api_key) = &self.api_key {
            config.service.api_key = Some(api_key.clone());
        }
        if let Some(deployment) = &self.deployment {
            config.service.deployment = Some(deployment.clone());
        }
        if let Some(api_version) = &self.api_version {
            config.service.api_version = Some(api_version.clone());
        }
        if let Some(max_concurrency) = self.max_concurrency {
            config.generation.max_concurrency = Some(max_concurrency);
        }
        if let Some(timeout) = self.timeout {
            config.generation.timeout_secs = Some(timeout);
        }
        if let Some(on_failure) = self.on_failure {
            config.generation.on_failure = Some(on_failure.into());
        }
        if let Some(placement) = self.placement {
            config.generation.placement = Some(placement.into());
        }
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter configuration file
    Init {
        /// Configuration file format
        #[arg(short, long, default_value = "toml")]
        format: ConfigFormat,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check that the configuration is complete
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListFormat {
    /// Human-readable table
    Human,
    /// JSON array
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "docweave.toml",
            ConfigFormat::Json => "docweave.json",
            ConfigFormat::Yaml => "docweave.yaml",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureArg {
    /// Leave the declaration undocumented
    Skip,
    /// Insert a comment naming the error
    Placeholder,
}

impl From<FailureArg> for FailurePolicy {
    fn from(arg: FailureArg) -> Self {
        match arg {
            FailureArg::Skip => FailurePolicy::Skip,
            FailureArg::Placeholder => FailurePolicy::Placeholder,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementArg {
    /// Directly above the declaration, below existing comments
    After,
    /// Above existing comments
    Before,
}

impl From<PlacementArg> for TriviaPlacement {
    fn from(arg: PlacementArg) -> Self {
        match arg {
            PlacementArg::After => TriviaPlacement::AfterExisting,
            PlacementArg::Before => TriviaPlacement::BeforeExisting,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize colored output
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    // Initialize tracing based on verbosity
    let level = match cli.verbose {
        0 => Level::ERROR, // Only errors by default
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    init_tracing(level);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{} failed to start async runtime: {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_command(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Configuration problems exit with 2, everything else with 1
fn exit_status(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<DocweaveError>().map(DocweaveError::kind) {
        Some(ErrorKind::Configuration) => 2,
        _ => 1,
    }
}

async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Document(args)) => commands::document_command(args, cli.config).await,

        Some(Commands::List { input, format }) => {
            commands::list_command(input, format, cli.config).await
        }

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { format, force } => commands::config_init_command(format, force),
            ConfigAction::Validate => commands::config_validate_command(cli.config),
        },

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("docweave {}", docweave_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
            } else {
                println!("{}", docweave_core::VERSION);
            }
            Ok(())
        }

        None => {
            // No subcommand provided, show help
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
