//! cty CLI - sample documents and compatibility reports for Kubernetes CRDs

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod display;
mod error;
mod exit_codes;
mod source;

use commands::describe::DescribeFormat;
use commands::validate::ReportFormat;
use source::SourceArgs;

#[derive(Parser)]
#[command(name = "cty")]
#[command(version)]
#[command(about = "Generate sample YAML and detect breaking changes in CRDs", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a sample YAML document for each CRD
    Generate {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output directory for <kind>_sample.yaml files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Write all samples to stdout instead of files
        #[arg(long)]
        stdout: bool,

        /// Add property descriptions as comments
        #[arg(long)]
        comments: bool,

        /// Only render required properties
        #[arg(long)]
        minimal: bool,

        /// Do not generate values from regex patterns
        #[arg(long)]
        skip_random: bool,
    },

    /// Show the property tree of each CRD version
    Describe {
        #[command(flatten)]
        sources: SourceArgs,

        /// Only show required properties
        #[arg(long)]
        minimal: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = DescribeFormat::Tree)]
        output: DescribeFormat,
    },

    /// Export each CRD version as a JSON Schema file
    Schema {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output directory for <Kind>.<group>.<version>.schema.json files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Compare two versions of a CRD and report breaking changes
    Validate {
        #[command(flatten)]
        sources: SourceArgs,

        /// Version to compare from (default: first version)
        #[arg(long)]
        from: Option<String>,

        /// Version to compare to (default: last version)
        #[arg(long)]
        to: Option<String>,

        /// Compare against a second CRD file instead of another version
        #[arg(long)]
        against: Option<PathBuf>,

        /// Report format (JSON output is an array only when several CRDs are compared)
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        output: ReportFormat,

        /// Exit with code 2 when breaking changes are found
        #[arg(long)]
        fail_on_breaking: bool,
    },
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            sources,
            output,
            stdout,
            comments,
            minimal,
            skip_random,
        } => commands::generate::run(
            &sources,
            &output,
            stdout,
            commands::generate::Flags {
                comments,
                minimal,
                skip_random,
            },
        ),

        Commands::Describe {
            sources,
            minimal,
            output,
        } => commands::describe::run(&sources, minimal, output),

        Commands::Schema { sources, output } => commands::schema::run(&sources, &output),

        Commands::Validate {
            sources,
            from,
            to,
            against,
            output,
            fail_on_breaking,
        } => commands::validate::run(
            &sources,
            from.as_deref(),
            to.as_deref(),
            against.as_deref(),
            output,
            fail_on_breaking,
        ),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(report) = run(cli) {
        eprintln!("{report:?}");
        std::process::exit(error::exit_code_of(&report));
    }
}
