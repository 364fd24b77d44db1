//! Quarry Command-Line Interface
//!
//! Offline helpers around the Quarry SQL generators.
//!
//! # Usage
//!
//! ```bash
//! # Print the CREATE EXTERNAL TABLE statement of a table definition
//! quarry ddl events.toml
//!
//! # Print the ADD PARTITION statement for every value combination
//! quarry partitions events.toml values.toml
//!
//! # Decode a downloaded result file
//! quarry render result.csv --types int,string,timestamp -o json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use quarry_common::{ColumnType, QuarryError};
use quarry_sql::TypeRegistry;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod definition;
mod formatter;

use config::CliConfig;
use formatter::OutputFormat;

/// Quarry command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "quarry",
    version,
    about = "Command-line interface for Quarry",
    long_about = "Generates table and partition DDL from TOML table definitions\n\
                  and decodes query result files into typed rows."
)]
struct Args {
    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE", global = true, env = "QUARRY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the CREATE EXTERNAL TABLE statement of a table definition
    Ddl {
        /// Table definition file
        table: PathBuf,

        /// Fail on existing tables instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Print the ALTER TABLE ... ADD PARTITION statement for a values file
    Partitions {
        /// Table definition file
        table: PathBuf,

        /// Partition values file
        values: PathBuf,

        /// Fail on existing partitions instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Decode a downloaded result file
    Render {
        /// CSV result file
        file: PathBuf,

        /// Column types, comma separated
        #[arg(short = 't', long, value_name = "TYPES")]
        types: ColumnTypeList,

        /// Output format
        #[arg(short = 'o', long, value_enum)]
        output: Option<OutputFormatArg>,
    },
}

/// Value of `--output`
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Bordered table on stdout
    Table,
    /// Array of JSON objects keyed by column
    Json,
    /// CSV with a header row
    Csv,
}

/// Value of `--types`.
///
/// Commas nested in `()` or `<>` belong to the type, so
/// `int,decimal(10,2),map<string,int>` is three types.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnTypeList(Vec<ColumnType>);

impl FromStr for ColumnTypeList {
    type Err = QuarryError;

    fn from_str(list: &str) -> Result<Self, Self::Err> {
        let mut types = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (i, c) in list.char_indices() {
            match c {
                '(' | '<' => depth += 1,
                ')' | '>' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    types.push(list[start..i].trim().parse()?);
                    start = i + 1;
                }
                _ => {}
            }
        }
        types.push(list[start..].trim().parse()?);
        Ok(Self(types))
    }
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = load_config(&args)?;

    let output = match &args.command {
        Command::Ddl { table, strict } => commands::ddl(table, *strict)?,
        Command::Partitions {
            table,
            values,
            strict,
        } => commands::partitions(table, values, *strict)?,
        Command::Render {
            file,
            types,
            output,
        } => {
            let format: OutputFormat = match output {
                Some(arg) => (*arg).into(),
                None => config.output_format.parse()?,
            };
            let registry = TypeRegistry::new(config.client.type_fallback);
            commands::render(file, &types.0, registry, format)?
        }
    };

    println!("{output}");
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("quarry_cli=debug,quarry_sql=debug,quarry_client=debug")
    } else {
        EnvFilter::new("quarry_cli=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_config(args: &Args) -> Result<CliConfig> {
    let config = if let Some(path) = &args.config {
        CliConfig::from_file(path)?
    } else {
        CliConfig::load_default()?
    };
    info!(output_format = %config.output_format, "configuration loaded");
    Ok(config)
}
