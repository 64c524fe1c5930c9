mod check;
mod schema;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use manarg::{EXIT_ERROR, ParameterError, ParseOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

use crate::check::check_schema;
use crate::schema::{LoadedSchema, load_schema};

#[derive(Parser)]
#[command(name = "manarg")]
#[command(version, about = "Run command-line parsers described by JSON schemas", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse tokens with a schema and print the result as JSON
    Parse(ParseArgs),

    /// Print the help page a schema renders
    Help(HelpArgs),

    /// Build a schema and report its parameters and constraints
    Check(CheckArgs),
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the parser schema
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Tokens to parse, after `--`
    #[arg(last = true, value_name = "TOKENS")]
    tokens: Vec<String>,
}

#[derive(Parser)]
struct HelpArgs {
    /// Path to the parser schema
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the parser schema
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => parse_command(args),
        Commands::Help(args) => help_command(args),
        Commands::Check(args) => check_command(args),
    }
}

fn parse_command(args: ParseArgs) -> Result<ExitCode> {
    let loaded = load_schema(&args.schema)?;
    let parser = match loaded.schema.build() {
        Ok(parser) => parser,
        Err(err) => return Ok(config_error(&loaded, &err)),
    };

    match parser.parse(args.tokens.as_slice()) {
        Ok(ParseOutcome::Matches(matches)) => {
            let json = if args.compact {
                serde_json::to_string(&matches)
            } else {
                serde_json::to_string_pretty(&matches)
            }
            .context("failed to serialize matches")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Ok(ParseOutcome::Help(text)) | Ok(ParseOutcome::Version(text)) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!(error = %err, "parse failed");
            eprintln!("{}", parser.format_error(&err));
            Ok(error_exit_code(&err))
        }
    }
}

fn help_command(args: HelpArgs) -> Result<ExitCode> {
    let loaded = load_schema(&args.schema)?;
    match loaded.schema.build() {
        Ok(parser) => {
            println!("{}", parser.help());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Ok(config_error(&loaded, &err)),
    }
}

fn check_command(args: CheckArgs) -> Result<ExitCode> {
    let loaded = load_schema(&args.schema)?;
    let report = check_schema(&loaded);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!("=== Schema Check Results ===");
        eprintln!("Schema: {}", report.schema);
        eprintln!("Program: {}", report.prog);
        if let Some(error) = &report.error {
            eprintln!();
            eprintln!("Configuration error: {error}");
        } else {
            eprintln!("Parameters: {}", report.parameters.len());
            for p in &report.parameters {
                let flags = match &p.long {
                    Some(long) => format!("{}, {long}", p.short),
                    None => p.short.clone(),
                };
                eprintln!(
                    "  {flags}  dest={} type={} nargs={} section={}",
                    p.dest, p.value_type, p.nargs, p.section
                );
            }
            for c in &report.dependencies {
                eprintln!("  {} requires {}", c.param, c.targets.join(", "));
            }
            for c in &report.incompatibilities {
                eprintln!("  {} excludes {}", c.param, c.targets.join(", "));
            }
        }
    }

    if report.valid {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_ERROR as u8))
    }
}

fn config_error(loaded: &LoadedSchema, err: &ParameterError) -> ExitCode {
    eprintln!("{}: error: {err}", loaded.prog());
    error_exit_code(err)
}

fn error_exit_code(err: &ParameterError) -> ExitCode {
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
