//! flatstate command line
//!
//! Splits nested JSON into entity tables and back, driven by a schema document.
//!
//! Usage:
//!   flatstate normalize --schema schema.json --input data.json --pretty
//!   flatstate denormalize --schema schema.json --input result.json --entities entities.json
//!
//! Logs go to stderr; JSON goes to stdout or `--output`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flatstate_cli::{load_schema, read_json, render, run_denormalize, run_normalize, write_output};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "flatstate")]
#[command(about = "Normalize and denormalize JSON with a schema document")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a nested document into entity tables and a result skeleton
    Normalize {
        /// Path to the schema document
        #[arg(short, long)]
        schema: PathBuf,

        /// Path to the nested JSON input
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Rebuild a nested document from a result skeleton and entity tables
    Denormalize {
        /// Path to the schema document
        #[arg(short, long)]
        schema: PathBuf,

        /// Path to the result skeleton; omit to denormalize nothing
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Path to the entity tables
        #[arg(short, long)]
        entities: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let (value, output) = match args.command {
        Command::Normalize { schema, input, output } => {
            info!("Normalizing {:?}", input);
            let schema = load_schema(&schema)?;
            let input = read_json(&input)?;
            (run_normalize(&schema, &input)?, output)
        }
        Command::Denormalize {
            schema,
            input,
            entities,
            output,
        } => {
            info!("Denormalizing against {:?}", entities);
            let schema = load_schema(&schema)?;
            let input = input.as_deref().map(read_json).transpose()?;
            let entities = read_json(&entities)?;
            (run_denormalize(&schema, input.as_ref(), entities)?, output)
        }
    };

    let rendered = render(&value, output.pretty)?;
    write_output(output.output.as_deref(), &rendered)
}
