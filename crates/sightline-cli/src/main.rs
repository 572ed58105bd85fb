mod commands;
mod config;
mod display;
mod input;
mod menu;
mod pacing;
mod render;
mod retry;
mod schema_source;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sightline_core::memory::{DEFAULT_MODULE_NAME, DEFAULT_PROCESS_NAME};
use sightline_core::{OffsetSchema, SCHEMA_FILE};
use tracing_subscriber::EnvFilter;

use crate::commands::run::RunOptions;
use crate::config::{CONFIG_FILE, load_config_or_default};
use crate::display::resolve_display;
use crate::schema_source::SchemaSource;

#[derive(Parser)]
#[command(name = "sightline")]
#[command(about = "Entity overlay for CS2", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    target: TargetArgs,

    #[command(flatten)]
    schema: SchemaArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Attach and render frames until Esc, q or Ctrl+C (default)
    Run,
    /// Resolve the offset schema from the dumper documents and save it
    Offsets,
    /// Capture a single frame and print it as JSON
    Snapshot {
        /// Include entities closer than the minimum render distance
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Overlay config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Target executable name
    #[arg(long, global = true, default_value = DEFAULT_PROCESS_NAME)]
    process: String,

    /// Module the global offsets are relative to
    #[arg(long, global = true, default_value = DEFAULT_MODULE_NAME)]
    module: String,

    /// Override the display width in pixels
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Override the display height in pixels
    #[arg(long, global = true)]
    height: Option<u32>,
}

#[derive(Args)]
struct SchemaArgs {
    /// Persisted offset schema
    #[arg(short, long, global = true, default_value = SCHEMA_FILE)]
    offsets: PathBuf,

    /// Local globals document (offsets.json from the dumper)
    #[arg(long, global = true, requires = "classes")]
    globals: Option<PathBuf>,

    /// Local classes document (client_dll.json from the dumper)
    #[arg(long, global = true, requires = "globals")]
    classes: Option<PathBuf>,

    /// Base URL of the dumper output
    #[arg(long, global = true, env = "SIGHTLINE_SCHEMA_URL")]
    schema_url: Option<String>,
}

impl SchemaArgs {
    fn source(&self) -> SchemaSource {
        SchemaSource::from_args(
            self.globals.clone(),
            self.classes.clone(),
            self.schema_url.clone(),
        )
    }

    /// The persisted schema, or a freshly resolved one that is then persisted
    fn load(&self) -> Result<OffsetSchema> {
        let source = self.source();
        OffsetSchema::load_or_resolve(&self.offsets, || source.resolve())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sightline=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Offsets => commands::offsets::run(&cli.schema.source(), &cli.schema.offsets),
        Command::Snapshot { all } => {
            let schema = cli.schema.load()?;
            let config = load_config_or_default(&cli.target.config);
            let display = resolve_display(cli.target.width, cli.target.height);
            commands::snapshot::run(
                &cli.target.process,
                &cli.target.module,
                &schema,
                &config,
                display,
                !all,
            )
        }
        Command::Run => {
            let schema = cli.schema.load()?;
            let config = load_config_or_default(&cli.target.config);
            let options = RunOptions {
                process_name: cli.target.process,
                module_name: cli.target.module,
                width: cli.target.width,
                height: cli.target.height,
                offsets: cli.schema.offsets,
            };
            commands::run::run(&options, &schema, config)
        }
    }
}
