use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use logik::EngineKind;
use logik::core::config::{self, Overrides};
use logik::core::description::{Workspace, load_workspace};
use logik::core::state::App;
use logik::native::build_engine;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "logik", about = "Logic circuit workspace with a native simulation boundary")]
struct Args {
    /// Simulation engine backing the native boundary
    #[arg(short, long, value_enum)]
    engine: Option<EngineKind>,

    /// Simulation library path or name (platform prefix/suffix added when missing)
    #[arg(short, long)]
    library: Option<String>,

    /// Log level written to logik.log (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<LevelFilter>,

    /// Workspace description file (.toml or .json); the demo workspace when omitted
    description: Option<PathBuf>,
}

fn log_level(cli: Option<LevelFilter>) -> LevelFilter {
    cli.or_else(|| {
        std::env::var("LOGIK_LOG_LEVEL")
            .ok()
            .and_then(|raw| raw.parse().ok())
    })
    .unwrap_or(LevelFilter::Debug)
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to logik.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("logik.log") {
        let _ = WriteLogger::init(log_level(args.log_level), log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Falling back to default config: {e}");
        config::LogikConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        &Overrides {
            engine: args.engine,
            library: args.library,
            description: args.description,
        },
    );
    log::info!(
        "Logik starting up with engine {:?} (library {})",
        resolved.engine,
        resolved.library
    );

    let engine = build_engine(resolved.engine, &resolved.library).map_err(|e| {
        log::error!("Failed to start simulation engine: {e}");
        std::io::Error::other(format!("{e} (use --engine builtin to run without the library)"))
    })?;

    let workspace = match &resolved.description {
        Some(path) => load_workspace(path).map_err(|e| {
            log::error!("Failed to load workspace {}: {e}", path.display());
            std::io::Error::other(format!("{}: {e}", path.display()))
        })?,
        None => Workspace::demo(),
    };

    let app = App::new(&workspace, engine);
    logik::tui::run(app, resolved.sidebar_width)
}
