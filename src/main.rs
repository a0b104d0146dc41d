use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, prelude::*};

mod calc;
mod comparator;
mod controller;
mod domain;
mod filters;
mod form;
mod inputter;
mod model;
mod search;
mod sort;
mod source;
mod table;
mod theme;
mod toast;
mod ui;

use controller::Controller;
use domain::{TVConfig, TVError};
use model::{Model, Status};
use ratatui::DefaultTerminal;
use theme::{JsonFileStore, ThemeStore};
use ui::TableUI;

/// Terminal viewer for receivables tables
#[derive(Parser, Debug)]
#[command(name = "ctv", version, about)]
struct Args {
    /// Data file to show (csv, parquet or arrow ipc)
    file: String,

    /// Initial query string, e.g. "commercial=YAYA+CAMARA&statut=A+RELANCER"
    #[arg(short, long, default_value = "")]
    query: String,

    /// Key-value store keeping the selected theme
    #[arg(long, default_value = "~/.ctv_state.json")]
    state_file: String,

    #[arg(long, default_value = "~/.ctv.log")]
    log_file: String,

    #[arg(long, default_value_t = 40)]
    max_column_width: usize,

    /// Column whose header cannot be sorted (repeatable)
    #[arg(long = "no-sort", value_name = "COLUMN")]
    no_sort: Vec<String>,
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn init_logging(path: &Path) -> Result<(), TVError> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_env("CTV_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(&expand(&args.log_file)) {
        eprintln!("Cannot open log file: {e}");
    }

    match run(args) {
        Err(e) => {
            error!("Exiting with error: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: Args) -> Result<(), TVError> {
    let cfg = TVConfig::default()
        .max_column_width(args.max_column_width)
        .state_file(expand(&args.state_file))
        .unsortable_columns(args.no_sort);
    info!("Starting ctv with {:?}", cfg);

    let store = JsonFileStore::open(cfg.state_file.clone())?;
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &cfg, Box::new(store), &args.file, &args.query);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    cfg: &TVConfig,
    store: Box<dyn ThemeStore>,
    file: &str,
    query: &str,
) -> Result<(), TVError> {
    let size = terminal.size()?;
    let mut model = Model::init(cfg, store, size.width.into(), size.height.into())?;
    model.load_data_file(expand(file), query)?;

    let ui = TableUI::new(cfg);
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message; None still ticks timers
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }
    Ok(())
}
