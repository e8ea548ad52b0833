//! rostergrid - browse roster datasets as sortable, filterable tables.

use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use ratatui::DefaultTerminal;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

use rostergrid::app::App;
use rostergrid::config::{Config, Settings};
use rostergrid::events::EventHandler;
use rostergrid::lookup::{DetailLookup, HttpDetailLookup, RowEcho};
use rostergrid::roster::{self, Roster};
use rostergrid::tasks::{create_task_channel, DetailFetched};
use rostergrid::{error::AppError, logging};

#[derive(Debug, Parser)]
#[command(name = "rostergrid", version, about)]
struct Cli {
    /// JSON file holding an array of records.
    data: PathBuf,

    /// Which table the records belong to.
    #[arg(long, value_enum, default_value_t = Roster::Students)]
    table: Roster,

    /// Configuration file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with the filter controls hidden.
    #[arg(long)]
    hide_filters: bool,

    /// Log filter directive, e.g. `rostergrid=debug`. `RUST_LOG` overrides it.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|e| user_error(e.into()))?;
    let mut settings = config.settings;
    if cli.hide_filters {
        settings.filters_on = false;
    }

    let log_dir = match logging::init(&settings.logging, cli.log_level.as_deref()) {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    let result = run(cli, settings);
    logging::shutdown();
    if let (Err(_), Some(dir)) = (&result, &log_dir) {
        eprintln!("Logs are in {}", dir.display());
    }
    result
}

fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    info!(table = %cli.table, data = %cli.data.display(), "Opening dataset");

    let rows = roster::load_rows(&cli.data)
        .map_err(user_error)
        .with_context(|| format!("Failed to load {}", cli.data.display()))?;

    let lookup: Arc<dyn DetailLookup<Value, Detail = Value>> =
        match HttpDetailLookup::from_config(&settings.lookup) {
            Some(lookup) => {
                let lookup = lookup.map_err(|e| user_error(e.into()))?;
                info!(base_url = lookup.base_url(), "Using HTTP detail lookup");
                Arc::new(lookup)
            }
            None => {
                info!("No lookup base_url configured, rows are their own detail");
                Arc::new(RowEcho)
            }
        };

    let (rx, spawner) = create_task_channel();
    let app = App::new(cli.table, rows, &settings, lookup, spawner).map_err(user_error)?;
    let events = EventHandler::with_tick_rate(settings.tick_rate_ms);

    let mut terminal = ratatui::init();
    // Paste support is optional
    let _ = execute!(stdout(), EnableBracketedPaste);
    let result = event_loop(&mut terminal, app, events, rx);
    // Restore the terminal even if the loop failed
    let _ = execute!(stdout(), DisableBracketedPaste);
    ratatui::restore();

    if let Err(e) = &result {
        error!(error = %e, "Event loop failed");
    }
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    mut app: App,
    events: EventHandler,
    mut rx: UnboundedReceiver<DetailFetched<Value>>,
) -> anyhow::Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| app.view(frame))?;

        let event = events.next()?;
        app.update(event);

        while let Ok(message) = rx.try_recv() {
            app.handle_detail(message);
        }
    }
    Ok(())
}

/// Lead with the friendly message; keep the error itself as the cause.
fn user_error(error: AppError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}
