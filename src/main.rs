mod app;
mod catalog;
mod config;
mod constants;
mod display;
mod gallery;
mod graphics;
mod input;
mod player;
mod theme;
mod ui;
mod youtube;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use catalog::Catalog;
use config::Config;
use display::CliDisplayMode;
use gallery::{Gallery, GenreFilter};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Thumbnail rendering: 'auto', 'direct', 'ascii' or 'off'
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// Catalog file (.ron, .toml or .json) to use instead of the built-in gallery
  #[arg(short, long)]
  catalog: Option<PathBuf>,

  /// Genre shown on startup ('all' shows everything)
  #[arg(short, long)]
  genre: Option<String>,

  /// Highlight videos without starting mpv
  #[arg(long)]
  no_autoplay: bool,

  /// Validate the catalog, print a report and exit
  #[arg(long)]
  check: bool,

  /// Print shell completions and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

// --- Logging ---

/// Log to a daily rolling file; the terminal belongs to the UI.
fn init_tracing() -> Option<WorkerGuard> {
  let dir = config::log_dir();
  std::fs::create_dir_all(&dir).ok()?;
  let appender = tracing_appender::rolling::daily(dir, "ypg.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_env("YPG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
  Some(guard)
}

fn load_catalog(args: &Args, config: &Config) -> Result<Catalog> {
  match args.catalog.as_ref().or(config.catalog_path.as_ref()) {
    Some(path) => Catalog::load(path),
    None => Catalog::builtin(),
  }
}

fn print_report(catalog: &Catalog) -> Result<()> {
  let mut out = std::io::stdout().lock();
  writeln!(out, "{} valid, {} rejected", catalog.entries.len(), catalog.rejected.len())?;
  for entry in &catalog.entries {
    writeln!(out, "  ok   {}  {} — {} [{}]", entry.id, entry.artist, entry.title, entry.genre)?;
  }
  for r in &catalog.rejected {
    writeln!(out, "  skip #{}: {}", r.index, r.error)?;
  }
  Ok(())
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), "ypg", &mut std::io::stdout());
    return Ok(());
  }

  let _guard = init_tracing();
  let mut config = Config::load();
  if args.no_autoplay {
    config.autoplay = Some(false);
  }

  let catalog = load_catalog(&args, &config).context("Failed to load video catalog")?;
  if args.check {
    return print_report(&catalog);
  }
  info!(entries = catalog.entries.len(), rejected = catalog.rejected.len(), "starting gallery");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args, config, catalog).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args, config: Config, catalog: Catalog) -> Result<()> {
  let display_mode = display::resolve_display_mode(args.display_mode);
  let rejected = catalog.rejected.len();
  let mut app = App::new(Gallery::new(catalog.entries), config, display_mode);

  if rejected > 0 {
    let noun = if rejected == 1 { "entry" } else { "entries" };
    app.set_error(format!("Skipped {} invalid catalog {} (see --check)", rejected, noun));
  }
  if let Some(genre) = args.genre.as_deref() {
    app.apply_filter(GenreFilter::parse(genre));
  }

  loop {
    app.check_pending();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  app.player.stop().await?;
  Ok(())
}
