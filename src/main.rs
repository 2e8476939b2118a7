use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::warn;

mod app;
mod browser;
mod checkout;
mod config;
mod dragx;
mod gesture;
mod git;
mod history;
mod input;
mod logging;
mod models;
mod theme;
mod ui;
mod utils;

use app::App;
use config::Settings;

/// Selection log over a project tree: browse files on the left, keep a
/// bounded history with pinning on the right.
#[derive(Parser, Debug)]
#[command(name = "sellog", version, about)]
struct Cli {
    /// Directory to browse (defaults to the current directory).
    root: Option<PathBuf>,
    /// Override the configured history bound.
    #[arg(long)]
    max_items: Option<usize>,
    /// Write debug logs to this file (stdout belongs to the TUI).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.log_file.as_deref())?;

    let mut settings = Settings::new().unwrap_or_else(|e| {
        warn!(error = %e, "config load failed, using defaults");
        Settings::default()
    });
    if let Some(n) = cli.max_items {
        settings.max_items = n;
    }

    let root = std::fs::canonicalize(cli.root.unwrap_or_else(|| PathBuf::from(".")))?;
    let repo_root = git::find_repo_root(&root).unwrap_or_else(|| root.clone());
    let rt = Runtime::new()?;
    let mut app = App::new(settings, root, repo_root)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &rt);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rt: &Runtime,
) -> Result<()> {
    loop {
        app.promote_pending_popup();
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(150))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, rt, key)?;
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse)?,
                _ => {}
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
