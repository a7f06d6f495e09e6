use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use sla_watch::config::{Overrides, Settings};
use sla_watch::{events, ui, App, Dashboard, HttpStatusApi};

#[derive(Parser, Debug)]
#[command(name = "sla-watch")]
#[command(about = "Terminal dashboard for the uptime and latency of monitored services")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the status API (e.g. "http://localhost:8000/api/v1")
    #[arg(short = 'u', long)]
    api_url: Option<String>,

    /// File to write logs to (the terminal is owned by the UI)
    #[arg(long, default_value = "sla-watch.log")]
    log_file: PathBuf,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "sla_watch=trace")
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        api_url: args.api_url.clone(),
        log_level: args.log_level.clone(),
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;
    init_logging(&args.log_file, &settings.log_level)?;
    tracing::info!(api_url = %settings.api_url, "Starting sla-watch");

    // Pollers run on the runtime while the UI loop owns the main thread
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let api = HttpStatusApi::builder()
        .endpoint(&settings.api_url)
        .timeout(settings.request_timeout())
        .build()?;
    let mut dashboard = Dashboard::new(Arc::new(api), settings.engine_config());
    dashboard.start();

    let result = run_tui(dashboard);
    tracing::info!("Shutting down");
    result
}

fn init_logging(path: &Path, level: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log filter {:?}", level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the TUI until the user quits
fn run_tui(dashboard: Dashboard) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(dashboard);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    app.dashboard.stop();
    Ok(())
}
