use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use radiowatch::{
    data::{now_seconds, TIMESTAMP_FORMAT},
    duration::parse_duration,
    events, ui, App, ChartFeed, DataSource, EmailNotifier, HttpProbe, LogNotifier, Monitor,
    Notifier, ObservationLog, Settings, Shutdown, View,
};

#[derive(Parser, Debug)]
#[command(name = "radiowatch")]
#[command(about = "Monitor Shoutcast radio streams and chart their listeners")]
struct Args {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll interval (e.g. "10s", "500ms", "2m", or plain seconds)
    #[arg(short, long)]
    interval: Option<String>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Observations per source shown in the chart
    #[arg(short, long)]
    window: Option<usize>,

    /// Run the monitor without the TUI, logging to stderr
    #[arg(long, conflicts_with = "export")]
    headless: bool,

    /// Export the recent log of every source to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;

    let to_stderr = args.headless || args.export.is_some();
    init_logging(&settings, to_stderr)?;

    let rt = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return rt.block_on(export_to_file(&settings, export_path));
    }

    let log = rt
        .block_on(ObservationLog::open(&settings.database))
        .with_context(|| format!("Failed to open {}", settings.database.display()))?;
    let log = Arc::new(log);

    let probe = Arc::new(HttpProbe::builder().timeout(settings.http_timeout).build()?);
    let notifier = build_notifier(&settings)?;

    let shutdown = Shutdown::new();
    let monitor = Monitor::new(settings.sources(), probe, log.clone(), notifier)
        .with_poll_interval(settings.poll_interval);

    let mut tasks: Vec<JoinHandle<()>> = vec![rt.spawn(monitor.run(shutdown.clone()))];
    rt.spawn(shutdown.clone().trigger_on_ctrl_c());

    info!(
        sources = settings.sources.len(),
        database = %settings.database.display(),
        "radiowatch started"
    );

    let result = if args.headless {
        rt.block_on(shutdown.cancelled());
        Ok(())
    } else {
        let (feed, source) = ChartFeed::create(
            settings.sources(),
            log.clone(),
            settings.chart_window,
            settings.render_interval,
        );
        tasks.push(rt.spawn(feed.run(shutdown.clone())));

        let names = settings.sources.keys().cloned().collect();
        run_tui(Box::new(source), names, &shutdown)
    };

    shutdown.trigger();
    rt.block_on(async {
        let join = async {
            for task in tasks {
                let _ = task.await;
            }
        };
        if tokio::time::timeout(settings.shutdown_grace, join).await.is_err() {
            warn!("Tasks did not stop within {:?}", settings.shutdown_grace);
        }
        if let Ok(log) = Arc::try_unwrap(log) {
            if let Err(e) = log.close().await {
                warn!("Failed to close the observation log: {}", e);
            }
        }
    });
    rt.shutdown_timeout(settings.shutdown_grace);

    info!("radiowatch stopped");
    result
}

/// Layered settings with command line overrides on top.
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(ref interval) = args.interval {
        settings.poll_interval = parse_duration(interval)
            .with_context(|| format!("Invalid --interval '{}'", interval))?;
    }
    if let Some(ref database) = args.database {
        settings.database = database.clone();
    }
    if let Some(window) = args.window {
        settings.chart_window = window;
    }

    settings.validate()?;
    Ok(settings)
}

fn init_logging(settings: &Settings, to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if to_stderr {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
        return Ok(());
    }

    // The alternate screen owns stdout, so the TUI logs to a file
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file)
        .with_context(|| format!("Failed to open {}", settings.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn build_notifier(settings: &Settings) -> Result<Arc<dyn Notifier>> {
    match EmailNotifier::from_settings(&settings.smtp)? {
        Some(email) => {
            info!(relay = %settings.smtp.relay, "Email alerts enabled");
            Ok(Arc::new(email))
        }
        None => {
            warn!("SMTP credentials not set; offline alerts go to the log only");
            Ok(Arc::new(LogNotifier))
        }
    }
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, names: Vec<String>, shutdown: &Shutdown) -> Result<()> {
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

    let mut app = App::new(source, names);
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app, shutdown, Duration::from_millis(100));

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

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    shutdown: &Shutdown,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running && shutdown.is_running() {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered = ratatui::layout::Rect::new(0, top, area.width, 5u16.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Chart => ui::chart::render(frame, app, chunks[2]),
                View::Log => ui::log::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Export the recent log of every source to a JSON file
async fn export_to_file(settings: &Settings, export_path: &Path) -> Result<()> {
    let log = ObservationLog::open(&settings.database)
        .await
        .with_context(|| format!("Failed to open {}", settings.database.display()))?;

    let mut sources = serde_json::Map::new();
    for source in settings.sources() {
        let total = log.count(&source.name).await?;
        let recent = log.recent(&source.name, settings.chart_window).await?;
        sources.insert(
            source.name.clone(),
            serde_json::json!({
                "url": source.url,
                "total_observations": total,
                "recent": recent,
            }),
        );
    }
    log.close().await?;

    let export = serde_json::json!({
        "exported_at": now_seconds().format(TIMESTAMP_FORMAT).to_string(),
        "window": settings.chart_window,
        "sources": sources,
    });

    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    println!("Exported observation log to: {}", export_path.display());
    Ok(())
}
