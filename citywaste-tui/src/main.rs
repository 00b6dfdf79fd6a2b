//! Terminal dashboard for citywaste sensors, acting as the host that triggers updates.

mod app;
mod config;
mod input;
mod ui;

use std::{
    fs::OpenOptions,
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration as StdDuration, Instant},
};

use anyhow::Result;
use citywaste_core::{CityWasteConfig, sensor::CityWasteSensor, setup_platform};
use citywaste_provider::CityWastePort;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::input::Action;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "citywaste.toml")]
    config: PathBuf,

    /// Update once, log every sensor reading, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(&cli.config)?;
    init_logging(&config, cli.once)?;

    // HTTP + sensor setup
    let client = Client::builder().user_agent("citywaste/0.1").build()?;
    let mut port = CityWastePort::new(client);
    if let Some(base_url) = &config.base_url {
        port = port.with_base_url(base_url.clone());
    }
    let (_data, sensors) = setup_platform(&config, Arc::new(port));
    info!(
        sensors = sensors.len(),
        tag = %config.tagprintcd,
        "citywaste sensors set up"
    );

    if cli.once {
        run_once(&sensors).await;
        return Ok(());
    }

    // App state
    let app = App::new(sensors, StdDuration::from_secs(config.scan_interval_secs));

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn init_logging(config: &CityWasteConfig, once: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new("info"));

    if once {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else if let Some(path) = &config.log_file {
        // The dashboard owns the terminal, so logs only go to a file.
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    Ok(())
}

async fn run_once(sensors: &[CityWasteSensor]) {
    for sensor in sensors {
        sensor.update().await;
    }

    for sensor in sensors {
        let value = sensor
            .state()
            .map_or_else(|| "unknown".to_owned(), |value| value.to_string());

        if sensor.available() {
            info!(
                sensor = %sensor.name(),
                value = %value,
                unit = sensor.unit().trim(),
                icon = sensor.icon(),
                attributes = ?sensor.attributes(),
                "reading"
            );
        } else {
            warn!(sensor = %sensor.name(), value = %value, "sensor unavailable");
        }
    }
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Periodic trigger, the fetcher's own throttle still applies
        if app.refresh_due(Instant::now()) {
            refresh(terminal, &mut app).await?;
        }

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Refresh => refresh(terminal, &mut app).await?,
            }
        }
    }

    Ok(())
}

async fn refresh(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    app.is_loading = true;
    terminal.draw(|frame| ui::draw(frame, app))?;

    app.refresh(Instant::now()).await;

    app.is_loading = false;
    Ok(())
}
