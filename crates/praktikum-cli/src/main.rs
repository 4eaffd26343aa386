//! `praktikum`: terminal UI for filing and reviewing practicum complaints.
//!
//! # Usage
//!
//! ```
//! praktikum --url http://localhost:8080 --user A11 --password secret --praktikum 5
//! praktikum --config ~/.config/praktikum/config.toml --role reviewer --student A11
//! ```

mod app;
mod client;
mod dialog;
mod ui;

use std::{fs::OpenOptions, io, sync::Mutex, time::Duration};

use anyhow::{Context, Result, anyhow};
use app::{App, View};
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use praktikum_core::{complaint::ReferenceType, lifecycle::Role};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "praktikum", about = "Terminal UI for practicum complaints")]
struct Args {
  /// Path to a TOML config file (url, username, password, praktikum, role).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the server (default: http://localhost:8080).
  #[arg(long, env = "PRAKTIKUM_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "PRAKTIKUM_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "PRAKTIKUM_PASSWORD")]
  password: Option<String>,

  /// Practicum id whose records to show.
  #[arg(long)]
  praktikum: Option<i64>,

  /// Student number whose records to show (default: the username).
  #[arg(long)]
  student: Option<String>,

  /// `grading`/`penilaian` or `attendance`/`presensi`.
  #[arg(long, value_parser = parse_kind)]
  kind: Option<ReferenceType>,

  /// `filer` or `reviewer`.
  #[arg(long, value_parser = parse_role)]
  role: Option<Role>,

  /// Append logs to this file; the terminal is taken by the UI.
  #[arg(long, value_name = "FILE")]
  log: Option<std::path::PathBuf>,
}

fn parse_kind(s: &str) -> Result<ReferenceType, String> {
  match s.to_ascii_lowercase().as_str() {
    "grading" | "penilaian" => Ok(ReferenceType::Grading),
    "attendance" | "presensi" => Ok(ReferenceType::Attendance),
    other => Err(format!("unknown record kind {other:?}")),
  }
}

fn parse_role(s: &str) -> Result<Role, String> {
  match s.to_ascii_lowercase().as_str() {
    "filer" => Ok(Role::Filer),
    "reviewer" => Ok(Role::Reviewer),
    other => Err(format!("unknown role {other:?}")),
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:       String,
  #[serde(default)]
  username:  String,
  #[serde(default)]
  password:  String,
  praktikum: Option<i64>,
  role:      Option<Role>,
}

fn non_empty(s: &str) -> Option<String> { (!s.is_empty()).then(|| s.to_string()) }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log {
    let file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
      .with_env_filter(
        EnvFilter::builder()
          .with_default_directive(LevelFilter::INFO.into())
          .from_env_lossy(),
      )
      .with_ansi(false)
      .with_writer(Mutex::new(file))
      .init();
  }

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| non_empty(&file_cfg.url))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args
      .user
      .or_else(|| non_empty(&file_cfg.username))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| non_empty(&file_cfg.password))
      .unwrap_or_default(),
  };

  let view = View {
    praktikum_id:   args
      .praktikum
      .or(file_cfg.praktikum)
      .ok_or_else(|| anyhow!("no practicum given; pass --praktikum"))?,
    student:        args
      .student
      .or_else(|| non_empty(&api_config.username))
      .ok_or_else(|| anyhow!("no student given; pass --student or --user"))?,
    reference_type: args.kind.unwrap_or(ReferenceType::Grading),
    role:           args.role.or(file_cfg.role).unwrap_or(Role::Filer),
  };

  let client = ApiClient::new(api_config)?;
  let mut app = App::new(client, view);

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = match app.load_records().await {
    Ok(()) => run_event_loop(&mut terminal, &mut app).await,
    Err(e) => Err(e),
  };

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
