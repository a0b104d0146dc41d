use std::io::Error;
use std::path::PathBuf;
use std::time::Duration;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TVError {
    #[error("io error: {0}")]
    IoError(#[from] Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("state file error: {0}")]
    StateError(#[from] serde_json::Error),
    #[error("collation not available: {0}")]
    Collation(String),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type")]
    UnknownFileType,
}

#[derive(Debug, Clone, Setters)]
pub struct TVConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub clock_refresh: Duration,
    pub toast_duration: Duration,
    pub toast_slide: Duration,
    pub due_days: u64,
    pub state_file: PathBuf,
    pub unsortable_columns: Vec<String>,
}

impl Default for TVConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            clock_refresh: Duration::from_secs(60),
            toast_duration: Duration::from_millis(3000),
            toast_slide: Duration::from_millis(300),
            due_days: 10,
            state_file: PathBuf::from(".ctv_state.json"),
            unsortable_columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    MoveToFirstColumn,
    MoveToLastColumn,
    SortCurrentColumn,
    SortColumn(usize),
    Search,
    Filter,
    ResetFilters,
    ToggleTheme,
    Calculator,
    Help,
    Enter,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
Navigation
  ↑ ↓ ← → / hjkl   move selection
  PgUp PgDn        page up / down
  g G              first / last row
  0 $              first / last column

Table
  s                sort current column (again to reverse)
  1 - 9            sort column N
  /                search as you type (Esc clears, Enter keeps)

Filters
  f                filter by commercial, statut, client
  r                reset filters

Tools
  c                amount & due date calculator
  t                toggle light / dark theme
  ?                this help
  Esc              close popup
  q                quit";
