pub mod format;
pub mod render;
pub mod state;

use crate::feed::types::Source;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use state::AppState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Commands the TUI can send back to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiCommand {
    Quit,
    Refresh,
    ToggleSource(Source),
    SetQuery(String),
    SetRssUrl(String),
    Scroll { delta: i32, viewport_rows: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    RssUrl,
}

/// Line editor for the search and feed URL prompts. Lives only in the TUI.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub mode: InputMode,
    pub buffer: String,
    /// Query to restore when a search is cancelled.
    saved_query: String,
}

impl InputState {
    /// Map a key press to an engine command, updating the prompt as needed.
    pub fn handle_key(&mut self, key: KeyEvent, state: &AppState, viewport_rows: u32) -> Option<TuiCommand> {
        match self.mode {
            InputMode::Normal => self.handle_normal(key.code, state, viewport_rows),
            InputMode::Search => self.handle_search(key.code),
            InputMode::RssUrl => self.handle_rss_url(key.code),
        }
    }

    fn handle_normal(&mut self, code: KeyCode, state: &AppState, viewport_rows: u32) -> Option<TuiCommand> {
        let page = i32::try_from(viewport_rows.max(1)).unwrap_or(i32::MAX);
        let scroll = |delta| Some(TuiCommand::Scroll { delta, viewport_rows });
        match code {
            KeyCode::Char('q') => Some(TuiCommand::Quit),
            KeyCode::Char('r') => Some(TuiCommand::Refresh),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                Some(TuiCommand::ToggleSource(Source::ALL[idx]))
            }
            KeyCode::Char('/') => {
                self.mode = InputMode::Search;
                self.saved_query = state.query.clone();
                self.buffer = state.query.clone();
                None
            }
            KeyCode::Char('u') => {
                self.mode = InputMode::RssUrl;
                self.buffer = state.rss_url.clone().unwrap_or_default();
                None
            }
            KeyCode::Char('j') | KeyCode::Down => scroll(1),
            KeyCode::Char('k') | KeyCode::Up => scroll(-1),
            KeyCode::PageDown => scroll(page),
            KeyCode::PageUp => scroll(-page),
            _ => None,
        }
    }

    fn handle_search(&mut self, code: KeyCode) -> Option<TuiCommand> {
        match code {
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                None
            }
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.buffer.clear();
                Some(TuiCommand::SetQuery(std::mem::take(&mut self.saved_query)))
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                Some(TuiCommand::SetQuery(self.buffer.clone()))
            }
            KeyCode::Char(c) => {
                self.buffer.push(c);
                Some(TuiCommand::SetQuery(self.buffer.clone()))
            }
            _ => None,
        }
    }

    fn handle_rss_url(&mut self, code: KeyCode) -> Option<TuiCommand> {
        match code {
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                Some(TuiCommand::SetRssUrl(std::mem::take(&mut self.buffer)))
            }
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.buffer.clear();
                None
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                None
            }
            KeyCode::Char(c) => {
                self.buffer.push(c);
                None
            }
            _ => None,
        }
    }
}

/// Run the TUI. Reads state from `state_rx`, sends commands on `cmd_tx`.
pub async fn run_tui(state_rx: watch::Receiver<AppState>, cmd_tx: mpsc::Sender<TuiCommand>) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, state_rx, cmd_tx).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state_rx: watch::Receiver<AppState>,
    cmd_tx: mpsc::Sender<TuiCommand>,
) -> Result<()> {
    let mut input = InputState::default();
    let mut spinner_frame: u8 = 0;
    let mut viewport_rows: u16 = 0;

    loop {
        let state = state_rx.borrow().clone();
        terminal.draw(|f| viewport_rows = render::draw(f, &state, &input, spinner_frame))?;
        spinner_frame = spinner_frame.wrapping_add(1);

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(cmd) = input.handle_key(key, &state, u32::from(viewport_rows)) {
                    let quit = cmd == TuiCommand::Quit;
                    if cmd_tx.send(cmd).await.is_err() || quit {
                        return Ok(());
                    }
                }
            }
        }
    }
}
