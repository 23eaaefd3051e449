// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for verso.
//!
//! A ratatui interface with the strophe on top, the meter analysis panel
//! below it, and an input box that opens for line and word edits. Lines
//! are reordered by dragging with the mouse or by picking one up with the
//! space bar and moving it with the arrow keys.

mod analysis;
mod preview;
mod session;
mod strophe;

pub use analysis::AnalysisWidget;
pub use preview::{preview_lines, preview_text, PreviewWidget};
pub use session::EditorSession;
pub use strophe::StropheWidget;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::analysis::{AnalysisView, HttpMeterClient, MeterAnalyzer};
use crate::config::{ConfigEvent, ConfigWatcher};
use crate::strophe::{DragSession, RhymeTag, StropheSnapshot};

/// What keystrokes currently mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Navigation and single-key commands
    #[default]
    Normal,
    /// Typing a new line
    AddLine,
    /// Replacing the selected word
    EditWord,
    /// Typing a hex color for the selected word
    WordColor,
    /// Moving a picked-up line with the keyboard
    Drag,
}

impl InputMode {
    /// Whether an input box is open
    pub fn is_input(self) -> bool {
        matches!(self, Self::AddLine | Self::EditWord | Self::WordColor)
    }

    /// Title of the input box
    fn prompt(self) -> &'static str {
        match self {
            Self::AddLine => " New line ",
            Self::EditWord => " Edit word (spaces split it) ",
            Self::WordColor => " Word color (#rrggbb) ",
            Self::Normal | Self::Drag => "",
        }
    }
}

/// UI state that is not part of the strophe
#[derive(Debug, Clone)]
pub struct UiState {
    /// Selected line index
    pub selected_line: usize,
    /// Selected word index within the line
    pub selected_word: usize,
    pub mode: InputMode,
    /// Text of the open input box
    pub input: String,
    /// Drag in progress, from the keyboard or the pointer
    pub drag: Option<DragSession>,
    /// Help text visible
    pub show_help: bool,
    /// Whole-poem preview, captured when it was opened
    pub preview: Option<Vec<StropheSnapshot>>,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
    /// How long a status message stays
    pub status_ttl: Duration,
    /// Inner area of the strophe panel at the last draw
    pub strophe_area: Rect,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected_line: 0,
            selected_word: 0,
            mode: InputMode::Normal,
            input: String::new(),
            drag: None,
            show_help: false,
            preview: None,
            status_message: None,
            status_time: None,
            status_ttl: Duration::from_secs(3),
            strophe_area: Rect::default(),
        }
    }
}

impl UiState {
    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > self.status_ttl {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Open the input box prefilled with `text`
    pub fn open_input(&mut self, mode: InputMode, text: String) {
        self.mode = mode;
        self.input = text;
    }

    /// Close the input box, discarding its text
    pub fn close_input(&mut self) {
        if self.mode.is_input() {
            self.mode = InputMode::Normal;
        }
        self.input.clear();
    }
}

/// Key event result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    LineUp,
    LineDown,
    WordLeft,
    WordRight,
    StartAddLine,
    StartEditWord,
    StartColor,
    /// Typed character in an input box
    Input(char),
    Backspace,
    Commit,
    Cancel,
    CycleTag,
    SetTag(RhymeTag),
    DeleteLine,
    RemoveWord,
    /// Pick up the selected line for a keyboard drag
    PickUp,
    DragUp,
    DragDown,
    Drop,
    CancelDrag,
    Analyze,
    ToggleAnalysis,
    DismissAnalysis,
    Save,
    TogglePreview,
    ToggleHelp,
}

/// Map a key press to an action for the given mode
pub fn map_key(mode: InputMode, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return KeyAction::None;
    }

    match mode {
        InputMode::AddLine | InputMode::EditWord | InputMode::WordColor => match code {
            KeyCode::Enter => KeyAction::Commit,
            KeyCode::Esc => KeyAction::Cancel,
            KeyCode::Backspace => KeyAction::Backspace,
            KeyCode::Char(c) => KeyAction::Input(c),
            _ => KeyAction::None,
        },

        InputMode::Drag => match code {
            KeyCode::Up | KeyCode::Char('k') => KeyAction::DragUp,
            KeyCode::Down | KeyCode::Char('j') => KeyAction::DragDown,
            KeyCode::Char(' ') | KeyCode::Enter => KeyAction::Drop,
            KeyCode::Esc => KeyAction::CancelDrag,
            _ => KeyAction::None,
        },

        InputMode::Normal => match code {
            KeyCode::Char('q') => KeyAction::Quit,

            // Navigation
            KeyCode::Up | KeyCode::Char('k') => KeyAction::LineUp,
            KeyCode::Down | KeyCode::Char('j') => KeyAction::LineDown,
            KeyCode::Left | KeyCode::Char('h') => KeyAction::WordLeft,
            KeyCode::Right | KeyCode::Char('l') => KeyAction::WordRight,

            // Editing
            KeyCode::Char('a') => KeyAction::StartAddLine,
            KeyCode::Char('e') | KeyCode::Enter => KeyAction::StartEditWord,
            KeyCode::Char('c') => KeyAction::StartColor,
            KeyCode::Char('t') => KeyAction::CycleTag,
            KeyCode::Char(c @ 'A'..='D') => c
                .to_string()
                .parse()
                .map_or(KeyAction::None, KeyAction::SetTag),
            KeyCode::Char('x') | KeyCode::Delete => KeyAction::DeleteLine,
            KeyCode::Char('X') | KeyCode::Backspace => KeyAction::RemoveWord,
            KeyCode::Char(' ') => KeyAction::PickUp,

            // Analysis
            KeyCode::Char('r') => KeyAction::Analyze,
            KeyCode::Char('v') => KeyAction::ToggleAnalysis,
            KeyCode::Char('z') => KeyAction::DismissAnalysis,

            KeyCode::Char('s') => KeyAction::Save,
            KeyCode::Char('p') => KeyAction::TogglePreview,
            KeyCode::Char('?') => KeyAction::ToggleHelp,
            KeyCode::Esc => KeyAction::Cancel,
            _ => KeyAction::None,
        },
    }
}

/// Terminal UI application
pub struct App {
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Target frame rate
    frame_rate: u32,
    /// Whether to continue running
    running: bool,
}

impl App {
    /// Take over the terminal
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            frame_rate: 30,
            running: true,
        })
    }

    /// Set frame rate
    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.clamp(1, 120);
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Event loop: runs until the session asks to quit
    pub fn run(
        &mut self,
        session: &mut EditorSession<HttpMeterClient>,
        watcher: Option<&ConfigWatcher>,
    ) -> io::Result<()> {
        while self.running {
            session.tick();

            if let Some(watcher) = watcher {
                for event in watcher.recv_all() {
                    match event {
                        ConfigEvent::Reloaded(config) => {
                            self.set_frame_rate(config.ui.frame_rate);
                            session.apply_config(&config);
                        }
                        ConfigEvent::Error(message) => {
                            session.ui_mut().set_status(format!("Config error: {}", message));
                        }
                    }
                }
            }

            self.draw(session)?;

            match self.poll_event()? {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    let action = map_key(session.ui().mode, key.code, key.modifiers);
                    if !session.apply(action) {
                        self.quit();
                    }
                }
                Some(Event::Mouse(mouse)) => session.handle_mouse(mouse),
                _ => {}
            }
        }
        Ok(())
    }

    /// Draw the UI
    pub fn draw<A: MeterAnalyzer>(&mut self, session: &mut EditorSession<A>) -> io::Result<()> {
        let mut strophe_area = Rect::default();
        let view = session.editor().analysis().result().map(AnalysisView::from_result);
        let current: &EditorSession<A> = session;

        self.terminal.draw(|frame| {
            let area = frame.area();
            let analysis = current.editor().analysis();
            let show_analysis = analysis.panel_shown();
            let input_open = current.ui().mode.is_input();

            let mut constraints = vec![Constraint::Length(1), Constraint::Min(5)];
            if show_analysis {
                constraints.push(Constraint::Percentage(45));
            }
            if input_open {
                constraints.push(Constraint::Length(3));
            }
            constraints.push(Constraint::Length(1));

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(area);

            render_header(frame, chunks[0], current);

            let title = if current.ui().drag.is_some() {
                " Strophe [moving line] "
            } else {
                " Strophe "
            };
            let block = Block::default().borders(Borders::ALL).title(title);
            strophe_area = block.inner(chunks[1]);
            let ui = current.ui();
            frame.render_widget(
                StropheWidget::new(current.editor().lines(), current.palette())
                    .selected(Some((ui.selected_line, ui.selected_word)))
                    .drag(ui.drag.as_ref())
                    .block(block),
                chunks[1],
            );

            let mut next = 2;
            if show_analysis {
                frame.render_widget(
                    AnalysisWidget::new(view.as_ref())
                        .error(analysis.error())
                        .pending(analysis.is_pending())
                        .block(Block::default().borders(Borders::ALL).title(" Meter ")),
                    chunks[next],
                );
                next += 1;
            }
            if input_open {
                render_input(frame, chunks[next], ui);
                next += 1;
            }

            render_status_bar(frame, chunks[next], ui);

            if let Some(poem) = ui.preview.as_deref() {
                render_preview_overlay(frame, area, poem);
            }
            if ui.show_help {
                render_help_overlay(frame, area);
            }
        })?;

        session.ui_mut().strophe_area = strophe_area;
        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the title row
fn render_header<A: MeterAnalyzer>(frame: &mut Frame, area: Rect, session: &EditorSession<A>) {
    let lines = session.editor().len();
    let header = Line::from(vec![
        Span::styled(
            " verso ",
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" strophe {} ", session.number()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(" {} line{}", lines, if lines == 1 { "" } else { "s" }),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Render the input box
fn render_input(frame: &mut Frame, area: Rect, ui: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(ui.mode.prompt())
        .border_style(Style::default().fg(Color::Yellow));
    let text = Line::from(vec![
        Span::raw(ui.input.as_str()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, ui: &UiState) {
    let hint = match ui.mode {
        InputMode::Drag => " Up/Down: Move | Space/Enter: Drop | Esc: Cancel",
        InputMode::AddLine | InputMode::EditWord | InputMode::WordColor => {
            " Enter: Save | Esc: Cancel"
        }
        InputMode::Normal => {
            " a: Add line | e: Edit word | Space: Move line | r: Analyze | ?: Help | q: Quit"
        }
    };

    let text = if let Some(ref msg) = ui.status_message {
        Span::styled(msg.as_str(), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(hint, Style::default().fg(Color::DarkGray))
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Render the whole-poem preview over most of the screen
fn render_preview_overlay(frame: &mut Frame, area: Rect, poem: &[StropheSnapshot]) {
    let width = 64.min(area.width.saturating_sub(4));
    let height = area.height.saturating_sub(2);
    let preview_area = Rect::new((area.width - width) / 2, (area.height - height) / 2, width, height);

    frame.render_widget(Clear, preview_area);
    frame.render_widget(
        PreviewWidget::new(poem).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Poem preview (p to close) "),
        ),
        preview_area,
    );
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 52.min(area.width.saturating_sub(4));
    let height = 27.min(area.height.saturating_sub(2));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Lines", bold)),
        Line::from("  Up/Down, j/k   Select line"),
        Line::from("  Left/Right, h/l Select word"),
        Line::from("  a              Add line"),
        Line::from("  x, Delete      Delete line"),
        Line::from("  t              Cycle rhyme tag"),
        Line::from("  A-D            Set rhyme tag"),
        Line::from("  Space          Pick up / drop line"),
        Line::from("  Mouse drag     Move line"),
        Line::from(""),
        Line::from(Span::styled("Words", bold)),
        Line::from("  e, Enter       Edit word"),
        Line::from("  c              Set word color"),
        Line::from("  X, Backspace   Remove word"),
        Line::from(""),
        Line::from(Span::styled("Meter", bold)),
        Line::from("  r              Analyze"),
        Line::from("  v              Show/hide analysis"),
        Line::from("  z              Dismiss analysis"),
        Line::from(""),
        Line::from(Span::styled("Other", bold)),
        Line::from("  s              Save"),
        Line::from("  p              Preview whole poem"),
        Line::from("  ?              Toggle help"),
        Line::from("  q, Ctrl+c      Quit"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
