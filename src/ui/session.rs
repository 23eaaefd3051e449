// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Editing session behind the terminal UI.
//!
//! Owns the editor, the store and the analysis dispatcher, and turns
//! [`KeyAction`]s and mouse events into editor operations. Nothing here
//! touches the terminal, so the whole interaction model is testable.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::analysis::{AnalysisDispatcher, HttpMeterClient, MeterAnalyzer};
use crate::config::AppConfig;
use crate::store::StropheStore;
use crate::strophe::{Color, DragSession, LineId, Palette, StropheEditor};

use super::strophe::{scroll_offset, word_at_column};
use super::{InputMode, KeyAction, UiState};

/// One strophe open for editing
pub struct EditorSession<A: MeterAnalyzer> {
    editor: StropheEditor,
    ui: UiState,
    store: StropheStore,
    number: usize,
    autosave: bool,
    palette: Palette,
    dispatcher: AnalysisDispatcher<A>,
    /// Line under the pointer when the left button went down
    pressed: Option<LineId>,
}

impl<A: MeterAnalyzer> EditorSession<A> {
    /// Open strophe `number` for editing
    pub fn new(
        editor: StropheEditor,
        store: StropheStore,
        number: usize,
        dispatcher: AnalysisDispatcher<A>,
    ) -> Self {
        Self {
            editor,
            ui: UiState::default(),
            store,
            number,
            autosave: true,
            palette: Palette::default(),
            dispatcher,
            pressed: None,
        }
    }

    /// Set the palette
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Enable or disable saving after each edit
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    /// Get the editor
    pub fn editor(&self) -> &StropheEditor {
        &self.editor
    }

    /// Get the UI state
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Get the UI state mutably
    pub fn ui_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    /// Get the palette
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Strophe number being edited
    pub fn number(&self) -> usize {
        self.number
    }

    /// Id of the selected line
    fn selected_id(&self) -> Option<LineId> {
        self.editor.lines().get(self.ui.selected_line).map(|l| l.id())
    }

    /// Keep the selection inside the strophe
    fn clamp_selection(&mut self) {
        let len = self.editor.len();
        self.ui.selected_line = self.ui.selected_line.min(len.saturating_sub(1));
        let words = self
            .editor
            .lines()
            .get(self.ui.selected_line)
            .map_or(0, |l| l.len());
        self.ui.selected_word = self.ui.selected_word.min(words.saturating_sub(1));
    }

    /// Select the line with `id`, wherever it now is
    fn select_id(&mut self, id: LineId) {
        if let Some(index) = self.editor.position(id) {
            self.ui.selected_line = index;
        }
        self.clamp_selection();
    }

    /// Called after every successful mutation
    fn changed(&mut self) {
        self.clamp_selection();
        if self.autosave {
            self.persist();
        }
    }

    fn persist(&mut self) -> bool {
        match self.store.save(self.number, &self.editor.snapshot()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save strophe");
                self.ui.set_status(format!("Save failed: {:#}", e));
                false
            }
        }
    }

    /// Apply a key action. Returns `false` when the session should end.
    pub fn apply(&mut self, action: KeyAction) -> bool {
        match action {
            KeyAction::None => {}
            KeyAction::Quit => return false,

            KeyAction::LineUp => {
                self.ui.selected_line = self.ui.selected_line.saturating_sub(1);
                self.clamp_selection();
            }
            KeyAction::LineDown => {
                self.ui.selected_line += 1;
                self.clamp_selection();
            }
            KeyAction::WordLeft => {
                self.ui.selected_word = self.ui.selected_word.saturating_sub(1);
            }
            KeyAction::WordRight => {
                self.ui.selected_word += 1;
                self.clamp_selection();
            }

            KeyAction::StartAddLine => self.ui.open_input(InputMode::AddLine, String::new()),
            KeyAction::StartEditWord => {
                if let Some(word) = self.selected_word() {
                    let text = word.text().to_string();
                    self.ui.open_input(InputMode::EditWord, text);
                }
            }
            KeyAction::StartColor => {
                if let Some(word) = self.selected_word() {
                    let current = word.custom_color().map(|c| c.to_hex()).unwrap_or_default();
                    self.ui.open_input(InputMode::WordColor, current);
                }
            }
            KeyAction::Input(c) => self.ui.input.push(c),
            KeyAction::Backspace => {
                self.ui.input.pop();
            }
            KeyAction::Commit => self.commit_input(),
            KeyAction::Cancel => {
                self.ui.close_input();
                self.ui.show_help = false;
                self.ui.preview = None;
            }

            KeyAction::CycleTag => {
                if let Some(line) = self.editor.lines().get(self.ui.selected_line) {
                    let (id, tag) = (line.id(), line.tag().next());
                    if self.editor.update_tag_at(id, tag) {
                        self.changed();
                    }
                }
            }
            KeyAction::SetTag(tag) => {
                if let Some(id) = self.selected_id() {
                    if self.editor.update_tag_at(id, tag) {
                        self.changed();
                    }
                }
            }
            KeyAction::DeleteLine => {
                if let Some(id) = self.selected_id() {
                    if self.editor.delete_line(id) {
                        self.ui.set_status("Line deleted");
                        self.changed();
                    }
                }
            }
            KeyAction::RemoveWord => {
                if let Some(id) = self.selected_id() {
                    if self.editor.remove_word_at(id, self.ui.selected_word) {
                        self.changed();
                    } else {
                        self.ui.set_status("A line keeps at least one word");
                    }
                }
            }

            KeyAction::PickUp => {
                if let Some(id) = self.selected_id() {
                    self.ui.drag = DragSession::begin(self.editor.ids(), id);
                    if self.ui.drag.is_some() {
                        self.ui.mode = InputMode::Drag;
                    }
                }
            }
            KeyAction::DragUp => {
                if let Some(drag) = self.ui.drag.as_mut() {
                    drag.step_up();
                    self.ui.selected_line = drag.over_index();
                }
            }
            KeyAction::DragDown => {
                if let Some(drag) = self.ui.drag.as_mut() {
                    drag.step_down();
                    self.ui.selected_line = drag.over_index();
                }
            }
            KeyAction::Drop => self.finish_drag(),
            KeyAction::CancelDrag => {
                if let Some(drag) = self.ui.drag.take() {
                    let id = drag.cancel();
                    self.select_id(id);
                }
                self.ui.mode = InputMode::Normal;
            }

            KeyAction::Analyze => self.analyze(),
            KeyAction::ToggleAnalysis => {
                self.editor.toggle_analysis_visible();
            }
            KeyAction::DismissAnalysis => self.editor.dismiss_analysis(),
            KeyAction::Save => {
                if self.persist() {
                    self.ui.set_status(format!("Saved {:?}", self.store.path_for(self.number)));
                }
            }
            KeyAction::TogglePreview => {
                if self.ui.preview.take().is_none() {
                    self.open_preview();
                }
            }
            KeyAction::ToggleHelp => self.ui.show_help = !self.ui.show_help,
        }
        true
    }

    /// Capture every stored strophe for the preview, this one as edited
    fn open_preview(&mut self) {
        match self.store.load_all() {
            Ok(mut stored) => {
                stored.retain(|(n, _)| *n != self.number);
                stored.push((self.number, self.editor.snapshot()));
                stored.sort_by_key(|(n, _)| *n);
                self.ui.preview = Some(stored.into_iter().map(|(_, s)| s).collect());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load strophes for preview");
                self.ui.set_status(format!("Preview failed: {}", e));
            }
        }
    }

    fn selected_word(&self) -> Option<&crate::strophe::WordUnit> {
        self.editor
            .lines()
            .get(self.ui.selected_line)?
            .words()
            .get(self.ui.selected_word)
    }

    /// Commit the open input box. Rejected text is dropped silently.
    fn commit_input(&mut self) {
        let mode = self.ui.mode;
        let text = std::mem::take(&mut self.ui.input);
        self.ui.mode = InputMode::Normal;

        match mode {
            InputMode::AddLine => {
                if let Some(id) = self.editor.add_line(&text) {
                    self.select_id(id);
                    self.ui.selected_word = 0;
                    self.changed();
                }
            }
            InputMode::EditWord => {
                if let Some(id) = self.selected_id() {
                    if self.editor.update_word_at(id, self.ui.selected_word, &text) {
                        self.changed();
                    }
                }
            }
            InputMode::WordColor => match text.trim().parse::<Color>() {
                Ok(color) => {
                    if let Some(id) = self.selected_id() {
                        if self.editor.update_word_color_at(id, self.ui.selected_word, color) {
                            self.changed();
                        }
                    }
                }
                Err(e) => self.ui.set_status(e.to_string()),
            },
            InputMode::Normal | InputMode::Drag => {}
        }
    }

    fn finish_drag(&mut self) {
        self.ui.mode = InputMode::Normal;
        let Some(drag) = self.ui.drag.take() else {
            return;
        };
        let active = drag.active();
        if let Some(commit) = drag.drop_commit() {
            if self.editor.apply_drag(commit) {
                tracing::debug!(active = %commit.active, over = %commit.over, "Line moved");
                self.changed();
            }
        }
        self.select_id(active);
    }

    /// Send the current lines for analysis
    fn analyze(&mut self) {
        if self.editor.is_empty() {
            self.ui.set_status("Nothing to analyze");
            return;
        }
        let (ticket, request) = self.editor.begin_analysis();
        self.dispatcher.submit(ticket, request);
        self.ui.set_status("Analyzing...");
    }

    /// Per-frame housekeeping: expire the status line and apply finished
    /// analyses
    pub fn tick(&mut self) {
        self.ui.clear_expired_status();

        for outcome in self.dispatcher.drain() {
            let message = match &outcome.result {
                Ok(_) => "Analysis complete".to_string(),
                Err(e) => e.user_message(),
            };
            if self.editor.finish_analysis(outcome.ticket, outcome.result) {
                self.ui.set_status(message);
            }
        }
    }

    /// Pointer events over the strophe panel
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        let area = self.ui.strophe_area;
        if self.ui.mode != InputMode::Normal || area.height == 0 || self.editor.is_empty() {
            return;
        }

        let offset = scroll_offset(self.ui.selected_line, area.height);
        let row = if event.row < area.y {
            offset
        } else {
            offset + (event.row - area.y) as usize
        };
        let inside = event.row >= area.y && event.row < area.y + area.height;

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !inside || row >= self.editor.len() {
                    return;
                }
                let line = &self.editor.lines()[row];
                let id = line.id();
                let word = word_at_column(line, event.column.saturating_sub(area.x));
                self.ui.selected_line = row;
                if let Some(word) = word {
                    self.ui.selected_word = word;
                }
                self.clamp_selection();
                self.pressed = Some(id);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.ui.drag.is_none() {
                    if let Some(id) = self.pressed {
                        self.ui.drag = DragSession::begin(self.editor.ids(), id);
                    }
                }
                if let Some(drag) = self.ui.drag.as_mut() {
                    drag.hover_index(row);
                    self.ui.selected_line = drag.over_index();
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.pressed = None;
                if self.ui.drag.is_some() {
                    self.finish_drag();
                }
            }
            MouseEventKind::ScrollUp => {
                self.apply(KeyAction::LineUp);
            }
            MouseEventKind::ScrollDown => {
                self.apply(KeyAction::LineDown);
            }
            _ => {}
        }
    }
}

impl EditorSession<HttpMeterClient> {
    /// Adopt a reloaded configuration
    pub fn apply_config(&mut self, config: &AppConfig) {
        match config.analysis.client() {
            Ok(client) => self.dispatcher.set_analyzer(client),
            Err(e) => tracing::warn!(error = %e, "Keeping previous analysis client"),
        }
        match config.palette.to_palette() {
            Ok(palette) => self.palette = palette,
            Err(e) => tracing::warn!(error = %e, "Keeping previous palette"),
        }
        self.autosave = config.store.autosave;
        self.ui.status_ttl = std::time::Duration::from_secs(config.ui.status_secs);
        self.ui.set_status("Configuration reloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{fixtures, AnalysisError, AnalysisRequest, AnalysisResult};
    use crate::strophe::RhymeTag;
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;
    use std::future::Future;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    struct FixedAnalyzer {
        fail: bool,
    }

    impl MeterAnalyzer for FixedAnalyzer {
        fn analyze(
            &self,
            _request: AnalysisRequest,
        ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send {
            let fail = self.fail;
            async move {
                if fail {
                    Err(AnalysisError::Api {
                        status: 500,
                        message: "Failed to analyze meter".to_string(),
                    })
                } else {
                    Ok(fixtures::chuva())
                }
            }
        }
    }

    struct Harness {
        session: EditorSession<FixedAnalyzer>,
        dir: TempDir,
        _runtime: tokio::runtime::Runtime,
    }

    fn harness(fail: bool) -> Harness {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = AnalysisDispatcher::new(runtime.handle().clone(), FixedAnalyzer { fail });
        let session = EditorSession::new(
            StropheEditor::new(),
            StropheStore::new(dir.path()),
            1,
            dispatcher,
        );
        Harness {
            session,
            dir,
            _runtime: runtime,
        }
    }

    fn type_line(session: &mut EditorSession<FixedAnalyzer>, text: &str) {
        session.apply(KeyAction::StartAddLine);
        for c in text.chars() {
            session.apply(KeyAction::Input(c));
        }
        session.apply(KeyAction::Commit);
    }

    fn texts(session: &EditorSession<FixedAnalyzer>) -> Vec<String> {
        session.editor().lines().iter().map(|l| l.text()).collect()
    }

    fn wait_for_outcome(session: &mut EditorSession<FixedAnalyzer>) {
        let start = Instant::now();
        while session.editor().analysis().is_pending() && start.elapsed() < Duration::from_secs(2) {
            session.tick();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_add_line_and_autosave() {
        let mut h = harness(false);
        type_line(&mut h.session, "fogo arde forte");
        type_line(&mut h.session, "   ");

        assert_eq!(texts(&h.session), vec!["fogo arde forte"]);
        assert_eq!(h.session.ui().mode, InputMode::Normal);

        let store = StropheStore::new(h.dir.path());
        let saved = store.load_editor(1).unwrap();
        assert_eq!(saved.lines(), h.session.editor().lines());
    }

    #[test]
    fn test_edit_word_splits_and_rejects_blank() {
        let mut h = harness(false);
        type_line(&mut h.session, "sol mar");

        h.session.apply(KeyAction::WordRight);
        h.session.apply(KeyAction::StartEditWord);
        assert_eq!(h.session.ui().input, "mar");
        for _ in 0..3 {
            h.session.apply(KeyAction::Backspace);
        }
        h.session.apply(KeyAction::Commit);
        assert_eq!(texts(&h.session), vec!["sol mar"]);

        h.session.apply(KeyAction::StartEditWord);
        h.session.apply(KeyAction::Backspace);
        h.session.apply(KeyAction::Backspace);
        h.session.apply(KeyAction::Backspace);
        for c in "mar azul".chars() {
            h.session.apply(KeyAction::Input(c));
        }
        h.session.apply(KeyAction::Commit);
        assert_eq!(texts(&h.session), vec!["sol mar azul"]);
    }

    #[test]
    fn test_color_input() {
        let mut h = harness(false);
        type_line(&mut h.session, "sol mar");

        h.session.apply(KeyAction::StartColor);
        for c in "#00ff00".chars() {
            h.session.apply(KeyAction::Input(c));
        }
        h.session.apply(KeyAction::Commit);
        let color = |s: &EditorSession<FixedAnalyzer>| s.editor().lines()[0].words()[0].custom_color();
        assert_eq!(color(&h.session), Some(Color::rgb(0, 255, 0)));

        h.session.apply(KeyAction::StartColor);
        assert_eq!(h.session.ui().input, "#00ff00");
        h.session.apply(KeyAction::Input('z'));
        h.session.apply(KeyAction::Commit);
        assert!(h.session.ui().status_message.is_some());
        assert_eq!(color(&h.session), Some(Color::rgb(0, 255, 0)));
    }

    #[test]
    fn test_tags() {
        let mut h = harness(false);
        type_line(&mut h.session, "um");
        type_line(&mut h.session, "dois");
        assert_eq!(h.session.editor().lines()[1].tag(), RhymeTag::B);

        h.session.apply(KeyAction::CycleTag);
        assert_eq!(h.session.editor().lines()[1].tag(), RhymeTag::C);
        h.session.apply(KeyAction::SetTag(RhymeTag::A));
        assert_eq!(h.session.editor().lines()[1].tag(), RhymeTag::A);
    }

    #[test]
    fn test_keyboard_drag() {
        let mut h = harness(false);
        for text in ["um", "dois", "tres"] {
            type_line(&mut h.session, text);
        }
        assert_eq!(h.session.ui().selected_line, 2);

        h.session.apply(KeyAction::PickUp);
        assert_eq!(h.session.ui().mode, InputMode::Drag);
        h.session.apply(KeyAction::DragUp);
        h.session.apply(KeyAction::DragUp);
        // Nothing moves until the drop
        assert_eq!(texts(&h.session), vec!["um", "dois", "tres"]);

        h.session.apply(KeyAction::Drop);
        assert_eq!(texts(&h.session), vec!["tres", "um", "dois"]);
        assert_eq!(h.session.ui().selected_line, 0);
        assert_eq!(h.session.ui().mode, InputMode::Normal);
    }

    #[test]
    fn test_cancel_drag() {
        let mut h = harness(false);
        for text in ["um", "dois"] {
            type_line(&mut h.session, text);
        }
        h.session.apply(KeyAction::PickUp);
        h.session.apply(KeyAction::DragUp);
        h.session.apply(KeyAction::CancelDrag);
        assert_eq!(texts(&h.session), vec!["um", "dois"]);
        assert_eq!(h.session.ui().selected_line, 1);
        assert!(h.session.ui().drag.is_none());
    }

    #[test]
    fn test_pointer_drag() {
        let mut h = harness(false);
        for text in ["um", "dois", "tres"] {
            type_line(&mut h.session, text);
        }
        h.session.ui_mut().strophe_area = Rect::new(1, 1, 40, 10);

        h.session.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 12, 1));
        assert_eq!(h.session.ui().selected_line, 0);
        h.session.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 12, 2));
        h.session.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 12, 3));
        assert_eq!(texts(&h.session), vec!["um", "dois", "tres"]);
        h.session.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 12, 3));

        assert_eq!(texts(&h.session), vec!["dois", "tres", "um"]);
        assert_eq!(h.session.ui().selected_line, 2);
    }

    #[test]
    fn test_click_selects_word() {
        let mut h = harness(false);
        type_line(&mut h.session, "sol mar");
        h.session.ui_mut().strophe_area = Rect::new(1, 1, 40, 10);

        // Chip " MAR " starts at column 15 of the row
        h.session.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 16, 1));
        h.session.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 16, 1));
        assert_eq!(h.session.ui().selected_word, 1);
        assert_eq!(texts(&h.session), vec!["sol mar"]);
    }

    #[test]
    fn test_remove_word_and_delete_line() {
        let mut h = harness(false);
        type_line(&mut h.session, "sol");
        h.session.apply(KeyAction::RemoveWord);
        assert_eq!(texts(&h.session), vec!["sol"]);

        h.session.apply(KeyAction::DeleteLine);
        assert!(h.session.editor().is_empty());
        h.session.apply(KeyAction::DeleteLine);
        assert!(h.session.editor().is_empty());
    }

    #[test]
    fn test_analyze_round_trip() {
        let mut h = harness(false);
        h.session.apply(KeyAction::Analyze);
        assert_eq!(h.session.ui().status_message.as_deref(), Some("Nothing to analyze"));

        type_line(&mut h.session, "a chuva cai");
        h.session.apply(KeyAction::Analyze);
        wait_for_outcome(&mut h.session);

        let analysis = h.session.editor().analysis();
        assert_eq!(analysis.result(), Some(&fixtures::chuva()));
        assert!(analysis.is_visible());

        h.session.apply(KeyAction::ToggleAnalysis);
        assert!(h.session.editor().analysis().result().is_some());
        h.session.apply(KeyAction::DismissAnalysis);
        assert!(h.session.editor().analysis().result().is_none());
    }

    #[test]
    fn test_failed_analysis_keeps_lines() {
        let mut h = harness(true);
        type_line(&mut h.session, "a chuva cai");
        let before = h.session.editor().lines().to_vec();

        h.session.apply(KeyAction::Analyze);
        wait_for_outcome(&mut h.session);

        assert_eq!(h.session.editor().lines(), before.as_slice());
        assert!(h.session.editor().analysis().result().is_none());
        assert!(h.session.editor().analysis().error().is_some());
        assert!(h.session.editor().analysis().panel_shown());
    }

    #[test]
    fn test_preview_shows_stored_and_unsaved_strophes() {
        let mut h = harness(false);
        h.session = h.session.with_autosave(false);
        let store = StropheStore::new(h.dir.path());
        for (number, text) in [(2, "sol brilha"), (1, "linha antiga")] {
            let mut editor = StropheEditor::new();
            editor.add_line(text);
            store.save(number, &editor.snapshot()).unwrap();
        }
        type_line(&mut h.session, "a chuva cai");

        h.session.apply(KeyAction::TogglePreview);
        let poem = h.session.ui().preview.clone().unwrap();
        assert_eq!(crate::ui::preview_text(&poem), "A CHUVA CAI\n\nSOL BRILHA\n");

        h.session.apply(KeyAction::TogglePreview);
        assert!(h.session.ui().preview.is_none());

        h.session.apply(KeyAction::TogglePreview);
        h.session.apply(KeyAction::Cancel);
        assert!(h.session.ui().preview.is_none());
    }

    #[test]
    fn test_quit() {
        let mut h = harness(false);
        assert!(h.session.apply(KeyAction::ToggleHelp));
        assert!(h.session.ui().show_help);
        assert!(!h.session.apply(KeyAction::Quit));
    }
}
