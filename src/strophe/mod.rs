// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Strophe editing.
//!
//! This module provides:
//! - Word chips with optional color overrides
//! - Rhyme-tagged verse lines
//! - The strophe editor: ordered lines, drag reordering, analysis slot
//! - Snapshots for persistence

pub mod line;
pub mod palette;
pub mod reorder;
pub mod snapshot;
pub mod tag;
pub mod word;

pub use line::{LineId, VerseLine};
pub use palette::{resolve_word_color, Color, ColorParseError, Palette};
pub use reorder::{DragCommit, DragSession};
pub use snapshot::{SnapshotError, StropheSnapshot};
pub use tag::{RhymeScheme, RhymeTag};
pub use word::WordUnit;

use crate::analysis::{AnalysisError, AnalysisRequest, AnalysisResult};

/// Identifies one analysis request; later requests get larger tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnalysisTicket(pub u64);

/// Last analysis result and its presentation state
#[derive(Debug, Clone, Default)]
pub struct AnalysisState {
    result: Option<AnalysisResult>,
    visible: bool,
    error: Option<String>,
    issued: u64,
    applied: u64,
}

impl AnalysisState {
    /// Last stored result
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Whether the result panel is shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Message of the last failed request, cleared on success
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a request newer than the last applied outcome is out
    pub fn is_pending(&self) -> bool {
        self.issued > self.applied
    }

    /// Whether the panel belongs on screen: toggled on, waiting, or
    /// holding an error the user has not hidden
    pub fn panel_shown(&self) -> bool {
        self.visible || self.is_pending()
    }
}

/// Editor for one strophe.
///
/// Every mutation is total: unknown ids, out-of-range indexes and blank
/// text leave the editor unchanged and return `false`.
#[derive(Debug, Clone, Default)]
pub struct StropheEditor {
    lines: Vec<VerseLine>,
    next_id: u64,
    scheme: Option<RhymeScheme>,
    analysis: AnalysisState,
}

impl StropheEditor {
    /// Create an empty editor
    pub fn new() -> Self {
        Self::default()
    }

    /// Get lines in order
    pub fn lines(&self) -> &[VerseLine] {
        &self.lines
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if there are no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Ids in display order
    pub fn ids(&self) -> Vec<LineId> {
        self.lines.iter().map(VerseLine::id).collect()
    }

    /// Find a line by id
    pub fn line(&self, id: LineId) -> Option<&VerseLine> {
        self.lines.iter().find(|l| l.id() == id)
    }

    /// Position of a line
    pub fn position(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|l| l.id() == id)
    }

    /// Rhyme scheme new lines follow, if one is set
    pub fn scheme(&self) -> Option<&RhymeScheme> {
        self.scheme.as_ref()
    }

    /// Set or clear the rhyme scheme; existing tags are left as they are
    pub fn set_scheme(&mut self, scheme: Option<RhymeScheme>) {
        self.scheme = scheme;
    }

    /// Append a line built from raw text.
    ///
    /// Returns the new line's id, or `None` if the text holds no words or
    /// the id space is used up. The tag follows the rhyme scheme by the
    /// current line count, cycling A, B, C, D when no scheme is set.
    pub fn add_line(&mut self, raw: &str) -> Option<LineId> {
        let id = LineId(self.next_id);
        let next_id = self.next_id.checked_add(1)?;
        let tag = match &self.scheme {
            Some(scheme) => scheme.tag_for(self.lines.len()),
            None => RhymeTag::for_position(self.lines.len()),
        };
        let line = VerseLine::from_text(id, raw, tag)?;

        self.next_id = next_id;
        self.lines.push(line);
        tracing::debug!(%id, %tag, "Line added");
        Some(id)
    }

    /// Remove a line
    pub fn delete_line(&mut self, id: LineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id() != id);
        self.lines.len() != before
    }

    /// Move `active` to the position currently held by `over`.
    ///
    /// Lines in between shift by one; all others keep their place.
    pub fn reorder(&mut self, active: LineId, over: LineId) -> bool {
        if active == over {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(active), self.position(over)) else {
            return false;
        };

        let line = self.lines.remove(from);
        self.lines.insert(to, line);
        true
    }

    /// Apply a finished drag
    pub fn apply_drag(&mut self, commit: DragCommit) -> bool {
        self.reorder(commit.active, commit.over)
    }

    /// Change a line's tag
    pub fn update_tag_at(&mut self, id: LineId, tag: RhymeTag) -> bool {
        self.replace_line(id, |line| Some(line.with_tag(tag)))
    }

    /// Replace a line's words wholesale
    pub fn update_words_at(&mut self, id: LineId, words: Vec<WordUnit>) -> bool {
        self.replace_line(id, |line| line.with_words(words))
    }

    /// Edit one word; a multi-token edit splits the word in place
    pub fn update_word_at(&mut self, id: LineId, index: usize, text: &str) -> bool {
        self.replace_line(id, |line| Some(line.with_word_text(index, text)))
    }

    /// Set one word's color override
    pub fn update_word_color_at(&mut self, id: LineId, index: usize, color: Color) -> bool {
        self.replace_line(id, |line| Some(line.with_word_color(index, color)))
    }

    /// Remove one word; refused if it is the line's only word
    pub fn remove_word_at(&mut self, id: LineId, index: usize) -> bool {
        self.replace_line(id, |line| line.without_word(index))
    }

    fn replace_line(&mut self, id: LineId, f: impl FnOnce(&VerseLine) -> Option<VerseLine>) -> bool {
        let Some(pos) = self.position(id) else {
            tracing::trace!(%id, "Ignoring edit of missing line");
            return false;
        };
        match f(&self.lines[pos]) {
            Some(updated) if updated != self.lines[pos] => {
                self.lines[pos] = updated;
                true
            }
            _ => false,
        }
    }

    /// Current lines flattened for the analysis service
    pub fn analysis_request(&self) -> AnalysisRequest {
        AnalysisRequest::new(self.lines.iter().map(VerseLine::text).collect())
    }

    /// Issue a ticket and the request to send under it
    pub fn begin_analysis(&mut self) -> (AnalysisTicket, AnalysisRequest) {
        self.analysis.issued += 1;
        (AnalysisTicket(self.analysis.issued), self.analysis_request())
    }

    /// Record the outcome of a request.
    ///
    /// Outcomes older than the newest one already applied are dropped, so
    /// a slow early response cannot replace a later result. A failure
    /// keeps the previous result and opens the panel so the error is seen.
    /// Returns whether the outcome was applied.
    pub fn finish_analysis(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if ticket.0 < self.analysis.applied {
            tracing::debug!(ticket = ticket.0, applied = self.analysis.applied, "Dropping stale analysis");
            return false;
        }
        self.analysis.applied = ticket.0;

        match outcome {
            Ok(result) => {
                self.analysis.result = Some(result);
                self.analysis.visible = true;
                self.analysis.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Analysis failed, keeping previous result");
                self.analysis.error = Some(e.user_message());
                self.analysis.visible = true;
            }
        }
        true
    }

    /// Analysis state
    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    /// Show or hide the result panel without discarding the result
    pub fn toggle_analysis_visible(&mut self) -> bool {
        self.analysis.visible = !self.analysis.visible;
        self.analysis.visible
    }

    /// Discard the stored result and any error
    pub fn dismiss_analysis(&mut self) {
        self.analysis.result = None;
        self.analysis.error = None;
        self.analysis.visible = false;
    }

    /// Capture the lines for persistence
    pub fn snapshot(&self) -> StropheSnapshot {
        StropheSnapshot {
            lines: self.lines.clone(),
            rhyme_scheme: self.scheme.clone(),
        }
    }

    /// Rebuild an editor from a snapshot; ids are kept as stored
    pub fn restore(snapshot: StropheSnapshot) -> Result<Self, SnapshotError> {
        snapshot.validate()?;
        let next_id = snapshot
            .lines
            .iter()
            .map(|l| l.id().0.saturating_add(1))
            .max()
            .unwrap_or(0);

        Ok(Self {
            lines: snapshot.lines,
            next_id,
            scheme: snapshot.rhyme_scheme,
            analysis: AnalysisState::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;
    use crate::strophe::palette::TAG_FILLS;

    fn editor(lines: &[&str]) -> StropheEditor {
        let mut editor = StropheEditor::new();
        for line in lines {
            editor.add_line(line).unwrap();
        }
        editor
    }

    fn texts(editor: &StropheEditor) -> Vec<String> {
        editor.lines().iter().map(VerseLine::text).collect()
    }

    #[test]
    fn test_add_and_tag() {
        let mut editor = StropheEditor::new();
        let id = editor.add_line("fogo arde forte").unwrap();

        let line = editor.line(id).unwrap();
        assert_eq!(editor.len(), 1);
        assert_eq!(line.tag(), RhymeTag::A);
        let words: Vec<_> = line.words().iter().map(WordUnit::text).collect();
        assert_eq!(words, vec!["fogo", "arde", "forte"]);
        assert_eq!(line.word_color(2, &Palette::default()), Some(TAG_FILLS[0]));
    }

    #[test]
    fn test_add_blank_is_noop() {
        let mut editor = StropheEditor::new();
        assert!(editor.add_line("").is_none());
        assert!(editor.add_line(" \t ").is_none());
        assert!(editor.is_empty());
    }

    #[test]
    fn test_order_and_tag_cycle() {
        let inputs = ["um", "dois", "tres", "quatro", "cinco", "seis"];
        let editor = editor(&inputs);
        assert_eq!(texts(&editor), inputs.iter().map(|s| s.to_string()).collect::<Vec<_>>());

        let tags: Vec<_> = editor.lines().iter().map(VerseLine::tag).collect();
        assert_eq!(
            tags,
            vec![RhymeTag::A, RhymeTag::B, RhymeTag::C, RhymeTag::D, RhymeTag::A, RhymeTag::B]
        );
    }

    #[test]
    fn test_ids_unique_and_stable() {
        let mut editor = editor(&["a", "b", "c"]);
        let ids = editor.ids();
        editor.delete_line(ids[1]);
        let new_id = editor.add_line("d").unwrap();
        assert!(!ids.contains(&new_id));
        assert_eq!(editor.ids(), vec![ids[0], ids[2], new_id]);
    }

    #[test]
    fn test_tag_after_delete_uses_current_count() {
        let mut editor = editor(&["a", "b", "c"]);
        let ids = editor.ids();
        editor.delete_line(ids[0]);
        let id = editor.add_line("d").unwrap();
        assert_eq!(editor.line(id).unwrap().tag(), RhymeTag::C);
    }

    #[test]
    fn test_delete_idempotent() {
        let mut editor = editor(&["a", "b"]);
        let id = editor.ids()[0];
        assert!(editor.delete_line(id));
        let after_first = texts(&editor);
        assert!(!editor.delete_line(id));
        assert_eq!(texts(&editor), after_first);
    }

    #[test]
    fn test_reorder_moves_to_target() {
        let mut editor = editor(&["a", "b", "c", "d"]);
        let ids = editor.ids();

        assert!(editor.reorder(ids[0], ids[2]));
        assert_eq!(texts(&editor), vec!["b", "c", "a", "d"]);

        assert!(editor.reorder(ids[3], ids[1]));
        assert_eq!(texts(&editor), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_reorder_adjacent_involution() {
        let mut editor = editor(&["a", "b", "c", "d", "e"]);
        let original = editor.ids();
        for pair in original.windows(2) {
            editor.reorder(pair[0], pair[1]);
            editor.reorder(pair[1], pair[0]);
            assert_eq!(editor.ids(), original);
        }
    }

    #[test]
    fn test_reorder_shifts_others_by_at_most_one() {
        let base = editor(&["a", "b", "c", "d", "e", "f"]);
        let ids = base.ids();
        for &active in &ids {
            for &over in &ids {
                let mut editor = base.clone();
                editor.reorder(active, over);
                for &other in ids.iter().filter(|&&id| id != active) {
                    let before = base.position(other).unwrap() as isize;
                    let after = editor.position(other).unwrap() as isize;
                    assert!((before - after).abs() <= 1);
                }
                // Moving onto whatever now holds the old slot undoes the move
                if active != over {
                    let old_slot = base.position(active).unwrap();
                    let occupant = editor.lines()[old_slot].id();
                    editor.reorder(active, occupant);
                    assert_eq!(editor.ids(), ids, "undo of {active} -> {over}");
                }
            }
        }
    }

    #[test]
    fn test_reorder_noops() {
        let mut editor = editor(&["a", "b"]);
        let ids = editor.ids();
        assert!(!editor.reorder(ids[0], ids[0]));
        assert!(!editor.reorder(ids[0], LineId(99)));
        assert!(!editor.reorder(LineId(99), ids[1]));
        assert_eq!(texts(&editor), vec!["a", "b"]);
    }

    #[test]
    fn test_stale_ids_ignored() {
        let mut editor = editor(&["sol brilha"]);
        let ghost = LineId(42);
        assert!(!editor.update_tag_at(ghost, RhymeTag::D));
        assert!(!editor.update_word_at(ghost, 0, "lua"));
        assert!(!editor.update_word_color_at(ghost, 0, Color::rgb(0, 0, 0)));
        assert!(!editor.update_words_at(ghost, vec![WordUnit::new("x")]));
        assert!(!editor.remove_word_at(ghost, 0));
        assert_eq!(texts(&editor), vec!["sol brilha"]);
    }

    #[test]
    fn test_word_edit_keeps_order_and_id() {
        let mut editor = editor(&["a b", "sol brilha", "c d"]);
        let id = editor.ids()[1];
        assert!(editor.update_word_at(id, 0, "sol forte"));
        assert_eq!(texts(&editor), vec!["a b", "sol forte brilha", "c d"]);
        assert_eq!(editor.ids()[1], id);

        assert!(!editor.update_word_at(id, 0, "  "));
        assert_eq!(editor.line(id).unwrap().text(), "sol forte brilha");
    }

    #[test]
    fn test_tag_change_keeps_overrides() {
        let mut editor = editor(&["mar azul"]);
        let id = editor.ids()[0];
        let green = Color::rgb(0, 255, 0);
        editor.update_word_color_at(id, 1, green);
        editor.update_tag_at(id, RhymeTag::D);

        let line = editor.line(id).unwrap();
        assert_eq!(line.tag(), RhymeTag::D);
        assert_eq!(line.word_color(1, &Palette::default()), Some(green));
    }

    #[test]
    fn test_remove_word() {
        let mut editor = editor(&["sol brilha"]);
        let id = editor.ids()[0];
        assert!(editor.remove_word_at(id, 0));
        assert!(!editor.remove_word_at(id, 0));
        assert_eq!(texts(&editor), vec!["brilha"]);
    }

    #[test]
    fn test_analysis_request_follows_order() {
        let mut editor = editor(&["fogo arde", "  a   chuva cai "]);
        let ids = editor.ids();
        editor.reorder(ids[1], ids[0]);
        assert_eq!(
            editor.analysis_request().lines,
            vec!["a chuva cai".to_string(), "fogo arde".to_string()]
        );
    }

    #[test]
    fn test_analysis_success_and_failure() {
        let mut editor = editor(&["a chuva cai"]);
        let (ticket, _) = editor.begin_analysis();
        assert!(editor.analysis().is_pending());
        assert!(editor.finish_analysis(ticket, Ok(fixtures::chuva())));
        assert!(editor.analysis().is_visible());
        assert!(!editor.analysis().is_pending());

        let before = texts(&editor);
        let (ticket, _) = editor.begin_analysis();
        let failure = Err(AnalysisError::Api { status: 500, message: "boom".into() });
        assert!(editor.finish_analysis(ticket, failure));

        assert_eq!(texts(&editor), before);
        assert_eq!(editor.analysis().result(), Some(&fixtures::chuva()));
        assert_eq!(editor.analysis().error(), Some("Analysis failed"));
    }

    #[test]
    fn test_failure_opens_hidden_panel() {
        let mut editor = editor(&["a chuva cai"]);
        assert!(!editor.analysis().panel_shown());

        let (ticket, _) = editor.begin_analysis();
        assert!(editor.analysis().panel_shown());
        editor.finish_analysis(ticket, Err(AnalysisError::Timeout(10)));
        assert!(editor.analysis().panel_shown());
        assert!(editor.analysis().error().is_some());

        // Hidden by the user, stays hidden until the next request
        assert!(!editor.toggle_analysis_visible());
        assert!(!editor.analysis().panel_shown());

        let (ticket, _) = editor.begin_analysis();
        editor.finish_analysis(ticket, Err(AnalysisError::Timeout(10)));
        assert!(editor.analysis().panel_shown());
        assert!(editor.analysis().result().is_none());
    }

    #[test]
    fn test_stale_analysis_dropped() {
        let mut editor = editor(&["a chuva cai"]);
        let (first, _) = editor.begin_analysis();
        let (second, _) = editor.begin_analysis();

        let mut newer = fixtures::chuva();
        newer.meter = crate::analysis::Meter::Label("newer".into());

        assert!(editor.finish_analysis(second, Ok(newer.clone())));
        assert!(!editor.finish_analysis(first, Ok(fixtures::chuva())));
        assert_eq!(editor.analysis().result(), Some(&newer));
    }

    #[test]
    fn test_toggle_keeps_result() {
        let mut editor = editor(&["a chuva cai"]);
        let (ticket, _) = editor.begin_analysis();
        editor.finish_analysis(ticket, Ok(fixtures::chuva()));

        assert!(!editor.toggle_analysis_visible());
        assert!(editor.analysis().result().is_some());
        assert!(editor.toggle_analysis_visible());

        editor.dismiss_analysis();
        assert!(editor.analysis().result().is_none());
        assert!(!editor.analysis().is_visible());
    }

    #[test]
    fn test_restore_continues_ids() {
        let editor = editor(&["a", "b", "c"]);
        let mut restored = StropheEditor::restore(editor.snapshot()).unwrap();
        assert_eq!(restored.lines(), editor.lines());
        let id = restored.add_line("d").unwrap();
        assert!(!editor.ids().contains(&id));
    }

    #[test]
    fn test_add_line_at_end_of_id_space() {
        let mut snapshot = StropheSnapshot::default();
        snapshot
            .lines
            .push(VerseLine::from_text(LineId(u64::MAX - 2), "sol", RhymeTag::A).unwrap());
        let mut editor = StropheEditor::restore(snapshot).unwrap();

        assert_eq!(editor.add_line("mar"), Some(LineId(u64::MAX - 1)));
        assert_eq!(editor.add_line("lua"), None);
        assert_eq!(editor.len(), 2);
        assert!(editor.reorder(LineId(u64::MAX - 1), LineId(u64::MAX - 2)));
    }

    #[test]
    fn test_scheme_drives_new_tags() {
        let mut editor = StropheEditor::new();
        editor.add_line("um").unwrap();
        editor.set_scheme(Some("ABBA".parse().unwrap()));
        assert_eq!(editor.lines()[0].tag(), RhymeTag::A);

        for text in ["dois", "tres", "quatro", "cinco"] {
            editor.add_line(text).unwrap();
        }
        let tags: Vec<_> = editor.lines().iter().map(VerseLine::tag).collect();
        assert_eq!(
            tags,
            vec![RhymeTag::A, RhymeTag::B, RhymeTag::B, RhymeTag::A, RhymeTag::A]
        );

        editor.set_scheme(None);
        let id = editor.add_line("seis").unwrap();
        assert_eq!(editor.line(id).unwrap().tag(), RhymeTag::B);
    }
}
