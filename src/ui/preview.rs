// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Whole-poem preview.
//!
//! Every stored strophe in number order, one row per verse, words upper
//! cased and centered. Words with a color override are drawn in that
//! color; all others keep the terminal's default foreground. A blank row
//! separates strophes.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::strophe::{StropheSnapshot, VerseLine};

use super::strophe::to_terminal_color;

/// One verse as (upper-cased word, override) pairs
fn verse_words(line: &VerseLine) -> impl Iterator<Item = (String, Option<crate::strophe::Color>)> + '_ {
    line.words().iter().map(|w| (w.display_text(), w.custom_color()))
}

/// Rows of the preview, strophes separated by a blank row
pub fn preview_lines(strophes: &[StropheSnapshot]) -> Vec<Line<'static>> {
    let mut rows = Vec::new();
    for (i, strophe) in strophes.iter().enumerate() {
        if i > 0 {
            rows.push(Line::default());
        }
        for line in &strophe.lines {
            let mut spans = Vec::new();
            for (j, (text, color)) in verse_words(line).enumerate() {
                if j > 0 {
                    spans.push(Span::raw(" "));
                }
                let style = color.map_or(Style::default(), |c| Style::default().fg(to_terminal_color(c)));
                spans.push(Span::styled(text, style));
            }
            rows.push(Line::from(spans));
        }
    }
    rows
}

/// Plain-text preview, one verse per line
pub fn preview_text(strophes: &[StropheSnapshot]) -> String {
    let mut out = String::new();
    for (i, strophe) in strophes.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for line in &strophe.lines {
            let words: Vec<String> = verse_words(line).map(|(text, _)| text).collect();
            out.push_str(&words.join(" "));
            out.push('\n');
        }
    }
    out
}

/// Preview of the whole poem
pub struct PreviewWidget<'a> {
    strophes: &'a [StropheSnapshot],
    block: Option<Block<'a>>,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(strophes: &'a [StropheSnapshot]) -> Self {
        Self {
            strophes,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for PreviewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = if self.strophes.iter().all(|s| s.lines.is_empty()) {
            vec![Line::from("Nothing written yet")]
        } else {
            preview_lines(self.strophes)
        };

        let mut paragraph = Paragraph::new(rows)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        paragraph.render(area, buf);
    }
}
