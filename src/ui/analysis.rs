// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Meter analysis panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::analysis::AnalysisView;

/// Widget showing the last analysis and the state of the next one
pub struct AnalysisWidget<'a> {
    view: Option<&'a AnalysisView>,
    error: Option<&'a str>,
    pending: bool,
    block: Option<Block<'a>>,
}

impl<'a> AnalysisWidget<'a> {
    pub fn new(view: Option<&'a AnalysisView>) -> Self {
        Self {
            view,
            error: None,
            pending: false,
            block: None,
        }
    }

    /// Inline error from the last failed request
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    /// A request is in flight
    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::new();

        if self.pending {
            lines.push(Line::from(Span::styled(
                "Analyzing...",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            )));
        }
        if let Some(error) = self.error {
            lines.push(Line::from(Span::styled(
                format!("{} (press r to retry)", error),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }

        let Some(view) = self.view else {
            if lines.is_empty() {
                lines.push(Line::from(Span::styled(
                    "No analysis. Press r to analyze the meter.",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            return lines;
        };

        lines.push(Line::from(vec![
            Span::styled("Meter: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                view.meter.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]));

        for line in &view.lines {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}. ", line.number),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(line.text.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  ({} syllables)", line.total_syllables),
                    Style::default().fg(Color::Cyan),
                ),
            ]));
            for word in &line.words {
                lines.push(Line::from(vec![
                    Span::raw(format!("   {:<14}", word.word.to_uppercase())),
                    Span::styled(
                        format!("{:<20}", word.syllable_breakdown),
                        Style::default().fg(Color::Green),
                    ),
                    Span::styled(word.scansion.clone(), Style::default().fg(Color::Magenta)),
                ]));
            }
        }

        lines
    }
}

impl Widget for AnalysisWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines();
        let mut paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        paragraph.render(area, buf);
    }
}
