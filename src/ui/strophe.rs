// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Strophe display widget.
//!
//! One terminal row per verse line:
//!
//! ```text
//! >  1 [A]  FOGO   ARDE   FORTE
//! ```
//!
//! The badge is drawn in the tag's border color and every word is a chip
//! filled with its resolved color.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::strophe::{self, resolve_word_color, DragSession, Palette, VerseLine};

/// Columns taken by the marker, number and tag badge
pub const PREFIX_WIDTH: u16 = 9;

/// Convert a palette color for the terminal
pub fn to_terminal_color(color: strophe::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Readable text color on top of `fill`
fn chip_text_color(fill: strophe::Color) -> Color {
    if fill.luminance() > 140 {
        Color::Black
    } else {
        Color::White
    }
}

/// First visible row so that `selected` stays on screen
pub fn scroll_offset(selected: usize, height: u16) -> usize {
    let height = height.max(1) as usize;
    selected.saturating_sub(height - 1)
}

/// Word chip under column `col` of a rendered row, if any
pub fn word_at_column(line: &VerseLine, col: u16) -> Option<usize> {
    let mut x = PREFIX_WIDTH;
    if col < x {
        return None;
    }
    for (i, word) in line.words().iter().enumerate() {
        let width = word.display_text().chars().count() as u16 + 2;
        if col < x + width {
            return Some(i);
        }
        x += width + 1;
        if col < x {
            return None;
        }
    }
    None
}

/// Lines in the order they would have if the drag dropped now
pub fn preview_order<'a>(lines: &'a [VerseLine], drag: Option<&DragSession>) -> Vec<&'a VerseLine> {
    let mut order: Vec<&VerseLine> = lines.iter().collect();
    if let Some(drag) = drag {
        if let Some(from) = order.iter().position(|l| l.id() == drag.active()) {
            let line = order.remove(from);
            let to = drag.over_index().min(order.len());
            order.insert(to, line);
        }
    }
    order
}

/// Widget for the verse lines of one strophe
pub struct StropheWidget<'a> {
    lines: &'a [VerseLine],
    palette: &'a Palette,
    selected: Option<(usize, usize)>,
    drag: Option<&'a DragSession>,
    block: Option<Block<'a>>,
}

impl<'a> StropheWidget<'a> {
    /// Create a new strophe widget
    pub fn new(lines: &'a [VerseLine], palette: &'a Palette) -> Self {
        Self {
            lines,
            palette,
            selected: None,
            drag: None,
            block: None,
        }
    }

    /// Set the selected line and word
    pub fn selected(mut self, selection: Option<(usize, usize)>) -> Self {
        self.selected = selection;
        self
    }

    /// Show an in-progress drag
    pub fn drag(mut self, drag: Option<&'a DragSession>) -> Self {
        self.drag = drag;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for StropheWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if self.lines.is_empty() {
            Paragraph::new("No lines yet. Press 'a' to write one.")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        let order = preview_order(self.lines, self.drag);
        let focus = match (self.drag, self.selected) {
            (Some(drag), _) => drag.over_index(),
            (None, Some((line, _))) => line,
            (None, None) => 0,
        };
        let offset = scroll_offset(focus, area.height);

        let rows: Vec<Line> = order
            .iter()
            .enumerate()
            .skip(offset)
            .take(area.height as usize)
            .map(|(row, line)| {
                let dragged = self.drag.is_some_and(|d| d.active() == line.id());
                let selected_word = match self.selected {
                    Some((l, w)) if l == row && self.drag.is_none() => Some(w),
                    _ => None,
                };
                render_line(line, row, selected_word, dragged, self.palette)
            })
            .collect();

        Paragraph::new(rows).render(area, buf);
    }
}

/// Build one row
fn render_line(
    line: &VerseLine,
    row: usize,
    selected_word: Option<usize>,
    dragged: bool,
    palette: &Palette,
) -> Line<'static> {
    let marker = if dragged {
        Span::styled("≡", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
    } else if selected_word.is_some() {
        Span::styled(">", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        Span::raw(" ")
    };

    let number_style = if dragged {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let border = to_terminal_color(palette.tag_border(line.tag()));
    let mut spans = vec![
        marker,
        Span::styled(format!("{:>3} ", row + 1), number_style),
        Span::styled(
            format!("[{}]", line.tag()),
            Style::default().fg(border).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    let last = line.len().saturating_sub(1);
    for (i, word) in line.words().iter().enumerate() {
        let fill = resolve_word_color(word, i == last, line.tag(), palette);
        let mut style = Style::default()
            .bg(to_terminal_color(fill))
            .fg(chip_text_color(fill));
        if selected_word == Some(i) {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED | Modifier::REVERSED);
        }
        if dragged {
            style = style.add_modifier(Modifier::ITALIC);
        }
        spans.push(Span::styled(format!(" {} ", word.display_text()), style));
        spans.push(Span::raw(" "));
    }

    Line::from(spans)
}
