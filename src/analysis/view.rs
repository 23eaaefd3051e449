// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Read-only display model of an analysis result.

use std::fmt::Write;

use super::AnalysisResult;

/// One word's breakdown, as displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordView {
    /// Token of the original line at this position
    pub word: String,
    pub syllable_breakdown: String,
    pub scansion: String,
    pub syllable_count: u32,
}

/// One analyzed line, as displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineView {
    /// 1-based line number
    pub number: usize,
    pub text: String,
    pub total_syllables: u32,
    pub words: Vec<WordView>,
}

/// Display model for the analysis panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisView {
    pub meter: String,
    pub lines: Vec<LineView>,
}

impl AnalysisView {
    /// Build the view.
    ///
    /// Details are paired with the tokens of each original line by
    /// position. The result must have passed
    /// [`AnalysisResult::check_contract`]; on a result that did not, the
    /// pairing stops at the shorter side.
    pub fn from_result(result: &AnalysisResult) -> Self {
        let lines = result
            .original_lines
            .iter()
            .zip(&result.word_details)
            .enumerate()
            .map(|(i, (text, details))| LineView {
                number: i + 1,
                text: text.clone(),
                total_syllables: details.total_syllables,
                words: text
                    .split_whitespace()
                    .zip(&details.details)
                    .map(|(token, detail)| WordView {
                        word: token.to_string(),
                        syllable_breakdown: detail.syllable_breakdown.clone(),
                        scansion: detail.scansion.clone(),
                        syllable_count: detail.syllable_count,
                    })
                    .collect(),
            })
            .collect();

        Self {
            meter: result.meter.label(),
            lines,
        }
    }

    /// Plain-text rendering
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Meter: {}", self.meter);
        for line in &self.lines {
            let _ = writeln!(
                out,
                "Line {}: {} (total syllables: {})",
                line.number, line.text, line.total_syllables
            );
            for word in &line.words {
                let _ = writeln!(
                    out,
                    "  {:<16} {} ({})",
                    word.word, word.syllable_breakdown, word.scansion
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;

    #[test]
    fn test_view_follows_line_tokens() {
        let view = AnalysisView::from_result(&fixtures::chuva());
        assert_eq!(view.meter, "unknown");
        assert_eq!(view.lines.len(), 1);

        let line = &view.lines[0];
        assert_eq!(line.number, 1);
        assert_eq!(line.total_syllables, 4);
        let words: Vec<_> = line.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["a", "chuva", "cai"]);
        assert_eq!(line.words[1].syllable_breakdown, "chu-va");
        assert_eq!(line.words[1].scansion, "10");
    }

    #[test]
    fn test_word_taken_from_line_not_detail() {
        let mut result = fixtures::chuva();
        // Service normalizes case and punctuation in its own "word" field
        result.word_details[0].details[1].word = "CHUVA".to_string();
        let view = AnalysisView::from_result(&result);
        assert_eq!(view.lines[0].words[1].word, "chuva");
    }

    #[test]
    fn test_text_rendering() {
        let text = AnalysisView::from_result(&fixtures::chuva()).to_text();
        assert!(text.starts_with("Meter: unknown\n"));
        assert!(text.contains("Line 1: a chuva cai (total syllables: 4)"));
        assert!(text.contains("chu-va (10)"));
        assert_eq!(text.lines().count(), 5);
    }
}
