// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Verse lines.
//!
//! Lines are values: every edit returns a new line and the editor swaps
//! it in place of the old one. A line's id never changes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::palette::resolve_word_color;
use super::word::words_from_text;
use super::{Color, Palette, RhymeTag, WordUnit};

/// Stable identifier of a verse line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One line of a strophe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseLine {
    id: LineId,
    tag: RhymeTag,
    words: Vec<WordUnit>,
}

impl VerseLine {
    /// Build a line from raw text; `None` if the text holds no words
    pub fn from_text(id: LineId, raw: &str, tag: RhymeTag) -> Option<Self> {
        let words = words_from_text(raw);
        if words.is_empty() {
            return None;
        }
        Some(Self { id, tag, words })
    }

    /// Get id
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Get tag
    pub fn tag(&self) -> RhymeTag {
        self.tag
    }

    /// Get words in verse order
    pub fn words(&self) -> &[WordUnit] {
        &self.words
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false for a committed line
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The rhymed word (last in the line)
    pub fn rhymed_word(&self) -> Option<&WordUnit> {
        self.words.last()
    }

    /// Words joined by single spaces, as sent for analysis
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(WordUnit::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Effective fill of the word at `index`
    pub fn word_color(&self, index: usize, palette: &Palette) -> Option<Color> {
        let word = self.words.get(index)?;
        let is_last = index + 1 == self.words.len();
        Some(resolve_word_color(word, is_last, self.tag, palette))
    }

    /// Replace the word at `index` with the result of editing it.
    ///
    /// A multi-token edit splices all tokens in at `index`. Blank edits and
    /// out-of-range indexes return the line unchanged.
    pub fn with_word_text(&self, index: usize, new_text: &str) -> Self {
        let Some(replacement) = self.words.get(index).and_then(|w| w.edit(new_text)) else {
            return self.clone();
        };

        let mut words = self.words.clone();
        words.splice(index..=index, replacement);
        Self { words, ..self.clone() }
    }

    /// Set the color override of the word at `index`
    pub fn with_word_color(&self, index: usize, color: Color) -> Self {
        let mut line = self.clone();
        if let Some(word) = line.words.get_mut(index) {
            *word = word.clone().with_color(color);
        }
        line
    }

    /// Change the tag; word overrides are untouched
    pub fn with_tag(&self, tag: RhymeTag) -> Self {
        Self { tag, ..self.clone() }
    }

    /// Replace the whole word list.
    ///
    /// The list is refused when it is empty or holds a blank word. Words
    /// whose text contains whitespace are split, keeping their color.
    pub fn with_words(&self, words: Vec<WordUnit>) -> Option<Self> {
        if words.is_empty() || words.iter().any(WordUnit::is_blank) {
            return None;
        }

        let words = words
            .into_iter()
            .flat_map(|word| {
                if word.has_whitespace() {
                    word.edit(word.text()).unwrap_or_default()
                } else {
                    vec![word]
                }
            })
            .collect();
        Some(Self { words, ..self.clone() })
    }

    /// Remove the word at `index`; `None` if that would empty the line
    pub fn without_word(&self, index: usize) -> Option<Self> {
        if index >= self.words.len() || self.words.len() == 1 {
            return None;
        }
        let mut line = self.clone();
        line.words.remove(index);
        Some(line)
    }

    /// True when the line holds at least one word and every word is a
    /// single non-blank token
    pub(crate) fn is_well_formed(&self) -> bool {
        !self.words.is_empty()
            && self
                .words
                .iter()
                .all(|w| !w.is_blank() && !w.has_whitespace())
    }
}
