// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Word chips inside a verse line.

use serde::{Deserialize, Serialize};

use super::Color;

/// One word of a verse line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordUnit {
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_color: Option<Color>,
}

impl WordUnit {
    /// Create a word with no color override
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            custom_color: None,
        }
    }

    /// Get text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text as shown on a chip
    pub fn display_text(&self) -> String {
        self.text.to_uppercase()
    }

    /// Get the explicit color override, if any
    pub fn custom_color(&self) -> Option<Color> {
        self.custom_color
    }

    /// Set the override. Setting a color equal to the inherited one
    /// still counts as an override.
    pub fn with_color(mut self, color: Color) -> Self {
        self.custom_color = Some(color);
        self
    }

    /// Apply an edit to this word.
    ///
    /// Returns `None` when the edit trims to nothing (the word keeps its
    /// old text). Otherwise returns the replacement words: one per
    /// whitespace-separated token, each carrying this word's override.
    pub fn edit(&self, new_text: &str) -> Option<Vec<WordUnit>> {
        let words: Vec<WordUnit> = split_tokens(new_text)
            .map(|token| WordUnit {
                text: token.to_string(),
                custom_color: self.custom_color,
            })
            .collect();

        if words.is_empty() {
            None
        } else {
            Some(words)
        }
    }

    /// True when the word's text is blank
    pub(crate) fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// True when the text holds internal whitespace
    pub(crate) fn has_whitespace(&self) -> bool {
        self.text.chars().any(char::is_whitespace)
    }
}

/// Split raw input on runs of whitespace, dropping empty tokens
pub fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split_whitespace()
}

/// Build uncolored words from raw input
pub fn words_from_text(raw: &str) -> Vec<WordUnit> {
    split_tokens(raw).map(WordUnit::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_single_trims() {
        let word = WordUnit::new("sol");
        let edited = word.edit("  lua ").unwrap();
        assert_eq!(edited, vec![WordUnit::new("lua")]);
    }

    #[test]
    fn test_edit_empty_rejected() {
        let word = WordUnit::new("sol");
        assert!(word.edit("").is_none());
        assert!(word.edit("   \t").is_none());
        assert_eq!(word.text(), "sol");
    }

    #[test]
    fn test_edit_split_inherits_color() {
        let red = Color::rgb(255, 0, 0);
        let word = WordUnit::new("sol").with_color(red);
        let edited = word.edit("sol  forte").unwrap();
        assert_eq!(edited.len(), 2);
        assert_eq!(edited[0].text(), "sol");
        assert_eq!(edited[1].text(), "forte");
        assert!(edited.iter().all(|w| w.custom_color() == Some(red)));
    }

    #[test]
    fn test_words_from_text() {
        let words = words_from_text("  fogo   arde\tforte ");
        let texts: Vec<_> = words.iter().map(|w| w.text()).collect();
        assert_eq!(texts, vec!["fogo", "arde", "forte"]);
        assert!(words.iter().all(|w| w.custom_color().is_none()));
        assert!(words_from_text("   ").is_empty());
    }

    #[test]
    fn test_display_text_uppercases() {
        assert_eq!(WordUnit::new("coração").display_text(), "CORAÇÃO");
    }

    #[test]
    fn test_serde_shape() {
        let plain = serde_json::to_value(WordUnit::new("mar")).unwrap();
        assert_eq!(plain, serde_json::json!({ "text": "mar" }));

        let colored = WordUnit::new("mar").with_color(Color::rgb(0, 0, 255));
        let value = serde_json::to_value(&colored).unwrap();
        assert_eq!(value, serde_json::json!({ "text": "mar", "customColor": "#0000ff" }));
    }
}
