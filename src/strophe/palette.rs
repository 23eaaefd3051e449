// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Colors and the tag→color mapping.
//!
//! Word chips are filled either with an explicit override or with a
//! color inherited from the line: the rhymed (last) word inherits the
//! fill of the line's rhyme tag, every other word inherits the default
//! fill. [`resolve_word_color`] is the only place that rule lives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::{RhymeTag, WordUnit};

/// An RGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a color from components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness (0-255), used to pick readable text on a fill
    pub fn luminance(&self) -> u8 {
        let l = 0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64;
        l.round().clamp(0.0, 255.0) as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error parsing a hex color
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}: expected #rgb or #rrggbb")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|d| d * 17);
                Ok(Self::rgb(
                    digit(0).map_err(|_| err())?,
                    digit(1).map_err(|_| err())?,
                    digit(2).map_err(|_| err())?,
                ))
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                Ok(Self::rgb(
                    byte(0).map_err(|_| err())?,
                    byte(2).map_err(|_| err())?,
                    byte(4).map_err(|_| err())?,
                ))
            }
            _ => Err(err()),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fill colors for the rhymed word, by tag (red-600, blue-600, lime-600, yellow-600)
pub const TAG_FILLS: [Color; 4] = [
    Color::rgb(0xdc, 0x26, 0x26),
    Color::rgb(0x25, 0x63, 0xeb),
    Color::rgb(0x65, 0xa3, 0x0d),
    Color::rgb(0xca, 0x8a, 0x04),
];

/// Border colors for the tag badge (the -500 shades)
pub const TAG_BORDERS: [Color; 4] = [
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0x3b, 0x82, 0xf6),
    Color::rgb(0x84, 0xcc, 0x16),
    Color::rgb(0xea, 0xb3, 0x08),
];

/// Fill for a label outside the tag alphabet
pub const FALLBACK_FILL: Color = Color::rgb(0x25, 0x63, 0xeb);

/// Border for a label outside the tag alphabet
pub const FALLBACK_BORDER: Color = Color::rgb(0xd1, 0xd5, 0xdb);

/// Fill for words that are not rhymed and carry no override
pub const DEFAULT_WORD_FILL: Color = Color::rgb(0xe5, 0xe7, 0xeb);

/// Color table used to render a strophe
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    tag_fills: [Color; 4],
    tag_borders: [Color; 4],
    default_fill: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            tag_fills: TAG_FILLS,
            tag_borders: TAG_BORDERS,
            default_fill: DEFAULT_WORD_FILL,
        }
    }
}

impl Palette {
    /// Override the fill of one tag
    pub fn with_tag_fill(mut self, tag: RhymeTag, color: Color) -> Self {
        self.tag_fills[tag.index()] = color;
        self
    }

    /// Override the default word fill
    pub fn with_default_fill(mut self, color: Color) -> Self {
        self.default_fill = color;
        self
    }

    /// Fill for a tag
    pub fn tag_fill(&self, tag: RhymeTag) -> Color {
        self.tag_fills[tag.index()]
    }

    /// Border for a tag
    pub fn tag_border(&self, tag: RhymeTag) -> Color {
        self.tag_borders[tag.index()]
    }

    /// Fill for a raw tag label; unknown labels get [`FALLBACK_FILL`]
    pub fn fill_for_label(&self, label: &str) -> Color {
        label
            .parse::<RhymeTag>()
            .map(|tag| self.tag_fill(tag))
            .unwrap_or(FALLBACK_FILL)
    }

    /// Border for a raw tag label; unknown labels get [`FALLBACK_BORDER`]
    pub fn border_for_label(&self, label: &str) -> Color {
        label
            .parse::<RhymeTag>()
            .map(|tag| self.tag_border(tag))
            .unwrap_or(FALLBACK_BORDER)
    }

    /// Fill for non-rhymed words
    pub fn default_fill(&self) -> Color {
        self.default_fill
    }
}

/// Effective fill of a word.
///
/// An override always wins. Otherwise the last word of a line takes the
/// tag's fill and every other word takes the default fill.
pub fn resolve_word_color(word: &WordUnit, is_last: bool, tag: RhymeTag, palette: &Palette) -> Color {
    match (word.custom_color(), is_last) {
        (Some(color), _) => color,
        (None, true) => palette.tag_fill(tag),
        (None, false) => palette.default_fill(),
    }
}
