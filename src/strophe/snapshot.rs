// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Serializable form of a strophe.
//!
//! ```yaml
//! rhymeScheme: ABAB
//! lines:
//!   - id: 0
//!     tag: A
//!     words:
//!       - text: fogo
//!       - text: forte
//!         customColor: "#dc2626"
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{LineId, RhymeScheme, VerseLine};

/// Errors reading or validating a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to parse snapshot YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate line id {0}")]
    DuplicateId(LineId),

    #[error("Line {0} has an empty or malformed word list")]
    MalformedLine(LineId),

    #[error("Line id {0} leaves no room for new lines")]
    IdSpaceExhausted(LineId),
}

/// Plain-data copy of a strophe's lines
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StropheSnapshot {
    #[serde(default)]
    pub lines: Vec<VerseLine>,

    #[serde(default, rename = "rhymeScheme", skip_serializing_if = "Option::is_none")]
    pub rhyme_scheme: Option<RhymeScheme>,
}

impl StropheSnapshot {
    /// Parse from YAML, validating line invariants
    pub fn from_yaml(yaml: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_yaml::from_str(yaml)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, SnapshotError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse from JSON, validating line invariants
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check unique ids, well-formed word lists and room for a next id.
    ///
    /// `u64::MAX` is never a valid id: the editor hands out the id after
    /// the largest stored one.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::new();
        for line in &self.lines {
            if line.id().0 == u64::MAX {
                return Err(SnapshotError::IdSpaceExhausted(line.id()));
            }
            if !seen.insert(line.id()) {
                return Err(SnapshotError::DuplicateId(line.id()));
            }
            if !line.is_well_formed() {
                return Err(SnapshotError::MalformedLine(line.id()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strophe::{Color, RhymeTag, StropheEditor};

    fn sample() -> StropheEditor {
        let mut editor = StropheEditor::new();
        let a = editor.add_line("fogo arde forte").unwrap();
        let b = editor.add_line("sol brilha").unwrap();
        editor.add_line("a chuva cai").unwrap();
        editor.update_word_color_at(a, 1, Color::rgb(0x12, 0x34, 0x56));
        editor.update_tag_at(b, RhymeTag::D);
        editor.reorder(a, b);
        editor
    }

    #[test]
    fn test_yaml_round_trip() {
        let editor = sample();
        let yaml = editor.snapshot().to_yaml().unwrap();
        let restored = StropheEditor::restore(StropheSnapshot::from_yaml(&yaml).unwrap()).unwrap();
        assert_eq!(restored.lines(), editor.lines());
        assert_eq!(restored.ids(), editor.ids());
    }

    #[test]
    fn test_json_shape() {
        let mut editor = StropheEditor::new();
        let id = editor.add_line("sol mar").unwrap();
        editor.update_word_color_at(id, 0, Color::rgb(255, 0, 0));

        let value: serde_json::Value =
            serde_json::from_str(&editor.snapshot().to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "lines": [{
                    "id": 0,
                    "tag": "A",
                    "words": [
                        { "text": "sol", "customColor": "#ff0000" },
                        { "text": "mar" }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
lines:
  - id: 3
    tag: A
    words: [{ text: sol }]
  - id: 3
    tag: B
    words: [{ text: mar }]
"#;
        assert!(matches!(
            StropheSnapshot::from_yaml(yaml),
            Err(SnapshotError::DuplicateId(LineId(3)))
        ));
    }

    #[test]
    fn test_malformed_lines_rejected() {
        let empty = "lines:\n  - id: 1\n    tag: A\n    words: []\n";
        assert!(matches!(
            StropheSnapshot::from_yaml(empty),
            Err(SnapshotError::MalformedLine(LineId(1)))
        ));

        let spaced = r#"{"lines":[{"id":2,"tag":"B","words":[{"text":"sol mar"}]}]}"#;
        assert!(matches!(
            StropheSnapshot::from_json(spaced),
            Err(SnapshotError::MalformedLine(LineId(2)))
        ));
    }

    #[test]
    fn test_max_id_rejected() {
        let yaml = "lines:\n  - id: 18446744073709551615\n    tag: A\n    words: [{ text: sol }]\n";
        assert!(matches!(
            StropheSnapshot::from_yaml(yaml),
            Err(SnapshotError::IdSpaceExhausted(LineId(u64::MAX)))
        ));

        let mut snapshot = StropheEditor::new().snapshot();
        snapshot.lines.push(VerseLine::from_text(LineId(u64::MAX), "sol", RhymeTag::A).unwrap());
        assert!(matches!(
            StropheEditor::restore(snapshot),
            Err(SnapshotError::IdSpaceExhausted(_))
        ));
    }

    #[test]
    fn test_rhyme_scheme_persisted() {
        let yaml = "rhymeScheme: aabb\nlines:\n  - id: 0\n    tag: A\n    words: [{ text: sol }]\n";
        let mut editor = StropheEditor::restore(StropheSnapshot::from_yaml(yaml).unwrap()).unwrap();
        assert_eq!(editor.scheme().map(ToString::to_string).as_deref(), Some("AABB"));

        let id = editor.add_line("mar").unwrap();
        assert_eq!(editor.line(id).unwrap().tag(), RhymeTag::A);

        let written = editor.snapshot().to_yaml().unwrap();
        assert!(written.contains("rhymeScheme: AABB"));

        let bad = "rhymeScheme: XYZ\nlines: []\n";
        assert!(matches!(StropheSnapshot::from_yaml(bad), Err(SnapshotError::Yaml(_))));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let yaml = "lines:\n  - id: 1\n    tag: E\n    words: [{ text: sol }]\n";
        assert!(matches!(StropheSnapshot::from_yaml(yaml), Err(SnapshotError::Yaml(_))));
    }

    #[test]
    fn test_empty_document() {
        let snapshot = StropheSnapshot::from_yaml("{}").unwrap();
        assert!(snapshot.lines.is_empty());
    }
}
