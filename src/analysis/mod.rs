// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Meter analysis round trip.
//!
//! The strophe's lines are flattened to plain text and posted to an
//! external scansion service. This module owns the wire types, the
//! response contract, the HTTP client and the background dispatcher.
//! It does no scansion itself.

pub mod client;
pub mod dispatch;
pub mod view;

pub use client::{HttpMeterClient, MeterAnalyzer};
pub use dispatch::{AnalysisDispatcher, AnalysisOutcome};
pub use view::{AnalysisView, LineView, WordView};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Analysis client errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured timeout
    #[error("Analysis timed out after {0}s")]
    Timeout(u64),

    /// Service answered with a non-success status
    #[error("Analysis service error {status}: {message}")]
    Api { status: u16, message: String },

    /// Body was not a valid analysis result
    #[error("Parse error: {0}")]
    Parse(String),

    /// Body parsed but does not line up with the request
    #[error("Contract violation: {0}")]
    Contract(String),
}

impl AnalysisError {
    /// Short message for the status line
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Timeout(_) => "Analysis failed: service did not answer in time".to_string(),
            AnalysisError::Network(_) => "Analysis failed: service unreachable".to_string(),
            _ => "Analysis failed".to_string(),
        }
    }
}

/// Request body: one string per verse line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub lines: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Dominant meter label(s)
///
/// The service answers either a single label (`"unknown"` when nothing
/// matched) or a list of labels, one per dominant line length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Meter {
    Label(String),
    Labels(Vec<String>),
}

impl Meter {
    /// Human-readable label
    pub fn label(&self) -> String {
        match self {
            Meter::Label(label) => label.clone(),
            Meter::Labels(labels) if labels.is_empty() => "unknown".to_string(),
            Meter::Labels(labels) => labels.join(", "),
        }
    }
}

/// Per-word breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDetail {
    pub word: String,
    pub syllable_breakdown: String,
    pub scansion: String,
    pub syllable_count: u32,
}

/// Per-line breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDetails {
    pub total_syllables: u32,
    pub details: Vec<WordDetail>,
}

/// Successful response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub meter: Meter,
    pub original_lines: Vec<String>,
    pub word_details: Vec<LineDetails>,
    /// Per-line stress pattern ("1" stressed, "0" unstressed)
    #[serde(default)]
    pub scansion: Vec<String>,
    /// Lines regrouped by the service to even out syllable counts
    #[serde(default)]
    pub combined_lines: Vec<String>,
}

impl AnalysisResult {
    /// Check that the result lines up with the request that produced it.
    ///
    /// The service echoes the lines it was sent, and the view pairs
    /// `word_details[i].details[j]` with the j-th token of line `i` by
    /// position. Each echoed line must therefore hold the same tokens as
    /// the sent line, and each details list one entry per token.
    pub fn check_contract(&self, request: &AnalysisRequest) -> Result<(), AnalysisError> {
        if self.original_lines.len() != request.lines.len() {
            return Err(AnalysisError::Contract(format!(
                "sent {} lines, got {} original_lines",
                request.lines.len(),
                self.original_lines.len()
            )));
        }
        if self.word_details.len() != request.lines.len() {
            return Err(AnalysisError::Contract(format!(
                "sent {} lines, got {} word_details",
                request.lines.len(),
                self.word_details.len()
            )));
        }

        let lines = request.lines.iter().zip(&self.original_lines).zip(&self.word_details);
        for (i, ((sent, echoed), details)) in lines.enumerate() {
            if !sent.split_whitespace().eq(echoed.split_whitespace()) {
                return Err(AnalysisError::Contract(format!(
                    "line {} was sent as {:?} but analyzed as {:?}",
                    i + 1,
                    sent,
                    echoed
                )));
            }
            let tokens = sent.split_whitespace().count();
            if details.details.len() != tokens {
                return Err(AnalysisError::Contract(format!(
                    "line {} has {} words but {} word details",
                    i + 1,
                    tokens,
                    details.details.len()
                )));
            }
        }

        Ok(())
    }
}

/// Error body returned by the service or its proxy
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
