// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! verso: a terminal editor for rhyme-tagged strophes.
//!
//! Lines are written as sequences of word chips, tagged with a rhyme
//! letter (A to D), reordered by drag and drop, and sent to an external
//! scansion service for meter analysis.

pub mod analysis;
pub mod config;
pub mod store;
pub mod strophe;
pub mod ui;

pub use analysis::{AnalysisError, AnalysisRequest, AnalysisResult, AnalysisView, HttpMeterClient};
pub use config::AppConfig;
pub use store::StropheStore;
pub use strophe::{LineId, RhymeTag, StropheEditor, StropheSnapshot, VerseLine, WordUnit};
