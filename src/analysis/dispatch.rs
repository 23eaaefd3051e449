// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Background analysis requests.
//!
//! The UI thread never awaits. It hands a request to the dispatcher,
//! which runs it on the tokio runtime and posts the outcome back on a
//! channel that the UI drains once per frame.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{AnalysisError, AnalysisRequest, AnalysisResult, MeterAnalyzer};
use crate::strophe::AnalysisTicket;

/// A finished request, tagged with the ticket it was issued under
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub ticket: AnalysisTicket,
    pub result: Result<AnalysisResult, AnalysisError>,
}

/// Runs analysis requests off the UI thread
pub struct AnalysisDispatcher<A: MeterAnalyzer> {
    runtime: Handle,
    analyzer: Arc<A>,
    sender: UnboundedSender<AnalysisOutcome>,
    receiver: UnboundedReceiver<AnalysisOutcome>,
    in_flight: usize,
}

impl<A: MeterAnalyzer> AnalysisDispatcher<A> {
    /// Create a dispatcher that spawns on `runtime`
    pub fn new(runtime: Handle, analyzer: A) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            runtime,
            analyzer: Arc::new(analyzer),
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Swap the analyzer (e.g. after a config reload). Requests already
    /// running finish against the old one.
    pub fn set_analyzer(&mut self, analyzer: A) {
        self.analyzer = Arc::new(analyzer);
    }

    /// Start a request; the outcome arrives through [`Self::drain`]
    pub fn submit(&mut self, ticket: AnalysisTicket, request: AnalysisRequest) {
        let analyzer = Arc::clone(&self.analyzer);
        let sender = self.sender.clone();
        self.in_flight += 1;

        tracing::debug!(ticket = ticket.0, lines = request.lines.len(), "Submitting analysis");

        self.runtime.spawn(async move {
            let result = analyzer.analyze(request).await;
            if let Err(e) = &result {
                tracing::warn!(ticket = ticket.0, error = %e, "Meter analysis failed");
            }
            // Receiver gone means the UI shut down
            let _ = sender.send(AnalysisOutcome { ticket, result });
        });
    }

    /// Collect every outcome that has arrived (non-blocking)
    pub fn drain(&mut self) -> Vec<AnalysisOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.receiver.try_recv() {
            outcomes.push(outcome);
        }
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    /// Wait for the next outcome (used by the headless CLI)
    pub async fn next(&mut self) -> Option<AnalysisOutcome> {
        let outcome = self.receiver.recv().await;
        if outcome.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        outcome
    }

    /// Number of requests submitted but not yet drained
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
