// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! HTTP client for the scansion service.

use std::future::Future;
use std::time::Duration;

use super::{AnalysisError, AnalysisRequest, AnalysisResult, ErrorBody};

/// Default service endpoint
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/analyze";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const USER_AGENT: &str = concat!("verso/", env!("CARGO_PKG_VERSION"));

/// Something that can analyze verse lines.
///
/// Implementations must return a result that already passed
/// [`AnalysisResult::check_contract`] for the given request.
pub trait MeterAnalyzer: Send + Sync + 'static {
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send;
}

/// Analysis over HTTP: `POST {"lines": [...]}` to the endpoint
#[derive(Debug, Clone)]
pub struct HttpMeterClient {
    http_client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
}

impl HttpMeterClient {
    /// Create a client for an endpoint
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, AnalysisError> {
        let timeout_secs = timeout_secs.max(1);
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            timeout_secs,
        })
    }

    /// Client for the default local service
    pub fn local() -> Result<Self, AnalysisError> {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS)
    }

    /// Get endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get timeout in seconds
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    async fn post(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        tracing::debug!(url = %self.endpoint, lines = request.lines.len(), "Requesting meter analysis");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let result: AnalysisResult = response
            .json()
            .await
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        result.check_contract(&request)?;

        tracing::info!(
            lines = result.original_lines.len(),
            meter = %result.meter.label(),
            "Meter analysis successful"
        );

        Ok(result)
    }

    fn transport_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::Timeout(self.timeout_secs)
        } else {
            AnalysisError::Network(e.to_string())
        }
    }
}

impl MeterAnalyzer for HttpMeterClient {
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send {
        let client = self.clone();
        async move { client.post(request).await }
    }
}
