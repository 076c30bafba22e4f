use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

/// Carries enough of a failed upstream exchange to debug it from logs.
#[derive(Debug, Clone)]
pub struct UpstreamDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl fmt::Display for UpstreamDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "upstream error (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for UpstreamDiagnosticsError {}
