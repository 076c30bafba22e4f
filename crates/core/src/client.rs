use crate::domain::query::AskQuery;
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

// The server itself waits on a model round-trip.
const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Client side of `POST /api/ask`. Failures surface as a single
/// human-readable message, preferring the server's own wording.
#[derive(Debug, Clone)]
pub struct AskApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AskRequestBody<'a> {
    question: &'a str,
    location: &'a str,
    tone: &'a str,
}

impl AskApiClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let timeout_secs = std::env::var("ATR_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build ask client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn ask(&self, query: &AskQuery) -> anyhow::Result<String> {
        let url = format!("{}/api/ask", self.base_url.trim_end_matches('/'));
        let body = AskRequestBody {
            question: &query.question,
            location: &query.location,
            tone: query.tone.label(),
        };

        let res = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .context("ask request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read ask response body")?;
        let payload = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            anyhow::bail!("{}", failure_message(status.as_u16(), &payload));
        }

        Ok(payload
            .get("answer")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

/// User-facing message for a failed ask: a nested `error.message`, else a
/// string `error` field, else a templated line with the status code.
pub fn failure_message(status: u16, payload: &Value) -> String {
    let nested = payload
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty());
    if let Some(msg) = nested {
        return msg.to_string();
    }

    let flat = payload
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty());
    if let Some(msg) = flat {
        return msg.to_string();
    }

    format!("Request failed ({status}). Please try again.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_the_nested_error_message() {
        let payload = json!({"error": {"message": "boom", "code": "upstream"}});
        assert_eq!(failure_message(500, &payload), "boom");
    }

    #[test]
    fn falls_back_to_the_flat_error_field() {
        let payload = json!({"error": "boom"});
        assert_eq!(failure_message(500, &payload), "boom");
    }

    #[test]
    fn a_500_with_an_error_body_fails_the_session_with_that_message() {
        use crate::session::AskSession;

        let mut session = AskSession::new();
        session.set_question("what does attorney review cover?");
        session.begin_submit().unwrap();
        session.fail(failure_message(500, &json!({"error": "boom"})));

        assert_eq!(session.error(), "boom");
        assert_eq!(session.raw_answer(), "");
    }

    #[test]
    fn templates_a_message_when_the_body_is_unhelpful() {
        assert_eq!(
            failure_message(502, &Value::Null),
            "Request failed (502). Please try again."
        );
        assert_eq!(
            failure_message(500, &json!({"error": "   "})),
            "Request failed (500). Please try again."
        );
    }
}
