use crate::config::Settings;
use crate::domain::query::{AskQuery, Tone};
use crate::llm::error::UpstreamDiagnosticsError;
use crate::llm::{AnswerClient, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-5.2";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    async fn create_response(
        &self,
        req: CreateResponseRequest,
    ) -> anyhow::Result<CreateResponseResponse> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", self.api_key);
        headers.insert("authorization", HeaderValue::from_str(&bearer)?);

        let url = format!("{}/v1/responses", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(UpstreamDiagnosticsError {
                provider: Provider::OpenAi,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        serde_json::from_str::<CreateResponseResponse>(&text)
            .with_context(|| format!("failed to decode OpenAI response JSON: {text}"))
    }

    fn tone_guide(tone: Tone) -> &'static str {
        match tone {
            Tone::PlainEnglish => {
                "Use simple language. Short sentences. Explain jargon clearly."
            }
            Tone::InvestorLens => {
                "Analytical, strategic, numbers-aware. Discuss risk, leverage, and downside protection."
            }
            Tone::Professional => {
                "Professional, confident, lightly witty. Clear bullets. Practical guidance without fluff."
            }
        }
    }

    fn system_prompt(tone: Tone) -> String {
        [
            "You are \"Ask the Realtor\", a professional real estate advisor with New Jersey market awareness.",
            "",
            "STYLE & TONE",
            &format!("- {}", Self::tone_guide(tone)),
            "- Calm, credible, and personable.",
            "- Lightly savvy when appropriate, never sarcastic.",
            "- No emojis in answers.",
            "",
            "CONTENT RULES",
            "- Educational guidance only (not legal or financial advice).",
            "- If legal issues arise, suggest consulting a NJ real estate attorney.",
            "- If financing specifics arise, suggest consulting a licensed loan officer.",
            "- Avoid absolute statements; explain trade-offs.",
            "",
            "FORMAT EVERY RESPONSE EXACTLY LIKE THIS:",
            "",
            "Quick Answer",
            "- 2\u{2013}4 crisp bullets that directly answer the question.",
            "",
            "What to Watch Out For",
            "- 3\u{2013}5 bullets highlighting common mistakes, risks, or blind spots.",
            "",
            "Smart Next Steps",
            "- 3\u{2013}5 practical, realistic actions the user can take next.",
            "",
            "Keep it skimmable. Use bullet points. Be specific.",
        ]
        .join("\n")
    }

    fn user_prompt(query: &AskQuery) -> String {
        format!(
            "Location: {}\nTone preference: {}\n\nQuestion:\n{}",
            query.location, query.tone, query.question
        )
    }

    fn response_text(res: &CreateResponseResponse) -> String {
        let mut out = String::new();
        for item in &res.output {
            let OutputItem::Message { content } = item else {
                continue;
            };
            for part in content {
                let ContentPart::OutputText { text } = part else {
                    continue;
                };
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }
}

#[async_trait::async_trait]
impl AnswerClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn generate_answer(&self, query: &AskQuery) -> anyhow::Result<String> {
        let req = CreateResponseRequest {
            model: self.model.clone(),
            input: vec![
                InputMessage {
                    role: "system",
                    content: Self::system_prompt(query.tone),
                },
                InputMessage {
                    role: "user",
                    content: Self::user_prompt(query),
                },
            ],
        };

        let res = self.create_response(req).await?;
        Ok(Self::response_text(&res))
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateResponseRequest {
    model: String,
    input: Vec<InputMessage>,
}

#[derive(Debug, Clone, Serialize)]
struct InputMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateResponseResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}


#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum OutputItem {
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },

    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "output_text")]
    OutputText {
        #[serde(default)]
        text: String,
    },

    #[serde(other)]
    Unknown,
}
