use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atr_core::domain::query::{AskQuery, Tone, DEFAULT_LOCATION};
use atr_core::llm::openai::OpenAiClient;
use atr_core::llm::AnswerClient;
use atr_core::session::MIN_QUESTION_CHARS;

const SHORT_QUESTION_ERROR: &str =
    "Please ask a more detailed question so I can give a useful answer.";
const MISSING_KEY_ERROR: &str = "Missing OPENAI_API_KEY. Add it to .env and restart the server.";
const UPSTREAM_ERROR: &str = "Something went wrong while generating the response.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = atr_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // A missing credential keeps the route up; every ask then reports the fix.
    let llm: Option<Arc<OpenAiClient>> = match OpenAiClient::from_settings(&settings) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::error!(error = %e, "OPENAI_API_KEY missing; starting API in degraded mode");
            None
        }
    };

    let state = AppState { llm };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/ask", post(ask))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    llm: Option<Arc<OpenAiClient>>,
}

#[derive(Debug, Deserialize)]
struct AskRequestBody {
    #[serde(default)]
    question: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    tone: Option<String>,
}

#[derive(Debug, Serialize)]
struct AskResponseBody {
    answer: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn ask(
    State(state): State<AppState>,
    Json(body): Json<AskRequestBody>,
) -> Result<Json<AskResponseBody>, (StatusCode, Json<ErrorBody>)> {
    let question = body.question.trim().to_string();
    if question.chars().count() < MIN_QUESTION_CHARS {
        return Err(reject(StatusCode::BAD_REQUEST, SHORT_QUESTION_ERROR));
    }

    let Some(llm) = &state.llm else {
        return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, MISSING_KEY_ERROR));
    };

    let location = body
        .location
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    let tone = body.tone.as_deref().map(Tone::from_label).unwrap_or_default();

    let query = AskQuery::new(question, location, tone);

    match llm.generate_answer(&query).await {
        Ok(answer) => Ok(Json(AskResponseBody { answer })),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "answer generation failed");
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_ERROR))
        }
    }
}

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &atr_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
