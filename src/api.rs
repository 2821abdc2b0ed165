use crate::{
    config::TraceSettings,
    error::Error,
    model::{GenerationRequest, LlmBackend, ModelChoice, SamplingParams, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE},
    orchestrator::Orchestrator,
    telemetry::record_request,
    ui::{Output, Page, Templates, FALLBACK_MESSAGE},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::Instrument;

#[derive(Clone)]
pub struct AppState<B> {
    pub orchestrator: Orchestrator<B>,
    pub templates: Arc<Templates>,
    pub trace: Arc<TraceSettings>,
    pub metrics: Option<PrometheusHandle>,
}

/// Fields posted by the HTML form. Anything missing falls back to the form defaults.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AskForm {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i64>,
    pub question: String,
}

#[derive(Deserialize)]
pub struct AskReq {
    pub question: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i64>,
}

#[derive(Serialize)]
pub struct AskResp {
    pub answer: String,
    pub model: ModelChoice,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn routes<B: LlmBackend + Clone>(state: AppState<B>) -> Router {
    Router::new()
        .route("/", get(index::<B>).post(submit::<B>))
        .route("/v1/ask", post(ask_json::<B>))
        .route("/v1/models", get(list_models))
        .route("/healthz", get(|| async { "ok" }))
        .route("/metrics", get(render_metrics::<B>))
        .with_state(state)
}

fn parse_model(raw: Option<&str>) -> Result<ModelChoice, Error> {
    raw.map_or(Ok(ModelChoice::default()), str::parse)
}

fn sampling(temperature: Option<f32>, max_tokens: Option<i64>) -> SamplingParams {
    SamplingParams::clamped(
        temperature.unwrap_or(DEFAULT_TEMPERATURE),
        max_tokens.unwrap_or(i64::from(DEFAULT_MAX_TOKENS)),
    )
}

/// Runs one submission. `Ok(None)` means the question was empty and nothing was sent.
async fn answer<B: LlmBackend>(
    state: &AppState<B>,
    question: &str,
    model: ModelChoice,
    params: SamplingParams,
) -> Result<Option<String>, Error> {
    if question.trim().is_empty() {
        record_request(model.id(), "fallback");
        return Ok(None);
    }

    let req = GenerationRequest { question: question.to_string(), model, params };
    let span = if state.trace.enabled {
        tracing::info_span!("ask", model = model.id(), project = %state.trace.project)
    } else {
        tracing::Span::none()
    };

    async {
        tracing::debug!(question = %req.question, params = ?req.params, "submitting question");
        match state.orchestrator.ask(&req).await {
            Ok(res) => {
                record_request(model.id(), "ok");
                tracing::info!(chars = res.text.len(), "answer ready");
                Ok(Some(res.text))
            }
            Err(e) => {
                record_request(model.id(), "error");
                tracing::warn!(error = %e, "generation failed");
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn index<B: LlmBackend + Clone>(State(state): State<AppState<B>>) -> Response {
    render_page(&state, StatusCode::OK, &Page::default())
}

async fn submit<B: LlmBackend + Clone>(
    State(state): State<AppState<B>>,
    Form(form): Form<AskForm>,
) -> Response {
    let params = sampling(form.temperature, form.max_tokens);
    let mut page = Page { params, question: form.question, ..Page::default() };

    let model = match parse_model(form.model.as_deref()) {
        Ok(m) => m,
        Err(e) => {
            page.output = Output::Failure(e.to_string());
            return render_page(&state, e.status(), &page);
        }
    };
    page.model = model;

    let status = match answer(&state, &page.question, model, params).await {
        Ok(Some(text)) => {
            page.output = Output::Answer(text);
            StatusCode::OK
        }
        Ok(None) => StatusCode::OK,
        Err(e) => {
            page.output = Output::Failure(e.to_string());
            e.status()
        }
    };
    render_page(&state, status, &page)
}

fn render_page<B>(state: &AppState<B>, status: StatusCode, page: &Page) -> Response {
    match state.templates.render(page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "render page");
            e.into_response()
        }
    }
}

async fn ask_json<B: LlmBackend + Clone>(
    State(state): State<AppState<B>>,
    Json(req): Json<AskReq>,
) -> Result<Json<AskResp>, Error> {
    let model = parse_model(req.model.as_deref())?;
    let params = sampling(req.temperature, req.max_tokens);
    let resp = match answer(&state, &req.question, model, params).await? {
        Some(answer) => AskResp { answer, model, fallback: false },
        None => AskResp { answer: FALLBACK_MESSAGE.to_string(), model, fallback: true },
    };
    Ok(Json(resp))
}

async fn list_models() -> Json<serde_json::Value> {
    let models: Vec<_> = ModelChoice::ALL
        .into_iter()
        .map(|m| json!({ "id": m.id(), "label": m.label() }))
        .collect();
    Json(json!({ "models": models }))
}

async fn render_metrics<B: LlmBackend + Clone>(State(state): State<AppState<B>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
