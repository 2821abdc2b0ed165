use dotenvy::dotenv;
use qna_chatbot::api::{self, AppState};
use qna_chatbot::config::{Config, Settings};
use qna_chatbot::model::{ollama::OllamaBackend, ModelChoice};
use qna_chatbot::orchestrator::Orchestrator;
use qna_chatbot::telemetry;
use qna_chatbot::ui::Templates;
use std::sync::Arc;


#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
dotenv().ok();
let cfg = <Config as clap::Parser>::parse();


// logs
telemetry::init_logging();


// settings are validated before anything is served
let settings = Settings::from_config(&cfg)?;
tracing::info!(trace = ?settings.trace, forward_sampling = settings.forward_sampling, "settings loaded");
let metrics = telemetry::install_metrics()?;


// ollama backend
let backend = OllamaBackend::new(&settings.ollama_base_url, settings.request_timeout)?;
match backend.list_local_models().await {
    Ok(local) => {
        let missing: Vec<_> = ModelChoice::ALL
            .into_iter()
            .filter(|m| !local.iter().any(|l| l == m.id() || l == &format!("{}:latest", m.id())))
            .map(ModelChoice::id)
            .collect();
        if !missing.is_empty() {
            tracing::warn!(?missing, "models not pulled locally; requests for them will fail");
        }
    }
    Err(e) => tracing::warn!(error = %e, url = backend.base_url(), "could not reach ollama at startup"),
}


let state = AppState {
    orchestrator: Orchestrator::new(backend, settings.forward_sampling),
    templates: Arc::new(Templates::new()?),
    trace: Arc::new(settings.trace.clone()),
    metrics: Some(metrics),
};
let app = api::routes(state);
let addr = settings.bind_addr;


tracing::info!(%addr, "listening");
axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
    .with_graceful_shutdown(async { tokio::signal::ctrl_c().await.ok(); })
    .await?;
Ok(())
}
