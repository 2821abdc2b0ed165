use crate::error::Result;
use crate::model::{GenerationRequest, GenerationResult, LlmBackend, ModelChoice, SamplingParams};
use crate::prompt::{extract_text, render_prompt, ChatPrompt};
use std::time::Instant;

/// Turns a question into generated text: render the prompt, call the model, extract text.
///
/// Holds no per-request state; every call is independent of the ones before it.
#[derive(Clone)]
pub struct Orchestrator<B> {
    backend: B,
    forward_sampling: bool,
}

impl<B: LlmBackend> Orchestrator<B> {
    /// With `forward_sampling` off, temperature and max_tokens are accepted but not
    /// sent, and the runtime uses the model's own defaults.
    pub fn new(backend: B, forward_sampling: bool) -> Self {
        Self { backend, forward_sampling }
    }

    pub async fn generate_response(
        &self,
        question: &str,
        model: ModelChoice,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let params = SamplingParams { temperature, max_tokens };
        let prompt = render_prompt(question);
        let body = self.invoke_model(model, &prompt, &params).await?;
        extract_text(&body)
    }

    pub async fn ask(&self, req: &GenerationRequest) -> Result<GenerationResult> {
        let text = self
            .generate_response(&req.question, req.model, req.params.temperature, req.params.max_tokens)
            .await?;
        Ok(GenerationResult { text })
    }

    async fn invoke_model(
        &self,
        model: ModelChoice,
        prompt: &ChatPrompt,
        params: &SamplingParams,
    ) -> Result<Vec<u8>> {
        let forwarded = self.forward_sampling.then_some(params);
        let started = Instant::now();
        let res = self.backend.generate(model.id(), &prompt.to_text(), forwarded).await;
        metrics::histogram!("qna_generation_seconds", "model" => model.id())
            .record(started.elapsed().as_secs_f64());
        res
    }
}
