use qna_chatbot::model::{GenerationRequest, LlmBackend, ModelChoice, SamplingParams};
use qna_chatbot::orchestrator::Orchestrator;
use qna_chatbot::prompt::SYSTEM_INSTRUCTION;
use qna_chatbot::Error;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
struct Call {
    model: String,
    prompt: String,
    params: Option<SamplingParams>,
}

/// Records what it was asked and replies with a canned runtime body.
#[derive(Clone)]
struct RecordingBackend {
    calls: Arc<Mutex<Vec<Call>>>,
    reply: Result<String, String>,
}

impl RecordingBackend {
    fn replying(text: &str) -> Self {
        Self { calls: Arc::default(), reply: Ok(text.to_string()) }
    }

    fn failing(msg: &str) -> Self {
        Self { calls: Arc::default(), reply: Err(msg.to_string()) }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmBackend for RecordingBackend {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: Option<&SamplingParams>,
    ) -> qna_chatbot::Result<Vec<u8>> {
        self.calls.lock().unwrap().push(Call {
            model: model.to_string(),
            prompt: prompt.to_string(),
            params: params.copied(),
        });
        match &self.reply {
            Ok(text) => Ok(serde_json::to_vec(&serde_json::json!({ "model": model, "response": text, "done": true })).unwrap()),
            Err(msg) => Err(Error::Generation(msg.clone())),
        }
    }
}

#[tokio::test]
async fn capital_of_france_scenario() -> anyhow::Result<()> {
    let backend = RecordingBackend::replying("The capital of France is Paris.");
    let orch = Orchestrator::new(backend.clone(), true);

    let text = orch
        .generate_response("What is the capital of France?", ModelChoice::Mistral, 0.7, 150)
        .await?;
    assert_eq!(text, "The capital of France is Paris.");

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "mistral");
    assert!(calls[0].prompt.contains(SYSTEM_INSTRUCTION));
    assert!(calls[0].prompt.contains("Question:What is the capital of France?"));
    Ok(())
}

#[tokio::test]
async fn output_is_returned_unmodified() -> anyhow::Result<()> {
    let raw = "\n  **Paris**  \n\t";
    let orch = Orchestrator::new(RecordingBackend::replying(raw), true);
    let text = orch.generate_response("q", ModelChoice::Gemma2b, 0.1, 60).await?;
    assert_eq!(text, raw);
    Ok(())
}

#[tokio::test]
async fn switching_models_routes_to_each() -> anyhow::Result<()> {
    let backend = RecordingBackend::replying("ok");
    let orch = Orchestrator::new(backend.clone(), true);

    orch.generate_response("same question", ModelChoice::Mistral, 0.7, 150).await?;
    orch.generate_response("same question", ModelChoice::Phi3Mini, 0.7, 150).await?;

    let models: Vec<_> = backend.calls().into_iter().map(|c| c.model).collect();
    assert_eq!(models, vec!["mistral", "phi3:mini"]);
    Ok(())
}

#[tokio::test]
async fn sampling_is_forwarded_or_dropped() -> anyhow::Result<()> {
    let on = RecordingBackend::replying("ok");
    Orchestrator::new(on.clone(), true)
        .generate_response("q", ModelChoice::Mistral, 0.25, 80)
        .await?;
    assert_eq!(on.calls()[0].params, Some(SamplingParams { temperature: 0.25, max_tokens: 80 }));

    let off = RecordingBackend::replying("ok");
    Orchestrator::new(off.clone(), false)
        .generate_response("q", ModelChoice::Mistral, 0.25, 80)
        .await?;
    assert_eq!(off.calls()[0].params, None);
    Ok(())
}

#[tokio::test]
async fn failures_propagate_and_later_calls_succeed() {
    let failing = Orchestrator::new(RecordingBackend::failing("model 'llama3:8b' not found"), true);
    let err = failing
        .generate_response("hello", ModelChoice::Llama3_8b, 0.7, 150)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation(ref m) if m.contains("llama3:8b")));

    let backend = RecordingBackend::replying("second try");
    let orch = Orchestrator::new(backend.clone(), true);
    let req = GenerationRequest {
        question: "hello".into(),
        model: ModelChoice::Llama3_8b,
        params: SamplingParams::default(),
    };
    assert_eq!(req.system_instruction(), SYSTEM_INSTRUCTION);
    assert_eq!(orch.ask(&req).await.unwrap().text, "second try");
    assert_eq!(orch.ask(&req).await.unwrap().text, "second try");
    assert_eq!(backend.calls().len(), 2);
    // each call carries only its own question, no history
    assert_eq!(backend.calls()[0].prompt, backend.calls()[1].prompt);
}
