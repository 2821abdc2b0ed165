use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 50..=300;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// Open-source models offered in the model picker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "gemma:2b")]
    Gemma2b,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "llama2:7b")]
    Llama2_7b,
    #[serde(rename = "llama3:8b")]
    Llama3_8b,
    #[serde(rename = "phi3:mini")]
    Phi3Mini,
    #[serde(rename = "dolphin-mixtral")]
    DolphinMixtral,
    #[serde(rename = "openchat:7b")]
    OpenChat7b,
    #[serde(rename = "neural-chat")]
    NeuralChat,
    #[serde(rename = "starcoder2:3b")]
    StarCoder2_3b,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 9] = [
        ModelChoice::Gemma2b,
        ModelChoice::Mistral,
        ModelChoice::Llama2_7b,
        ModelChoice::Llama3_8b,
        ModelChoice::Phi3Mini,
        ModelChoice::DolphinMixtral,
        ModelChoice::OpenChat7b,
        ModelChoice::NeuralChat,
        ModelChoice::StarCoder2_3b,
    ];

    /// Identifier understood by the model runtime.
    pub fn id(self) -> &'static str {
        match self {
            ModelChoice::Gemma2b => "gemma:2b",
            ModelChoice::Mistral => "mistral",
            ModelChoice::Llama2_7b => "llama2:7b",
            ModelChoice::Llama3_8b => "llama3:8b",
            ModelChoice::Phi3Mini => "phi3:mini",
            ModelChoice::DolphinMixtral => "dolphin-mixtral",
            ModelChoice::OpenChat7b => "openchat:7b",
            ModelChoice::NeuralChat => "neural-chat",
            ModelChoice::StarCoder2_3b => "starcoder2:3b",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModelChoice::Gemma2b => "Google Gemma, lightweight",
            ModelChoice::Mistral => "Mistral, fast and accurate small model",
            ModelChoice::Llama2_7b => "Meta LLaMA 2, general purpose",
            ModelChoice::Llama3_8b => "Meta LLaMA 3, more capable",
            ModelChoice::Phi3Mini => "Microsoft Phi-3, compact conversational",
            ModelChoice::DolphinMixtral => "Dolphin Mixtral, chat tuned",
            ModelChoice::OpenChat7b => "OpenChat, tuned for conversation",
            ModelChoice::NeuralChat => "Intel Neural Chat",
            ModelChoice::StarCoder2_3b => "StarCoder2, code generation",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModelChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        ModelChoice::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| Error::UnknownModel(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl SamplingParams {
    /// Builds params from raw user input, forcing both values into range.
    pub fn clamped(temperature: f32, max_tokens: i64) -> Self {
        let temperature = if temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(*TEMPERATURE_RANGE.start(), *TEMPERATURE_RANGE.end())
        };
        let max_tokens = max_tokens.clamp(
            i64::from(*MAX_TOKENS_RANGE.start()),
            i64::from(*MAX_TOKENS_RANGE.end()),
        ) as u32;
        Self { temperature, max_tokens }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self { temperature: DEFAULT_TEMPERATURE, max_tokens: DEFAULT_MAX_TOKENS }
    }
}

/// One user submission. Built fresh per request and dropped after use.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub question: String,
    pub model: ModelChoice,
    pub params: SamplingParams,
}

impl GenerationRequest {
    pub fn system_instruction(&self) -> &'static str {
        crate::prompt::SYSTEM_INSTRUCTION
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
}

/// The generation capability: given a model id and a realized prompt, return the
/// runtime's raw response body. `params` is `None` when sampling is not forwarded.
#[async_trait::async_trait]
pub trait LlmBackend: Send + Sync + 'static {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: Option<&SamplingParams>,
    ) -> Result<Vec<u8>>;
}

pub mod ollama;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_listed_model() {
        for m in ModelChoice::ALL {
            assert_eq!(m.id().parse::<ModelChoice>().unwrap(), m);
        }
        assert_eq!(" mistral ".parse::<ModelChoice>().unwrap(), ModelChoice::Mistral);
    }

    #[test]
    fn rejects_unlisted_model() {
        let err = "gpt-4".parse::<ModelChoice>().unwrap_err();
        assert!(matches!(err, Error::UnknownModel(ref m) if m == "gpt-4"));
    }

    #[test]
    fn serializes_to_runtime_id() {
        let v = serde_json::to_value(ModelChoice::Llama3_8b).unwrap();
        assert_eq!(v, "llama3:8b");
    }

    #[test]
    fn sampling_params_are_clamped() {
        assert_eq!(SamplingParams::clamped(1.7, 10_000), SamplingParams { temperature: 1.0, max_tokens: 300 });
        assert_eq!(SamplingParams::clamped(-0.5, -3), SamplingParams { temperature: 0.0, max_tokens: 50 });
        assert_eq!(SamplingParams::clamped(0.3, 120), SamplingParams { temperature: 0.3, max_tokens: 120 });
        assert_eq!(SamplingParams::clamped(f32::NAN, 150).temperature, DEFAULT_TEMPERATURE);
        assert_eq!(SamplingParams::clamped(f32::INFINITY, 150).temperature, 1.0);
        assert_eq!(SamplingParams::clamped(f32::NEG_INFINITY, 150).temperature, 0.0);
        // overflowing input parses to +inf
        assert_eq!(SamplingParams::clamped("1e39".parse().unwrap(), 150).temperature, 1.0);
    }

    #[test]
    fn defaults_match_form_defaults() {
        let p = SamplingParams::default();
        assert_eq!(p.temperature, 0.7);
        assert_eq!(p.max_tokens, 150);
        assert_eq!(ModelChoice::default(), ModelChoice::Gemma2b);
    }
}
