use crate::error::Result;
use crate::model::{ModelChoice, SamplingParams};
use minijinja::{context, Environment};
use serde::Serialize;

pub const FALLBACK_MESSAGE: &str = "Please provide a question to get started.";

const INDEX: &str = "index.html";

#[derive(Serialize)]
struct ModelOption {
    id: &'static str,
    label: &'static str,
}

/// What the output area should show.
#[derive(Debug)]
pub enum Output {
    Fallback,
    Answer(String),
    Failure(String),
}

#[derive(Debug)]
pub struct Page {
    pub model: ModelChoice,
    pub params: SamplingParams,
    pub question: String,
    pub output: Output,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            model: ModelChoice::default(),
            params: SamplingParams::default(),
            question: String::new(),
            output: Output::Fallback,
        }
    }
}

/// HTML renderer for the form page. Templates are compiled into the binary.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(INDEX, include_str!("../templates/index.html"))?;
        Ok(Self { env })
    }

    pub fn render(&self, page: &Page) -> Result<String> {
        let models: Vec<ModelOption> = ModelChoice::ALL
            .into_iter()
            .map(|m| ModelOption { id: m.id(), label: m.label() })
            .collect();
        let (answer, error) = match &page.output {
            Output::Fallback => (None, None),
            Output::Answer(text) => (Some(text.as_str()), None),
            Output::Failure(msg) => (None, Some(msg.as_str())),
        };
        let html = self.env.get_template(INDEX)?.render(context! {
            models => models,
            model => page.model.id(),
            temperature => format!("{:.2}", page.params.temperature),
            max_tokens => page.params.max_tokens,
            question => page.question,
            answer => answer,
            error => error,
            fallback => FALLBACK_MESSAGE,
        })?;
        Ok(html)
    }
}
