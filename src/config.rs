use crate::error::{Error, Result};
use clap::{ArgAction, Parser};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "qna-chatbot", about = "Q&A chatbot over local Ollama models")]
pub struct Config {
    #[arg(long, env, default_value = "127.0.0.1:8501")]
    pub bind_addr: String,
    #[arg(long, env, default_value = "http://127.0.0.1:11434")]
    pub ollama_base_url: String,
    #[arg(long, env, default_value_t = 120)]
    pub request_timeout_secs: u64,
    #[arg(long = "LANGCHAIN_API_KEY", env = "LANGCHAIN_API_KEY", hide_env_values = true)]
    pub langchain_api_key: Option<String>,
    #[arg(long = "LANGCHAIN_PROJECT", env = "LANGCHAIN_PROJECT", default_value = "QnA ChatBot with Ollama")]
    pub langchain_project: String,
    #[arg(
        long = "LANGCHAIN_TRACING_V2",
        env = "LANGCHAIN_TRACING_V2",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub langchain_tracing_v2: bool,
    /// Send temperature and max_tokens to the runtime.
    #[arg(long, env, default_value_t = true, action = ArgAction::Set)]
    pub forward_sampling: bool,
}

#[derive(Clone)]
pub struct TraceSettings {
    pub api_key: String,
    pub project: String,
    pub enabled: bool,
}

impl fmt::Debug for TraceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceSettings")
            .field("api_key", &"<redacted>")
            .field("project", &self.project)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Validated settings, loaded once at startup and read-only afterwards.
#[derive(Clone, Debug)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub ollama_base_url: String,
    pub request_timeout: Duration,
    pub forward_sampling: bool,
    pub trace: TraceSettings,
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let api_key = cfg
            .langchain_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Configuration("LANGCHAIN_API_KEY is not set".into()))?
            .to_string();

        let bind_addr = cfg
            .bind_addr
            .parse()
            .map_err(|e| Error::Configuration(format!("BIND_ADDR {:?}: {e}", cfg.bind_addr)))?;

        let base = cfg.ollama_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::Configuration(format!(
                "OLLAMA_BASE_URL must be an http(s) URL, got {base:?}"
            )));
        }
        if cfg.request_timeout_secs == 0 {
            return Err(Error::Configuration("REQUEST_TIMEOUT_SECS must be positive".into()));
        }

        Ok(Self {
            bind_addr,
            ollama_base_url: base.to_string(),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
            forward_sampling: cfg.forward_sampling,
            trace: TraceSettings {
                api_key,
                project: cfg.langchain_project.clone(),
                enabled: cfg.langchain_tracing_v2,
            },
        })
    }
}
