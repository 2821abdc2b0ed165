use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Required settings missing or malformed at startup.
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("unknown model: {0}")]
    UnknownModel(String),
    /// The runtime answered, but with an error or an unusable body.
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("model runtime unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::UnknownModel(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Generation(_) | Error::Unreachable(_) => StatusCode::BAD_GATEWAY,
            Error::Configuration(_) | Error::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
