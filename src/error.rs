use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("sink error: {0}")]
    Sink(#[from] std::io::Error),

    #[error("sink already finished; a sink accepts exactly one document")]
    SinkFinished,

    #[error("invalid report request: {0}")]
    Request(#[from] serde_json::Error),

    #[error("font error: {0}")]
    Font(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
