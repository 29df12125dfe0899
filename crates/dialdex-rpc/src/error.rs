use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("remote fault {code}: {message}")]
    Fault { code: i64, message: String },
}

pub type Result<T> = std::result::Result<T, RpcError>;
