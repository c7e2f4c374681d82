use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Roster file error: {0}")]
    Roster(String),

    #[error("Email address error: {0}")]
    EmailAddress(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    EmailMessage(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Unexpected response from {source_name}: {detail}")]
    Response { source_name: &'static str, detail: String },
}

pub type Result<T> = std::result::Result<T, AppError>;
