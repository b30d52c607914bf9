use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GiftError>;

#[derive(Debug, Error)]
pub enum GiftError {
    #[error("xdg error: {message}")]
    XdgError { message: String },

    #[error("failed to load env file {}: {source}", path.display())]
    EnvLoadError {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {kind} in {}: {message}", path.display())]
    ParseError {
        path: PathBuf,
        kind: &'static str,
        message: String,
    },

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("websocket: {0}")]
    Websocket(#[from] tungstenite::Error),

    #[error("console output: {0}")]
    Console(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("connection closed before a response arrived")]
    ClosedBeforeResponse,

    #[error("no top-level `{key}` collection")]
    MissingCollection { key: String },

    #[error("`{key}` is a {found}, expected an array of tables")]
    NotACollection { key: String, found: &'static str },

    #[error("`{key}[{index}]` is a {found}, expected a table")]
    NotARecord {
        key: String,
        index: usize,
        found: &'static str,
    },

    #[error("record {index}: `{field}` is not an ISO-8601 date-time: {value}")]
    BadDate {
        index: usize,
        field: String,
        value: String,
    },
}
