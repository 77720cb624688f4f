// Error taxonomy for the llm client
//
// Every variant is terminal for the current invocation. Nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// The requested model id is absent from the loaded configs
    #[error("Model ID '{0}' not found in configuration")]
    ConfigNotFound(String),

    /// The resolved config points at a key the key store does not hold
    #[error("API key '{key_name}' not found for model '{model_id}'")]
    KeyNotFound { model_id: String, key_name: String },

    /// No prompt on the command line and nothing on stdin
    #[error("No prompt provided")]
    EmptyPrompt,

    /// Logs were requested but the database was never created
    #[error("Logs database does not exist: {}", .0.display())]
    StoreAbsent(PathBuf),

    /// Network or endpoint failure while talking to the model
    #[error("Transport error: {0}")]
    Transport(String),

    /// A config or key file exists but could not be read
    #[error("Failed to load {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Conversation log error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LlmError>;
