// llm - stream answers from OpenAI-compatible endpoints and log every exchange
// Library exports

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod providers;
pub mod streaming;

pub use errors::{LlmError, Result};
