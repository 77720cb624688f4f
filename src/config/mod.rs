// Configuration module
// Public interface for model configs, API keys and default locations

pub mod constants;
mod loader;
mod model;

pub use loader::{expand_home, load_api_keys, load_model_configs};
pub use model::{resolve, resolve_key, ApiKeyStore, ModelEndpointConfig};
