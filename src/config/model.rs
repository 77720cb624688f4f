// Model endpoint records and lookup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{LlmError, Result};

fn default_true() -> bool {
    true
}

/// A single model endpoint, as listed in the YAML config.
///
/// ```yaml
/// - model_id: gpt-x
///   model_name: gpt-4o-mini
///   api_base: https://api.openai.com/v1
///   can_stream: true
///   api_key_name: default
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEndpointConfig {
    /// Lookup key used on the command line
    pub model_id: String,
    /// Identifier sent to the endpoint
    pub model_name: String,
    pub api_base: String,
    #[serde(rename = "can_stream", alias = "supports_streaming", default = "default_true")]
    pub supports_streaming: bool,
    /// Name of the secret in the key store
    pub api_key_name: String,
}

/// Key name to secret. Read-only once loaded.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApiKeyStore {
    keys: HashMap<String, String>,
}

impl ApiKeyStore {
    pub fn new(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }

    pub fn get(&self, key_name: &str) -> Option<&str> {
        self.keys.get(key_name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(String, String)> for ApiKeyStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Find the first config whose `model_id` equals `model_id`.
///
/// Duplicate ids are not validated; the earliest entry wins.
pub fn resolve<'a>(
    model_id: &str,
    configs: &'a [ModelEndpointConfig],
) -> Result<&'a ModelEndpointConfig> {
    configs
        .iter()
        .find(|config| config.model_id == model_id)
        .ok_or_else(|| LlmError::ConfigNotFound(model_id.to_string()))
}

/// Look up the secret named by `config.api_key_name`.
///
/// An empty secret counts as missing.
pub fn resolve_key<'a>(config: &ModelEndpointConfig, keys: &'a ApiKeyStore) -> Result<&'a str> {
    keys.get(&config.api_key_name)
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| LlmError::KeyNotFound {
            model_id: config.model_id.clone(),
            key_name: config.api_key_name.clone(),
        })
}
