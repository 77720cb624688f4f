// Configuration loader
// Reads model endpoints from YAML and API keys from JSON. A missing file is
// not an error: first runs legitimately have neither.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::model::{ApiKeyStore, ModelEndpointConfig};
use crate::errors::{LlmError, Result};

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Load the ordered list of model configs.
pub fn load_model_configs(path: &Path) -> Result<Vec<ModelEndpointConfig>> {
    let Some(contents) = read_optional(path)? else {
        debug!("No model config at {}", path.display());
        return Ok(Vec::new());
    };

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    // A document holding only `~` or `null` is also an empty set
    let configs: Option<Vec<ModelEndpointConfig>> =
        serde_yaml::from_str(&contents).map_err(|e| config_error(path, e))?;
    let configs = configs.unwrap_or_default();

    debug!("Loaded {} model configs from {}", configs.len(), path.display());
    Ok(configs)
}

/// Load the key-name to secret mapping.
pub fn load_api_keys(path: &Path) -> Result<ApiKeyStore> {
    let Some(contents) = read_optional(path)? else {
        debug!("No API key file at {}", path.display());
        return Ok(ApiKeyStore::default());
    };

    if contents.trim().is_empty() {
        return Ok(ApiKeyStore::default());
    }

    serde_json::from_str(&contents).map_err(|e| config_error(path, e))
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| config_error(path, e))
}

fn config_error(path: &Path, e: impl std::fmt::Display) -> LlmError {
    LlmError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
