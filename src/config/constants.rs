// Project-wide constants
//
// Default file locations share one directory so a fresh install only needs
// `~/.config/llm/`. Import via `use crate::config::constants::*;`.

/// Model endpoint configs (YAML list).
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/llm/llm.vim.yaml";

/// API key store (JSON object of key name to secret).
pub const DEFAULT_API_KEYS_PATH: &str = "~/.config/llm/keys.json";

/// SQLite conversation log.
pub const DEFAULT_DB_PATH: &str = "~/.config/llm/llm_logs.db";

/// Path appended to `api_base` for chat requests.
pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Capacity of the fragment channel between transport and assembler.
pub const FRAGMENT_CHANNEL_CAPACITY: usize = 100;

/// Format of auto-generated conversation ids (sortable, microsecond resolution).
pub const CONVERSATION_ID_FORMAT: &str = "%Y%m%d%H%M%S%6f";
