//! Coach configuration loaded from `.env`.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | GEMINI_API_KEY / NEXT_PUBLIC_GEMINI_API_KEY | — | Completion API credential. No key means chat requests are rejected with a client error. |
//! | RUNCOACH_GEMINI_MODEL | gemini-2.0-flash | Model name for the generateContent endpoint. |
//! | RUNCOACH_GEMINI_BASE_URL | https://generativelanguage.googleapis.com | API base, overridable for tests. |
//! | RUNCOACH_BIND_ADDR | 0.0.0.0:8080 | Gateway listen address. |

use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Runtime configuration for the coach core and gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    /// Completion API key; `None` when unset. The gateway turns this into a
    /// client error rather than failing at startup.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name sent to the generateContent endpoint.
    pub model: String,
    /// API base URL (no trailing slash).
    pub base_url: String,
    /// Gateway listen address.
    pub bind_addr: String,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl CoachConfig {
    /// Load from environment. Unset or empty values fall back to defaults.
    /// Key priority: GEMINI_API_KEY > NEXT_PUBLIC_GEMINI_API_KEY.
    pub fn from_env() -> Self {
        let api_key =
            env_opt_string("GEMINI_API_KEY").or_else(|| env_opt_string("NEXT_PUBLIC_GEMINI_API_KEY"));
        Self {
            api_key,
            model: env_opt_string("RUNCOACH_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: env_opt_string("RUNCOACH_GEMINI_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind_addr: env_opt_string("RUNCOACH_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }

    /// True when a non-empty API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().map(|k| !k.trim().is_empty()).unwrap_or(false)
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let config = CoachConfig::default();
        assert!(!config.has_api_key());
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn has_api_key_rejects_blank() {
        let config = CoachConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!config.has_api_key());
    }
}
