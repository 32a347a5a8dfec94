//! Bot configuration loaded from environment variables.

use std::collections::HashSet;
use std::time::Duration;

use easel_core::access::AccessConfig;
use easel_core::lang::Language;
use easel_core::types::{CallerId, ChannelId, GuildId};

/// Runtime configuration, loaded once at startup and shared read-only.
///
/// All fields have defaults suitable for local development; override
/// via environment variables (a `.env` file is honored).
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Inference backend base URL (default: `http://localhost:8000`).
    pub api_base_url: String,
    /// Allow-sets for guilds, channels, and direct-message callers.
    pub access: AccessConfig,
    /// Poll budget for generation jobs (default: 300 s).
    pub generate_timeout: Duration,
    /// Poll budget for edit jobs (default: 600 s). Editing is heavier
    /// on the backend, so it gets the longer budget.
    pub edit_timeout: Duration,
    /// Default inference step count for generation jobs (default: 20).
    pub default_generate_steps: u32,
    /// Default inference step count for edit jobs (default: 50).
    pub default_edit_steps: u32,
    /// Largest allowed image dimension before upload (default: 2048).
    pub max_image_dimension: u32,
    /// Fallback language for callers without a preference.
    pub default_language: Language,
}

impl BotConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `API_BASE_URL`           | `http://localhost:8000` |
    /// | `ALLOWED_GUILDS`         | empty (allow all)       |
    /// | `ALLOWED_CHANNELS`       | empty (allow all)       |
    /// | `ALLOWED_DM_CALLERS`     | empty (deny all DMs)    |
    /// | `GENERATE_TIMEOUT_SECS`  | `300`                   |
    /// | `EDIT_TIMEOUT_SECS`      | `600`                   |
    /// | `DEFAULT_GENERATE_STEPS` | `20`                    |
    /// | `DEFAULT_EDIT_STEPS`     | `50`                    |
    /// | `MAX_IMAGE_DIMENSION`    | `2048`                  |
    /// | `DEFAULT_LANGUAGE`       | `en`                    |
    pub fn from_env() -> Self {
        let api_base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".into());

        let access = AccessConfig {
            allowed_guilds: parse_id_set("ALLOWED_GUILDS").into_iter().map(GuildId).collect(),
            allowed_channels: parse_id_set("ALLOWED_CHANNELS")
                .into_iter()
                .map(ChannelId)
                .collect(),
            allowed_dm_callers: parse_id_set("ALLOWED_DM_CALLERS")
                .into_iter()
                .map(CallerId)
                .collect(),
        };

        let default_language = std::env::var("DEFAULT_LANGUAGE")
            .ok()
            .and_then(|code| Language::from_code(&code))
            .unwrap_or(Language::English);

        Self {
            api_base_url,
            access,
            generate_timeout: Duration::from_secs(parse_var("GENERATE_TIMEOUT_SECS", 300)),
            edit_timeout: Duration::from_secs(parse_var("EDIT_TIMEOUT_SECS", 600)),
            default_generate_steps: parse_var("DEFAULT_GENERATE_STEPS", 20),
            default_edit_steps: parse_var("DEFAULT_EDIT_STEPS", 50),
            max_image_dimension: parse_var("MAX_IMAGE_DIMENSION", 2048),
            default_language,
        }
    }

    /// The poll budget for a job of the given kind.
    pub fn timeout_for(&self, kind: easel_core::job::JobKind) -> Duration {
        match kind {
            easel_core::job::JobKind::Generate => self.generate_timeout,
            easel_core::job::JobKind::Edit => self.edit_timeout,
        }
    }
}

/// Parse a numeric env var, panicking at startup on malformed values.
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid number: {e}")),
        Err(_) => default,
    }
}

/// Parse a comma-separated id list env var. Malformed entries panic at
/// startup so misconfiguration fails fast.
fn parse_id_set(name: &str) -> HashSet<u64> {
    std::env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .unwrap_or_else(|e| panic!("{name} entry '{s}' is not a valid id: {e}"))
        })
        .collect()
}
