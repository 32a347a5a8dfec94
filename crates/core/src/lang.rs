//! Per-caller language preferences.
//!
//! The supported language set is fixed at compile time. Preferences
//! live in memory for the lifetime of the process and are the only
//! shared mutable state in the system, so the store wraps them in a
//! [`tokio::sync::RwLock`] for safe concurrent get/set.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::types::CallerId;

/// A supported interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Chinese,
}

impl Language {
    /// Parse a language code. Returns `None` for unsupported codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "en" => Some(Language::English),
            "zh" => Some(Language::Chinese),
            _ => None,
        }
    }

    /// The short language code, as used in configuration.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    /// The language's name in that language, for selection prompts.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Chinese => "中文",
        }
    }
}

/// Concurrent map from caller identity to language preference.
///
/// Callers without an explicit preference fall back to the configured
/// process-wide default.
#[derive(Debug)]
pub struct LanguageStore {
    default: Language,
    preferences: RwLock<HashMap<CallerId, Language>>,
}

impl LanguageStore {
    pub fn new(default: Language) -> Self {
        Self {
            default,
            preferences: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide default language.
    pub fn default_language(&self) -> Language {
        self.default
    }

    /// Resolve the language for a caller.
    pub async fn get(&self, caller: CallerId) -> Language {
        self.preferences
            .read()
            .await
            .get(&caller)
            .copied()
            .unwrap_or(self.default)
    }

    /// Record an explicit language selection for a caller.
    pub async fn set(&self, caller: CallerId, language: Language) {
        self.preferences.write().await.insert(caller, language);
    }
}
