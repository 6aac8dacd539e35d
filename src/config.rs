// src/config.rs
// Persisted client configuration and transcription history

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "omniasr-client";
const CONFIG_FILE: &str = "config.json";
const HISTORY_LIMIT: usize = 50;
const API_KEY_XOR_KEY: &[u8] = b"omniasr-local-key-v1";

pub const DEFAULT_LANGUAGE: &str = "eng_Latn";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key_obfuscated: Option<String>,
    pub default_language: String,
    pub history: Vec<HistoryItem>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key_obfuscated: None,
            default_language: DEFAULT_LANGUAGE.to_string(),
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub text: String,
    pub language: String,
    pub timestamp: String,
    pub audio_duration_seconds: f64,
    pub request_id: Option<String>,
}

impl ClientConfig {
    /// Default on-disk location under the user config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Environment-driven config, loading a `.env` file when present.
    /// Recognized variables: `OMNIASR_BASE_URL`, `OMNIASR_API_KEY`,
    /// `OMNIASR_LANGUAGE`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Ok(url) = std::env::var("OMNIASR_BASE_URL") {
            config.base_url = url.trim().to_string();
        }
        if let Ok(key) = std::env::var("OMNIASR_API_KEY") {
            config.set_api_key(Some(&key));
        }
        if let Ok(lang) = std::env::var("OMNIASR_LANGUAGE") {
            let trimmed = lang.trim();
            if !trimmed.is_empty() {
                config.default_language = trimmed.to_string();
            }
        }
        config
    }

    pub fn set_api_key(&mut self, api_key: Option<&str>) {
        self.api_key_obfuscated = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(obfuscate_api_key);
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key_obfuscated
            .as_deref()
            .and_then(deobfuscate_api_key)
    }

    /// Safe-to-display form of the stored key.
    pub fn api_key_masked(&self) -> Option<String> {
        self.api_key().map(|key| mask_api_key(&key))
    }

    pub fn record_history(&mut self, mut item: HistoryItem) {
        if item.text.trim().is_empty() {
            return;
        }
        if item.id.is_empty() {
            item.id = uuid::Uuid::new_v4().to_string();
        }
        if item.timestamp.is_empty() {
            item.timestamp = Utc::now().to_rfc3339();
        }

        self.history.insert(0, item);
        if self.history.len() > HISTORY_LIMIT {
            self.history.truncate(HISTORY_LIMIT);
        }
    }

    pub fn delete_history_item(&mut self, id: &str) {
        self.history.retain(|item| item.id != id);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// Load the config at `path`, creating a default one when missing. A corrupt
/// file is backed up beside itself and replaced by a fresh default.
pub fn load_or_create(path: &Path) -> Result<ClientConfig, String> {
    if !path.exists() {
        let config = ClientConfig::default();
        save(path, &config)?;
        return Ok(config);
    }

    let raw = fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
    match serde_json::from_str::<ClientConfig>(&raw) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!("Config at {} is corrupt ({}), resetting", path.display(), e);
            let backup = path.with_extension("json.bak");
            let _ = fs::copy(path, backup);
            let config = ClientConfig::default();
            save(path, &config)?;
            Ok(config)
        }
    }
}

pub fn save(path: &Path, config: &ClientConfig) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create config dir: {}", e))?;
    }
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, json).map_err(|e| format!("Failed to save config: {}", e))
}

fn obfuscate_api_key(api_key: &str) -> String {
    let mut bytes = api_key.as_bytes().to_vec();
    for (idx, byte) in bytes.iter_mut().enumerate() {
        *byte ^= API_KEY_XOR_KEY[idx % API_KEY_XOR_KEY.len()];
    }
    BASE64_STANDARD.encode(bytes)
}

fn deobfuscate_api_key(obfuscated: &str) -> Option<String> {
    let mut bytes = BASE64_STANDARD.decode(obfuscated).ok()?;
    for (idx, byte) in bytes.iter_mut().enumerate() {
        *byte ^= API_KEY_XOR_KEY[idx % API_KEY_XOR_KEY.len()];
    }
    String::from_utf8(bytes).ok()
}

fn mask_api_key(api_key: &str) -> String {
    // Counted in chars, not bytes, so multibyte keys cannot split a
    // character when sliced.
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 10 {
        return "******".to_string();
    }

    let prefix: String = chars[..6].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}********{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_item(text: &str) -> HistoryItem {
        HistoryItem {
            id: String::new(),
            text: text.to_string(),
            language: "eng_Latn".to_string(),
            timestamp: String::new(),
            audio_duration_seconds: 3.0,
            request_id: None,
        }
    }

    #[test]
    fn test_api_key_obfuscation_round_trip() {
        let mut config = ClientConfig::default();
        config.set_api_key(Some("sk-test-1234567890"));

        // Never stored in the clear
        assert_ne!(
            config.api_key_obfuscated.as_deref(),
            Some("sk-test-1234567890")
        );
        assert_eq!(config.api_key().as_deref(), Some("sk-test-1234567890"));
    }

    #[test]
    fn test_blank_api_key_clears() {
        let mut config = ClientConfig::default();
        config.set_api_key(Some("something"));
        config.set_api_key(Some("   "));
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("short"), "******");
        assert_eq!(mask_api_key("sk-test-1234567890"), "sk-tes********7890");
    }

    #[test]
    fn test_mask_api_key_with_multibyte_chars() {
        // Over 10 bytes but only 5 chars: fully masked, no panic
        assert_eq!(mask_api_key("🔑🔑🔑🔑🔑"), "******");
        // Long enough to keep a prefix/suffix, split on char boundaries
        assert_eq!(mask_api_key("ключ-секрет-1234"), "ключ-с********1234");
    }

    #[test]
    fn test_history_limit_and_ordering() {
        let mut config = ClientConfig::default();
        for i in 0..(HISTORY_LIMIT + 5) {
            config.record_history(history_item(&format!("entry {}", i)));
        }

        assert_eq!(config.history.len(), HISTORY_LIMIT);
        // Newest first
        assert_eq!(
            config.history[0].text,
            format!("entry {}", HISTORY_LIMIT + 4)
        );
        assert!(!config.history[0].id.is_empty());
        assert!(!config.history[0].timestamp.is_empty());
    }

    #[test]
    fn test_history_skips_blank_text() {
        let mut config = ClientConfig::default();
        config.record_history(history_item("   "));
        assert!(config.history.is_empty());
    }

    #[test]
    fn test_load_or_create_handles_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = load_or_create(&path).unwrap();
        assert_eq!(config.default_language, DEFAULT_LANGUAGE);
        assert!(path.with_extension("json.bak").exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = ClientConfig::default();
        config.base_url = "https://asr.example.com".to_string();
        config.set_api_key(Some("key-abc"));
        config.record_history(history_item("hello"));
        save(&path, &config).unwrap();

        let reloaded = load_or_create(&path).unwrap();
        assert_eq!(reloaded.base_url, "https://asr.example.com");
        assert_eq!(reloaded.api_key().as_deref(), Some("key-abc"));
        assert_eq!(reloaded.history.len(), 1);
    }
}
