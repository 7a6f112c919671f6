//! Configuration management
//!
//! Two concerns live here: the static vendor constants the mobile API
//! expects to see (app version, market id, candidate device models), and
//! the per-run settings loaded from `floorsign.toml` plus CLI overrides.
//!
//! The randomized device identity is an explicit [`DeviceProfile`] value
//! drawn once per agent instance and passed into request building; there
//! is no process-global header state.

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FloorsignError, Result};

/// Vendor API origin
pub const DEFAULT_BASE_URL: &str = "https://floor.huluxia.com";

/// iOS client version the API is told to expect
pub const IOS_APP_VERSION: &str = "1.2.2";
/// Distribution channel identifier sent with iOS logins
pub const IOS_MARKET_ID: &str = "floor_huluxia";
/// Platform code for iOS
pub const IOS_PLATFORM: &str = "1";

/// Version string of the legacy Android client
pub const ANDROID_APP_VERSION: &str = "4.3.1.5.2";
pub const ANDROID_VERSION_CODE: &str = "398";
pub const ANDROID_MARKET_ID: &str = "floor_web";

const DEVICE_MODELS: [&str; 3] = ["iPhone14,3", "iPhone15,2", "iPhone16,1"];

const ACCEPT_LANGUAGES: [&str; 3] = [
    "zh-Hans-CN;q=1, en-GB;q=0.9, zh-Hant-CN;q=0.8",
    "zh-Hans-CN;q=1, en-US;q=0.9, ja-JP;q=0.8",
    "zh-Hans-CN;q=1, zh-Hant-TW;q=0.9, en-US;q=0.8",
];

/// User-Agent string the mobile client sends
pub fn user_agent() -> String {
    format!("Floor/{} (iPhone; iOS 18.2; Scale/3.00)", IOS_APP_VERSION)
}

/// Randomized device identity, fixed for the lifetime of one agent
///
/// The API fingerprints clients on these fields; picking them once and
/// reusing them for every request (and for the cached session) keeps the
/// account looking like a single device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// `[d]` prefix plus 16 random digits
    pub device_code: String,
    /// One of the known-good iPhone model identifiers
    pub device_model: String,
    /// Accept-Language header value
    pub accept_language: String,
}

impl DeviceProfile {
    /// Draw a fresh device identity
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let code: u64 = rng.gen_range(1_000_000_000_000_000..10_000_000_000_000_000);
        Self {
            device_code: format!("[d]{}", code),
            device_model: DEVICE_MODELS
                .choose(&mut rng)
                .copied()
                .unwrap_or(DEVICE_MODELS[0])
                .to_string(),
            accept_language: ACCEPT_LANGUAGES
                .choose(&mut rng)
                .copied()
                .unwrap_or(ACCEPT_LANGUAGES[0])
                .to_string(),
        }
    }
}

/// Per-run settings, all optional in the file and overridable from the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Board list JSON file (board id -> display name)
    #[serde(default)]
    pub boards_file: Option<PathBuf>,
    /// Session cache JSON file
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
    /// Webhook that receives the final plain-text summary
    #[serde(default)]
    pub notify_url: Option<String>,
    /// Override for the vendor API origin
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from the first `floorsign.toml` found, or defaults
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| FloorsignError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Board file path, defaulting to `cat_id.json` in the working directory
    pub fn boards_file(&self) -> PathBuf {
        self.boards_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("cat_id.json"))
    }

    /// Cache file path, defaulting to the user data directory
    pub fn cache_file(&self) -> PathBuf {
        self.cache_file.clone().unwrap_or_else(default_cache_file)
    }

    /// Vendor API origin
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }
}

/// Find the configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join("floorsign.toml");
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(dir) = get_config_dir() {
        let path = dir.join("floorsign.toml");
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Get the configuration directory path
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("floorsign"))
}

fn default_cache_file() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("floorsign").join("login_cache.json"),
        None => {
            warn!("no user data directory, keeping session cache in the working directory");
            PathBuf::from("login_cache.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn device_profile_shape() {
        let profile = DeviceProfile::random();
        assert!(profile.device_code.starts_with("[d]"));
        assert_eq!(profile.device_code.len(), "[d]".len() + 16);
        assert!(DEVICE_MODELS.contains(&profile.device_model.as_str()));
        assert!(ACCEPT_LANGUAGES.contains(&profile.accept_language.as_str()));
    }

    #[test]
    fn user_agent_embeds_app_version() {
        assert!(user_agent().contains(IOS_APP_VERSION));
    }

    #[test]
    fn config_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "boards_file = \"boards.json\"\nnotify_url = \"https://example.com/hook\""
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.boards_file(), PathBuf::from("boards.json"));
        assert_eq!(config.notify_url.as_deref(), Some("https://example.com/hook"));
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "boards_file = [not toml").unwrap();

        let result = Config::load_from(file.path());
        assert!(matches!(result, Err(FloorsignError::Config(_))));
    }
}
