//! Settings and their encrypted on-disk store.
//!
//! The store keeps two files in the application data directory: the
//! Fernet key and the configuration itself, written as base64 of the Fernet
//! token. A configuration left over as plain JSON is re-written encrypted
//! the first time it is read.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fernet::Fernet;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const APP_DIR: &str = "Glik";
pub const CONFIG_FILENAME: &str = "config.json";
pub const KEY_FILENAME: &str = ".glik_key";

pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const MIN_REFRESH_SECS: u64 = 10;
pub const MAX_REFRESH_SECS: u64 = 300;

/// Per-user application data directory (`%APPDATA%\Glik` on Windows).
pub fn data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Which backend to poll and how to reach it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionConfig {
    Nightscout {
        base_url: String,
        token: String,
        /// Hex SHA-1 of `token`, sent as `api-secret`.
        token_sha1: String,
    },
    DexcomShare {
        username: String,
        password: String,
        region: String,
    },
}

impl ConnectionConfig {
    pub fn is_complete(&self) -> bool {
        match self {
            ConnectionConfig::Nightscout { base_url, .. } => !base_url.trim().is_empty(),
            ConnectionConfig::DexcomShare {
                username, password, ..
            } => !username.trim().is_empty() && !password.is_empty(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig::Nightscout {
            base_url: String::new(),
            token: String::new(),
            token_sha1: String::new(),
        }
    }
}

/// Complete application settings. Never edited in place: a save builds a
/// new value and swaps it in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub connection: ConnectionConfig,
    pub refresh_interval_secs: u64,
    pub minimize_to_tray: bool,
    pub autostart: bool,
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            minimize_to_tray: true,
            autostart: false,
            dark_mode: true,
        }
    }
}

impl Settings {
    /// True when there is nothing to connect to and the welcome flow should run.
    pub fn needs_setup(&self) -> bool {
        !self.connection.is_complete()
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(clamp_refresh(self.refresh_interval_secs))
    }
}

pub fn clamp_refresh(secs: u64) -> u64 {
    secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS)
}

/// Flat key/value layout written to disk. Every key is optional so files
/// from older versions still load.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredSettings {
    data_source: Option<String>,
    nightscout_url: String,
    api_secret: String,
    api_secret_sha1: String,
    dexcom_username: String,
    dexcom_password: String,
    dexcom_region: String,
    refresh_interval: Option<u64>,
    minimize_to_tray: Option<bool>,
    autostart: Option<bool>,
    dark_mode: Option<bool>,
}

const SOURCE_NIGHTSCOUT: &str = "nightscout";
const SOURCE_DEXCOM: &str = "dexcom";

impl From<StoredSettings> for Settings {
    fn from(stored: StoredSettings) -> Self {
        let defaults = Settings::default();
        let connection = match stored.data_source.as_deref() {
            Some(SOURCE_DEXCOM) => ConnectionConfig::DexcomShare {
                username: stored.dexcom_username,
                password: stored.dexcom_password,
                region: if stored.dexcom_region.is_empty() {
                    "ous".to_string()
                } else {
                    stored.dexcom_region
                },
            },
            _ => ConnectionConfig::Nightscout {
                base_url: stored.nightscout_url,
                token: stored.api_secret,
                token_sha1: stored.api_secret_sha1,
            },
        };
        Settings {
            connection,
            refresh_interval_secs: clamp_refresh(
                stored.refresh_interval.unwrap_or(defaults.refresh_interval_secs),
            ),
            minimize_to_tray: stored.minimize_to_tray.unwrap_or(defaults.minimize_to_tray),
            autostart: stored.autostart.unwrap_or(defaults.autostart),
            dark_mode: stored.dark_mode.unwrap_or(defaults.dark_mode),
        }
    }
}

impl From<&Settings> for StoredSettings {
    fn from(settings: &Settings) -> Self {
        let mut stored = StoredSettings {
            refresh_interval: Some(settings.refresh_interval_secs),
            minimize_to_tray: Some(settings.minimize_to_tray),
            autostart: Some(settings.autostart),
            dark_mode: Some(settings.dark_mode),
            ..Default::default()
        };
        match &settings.connection {
            ConnectionConfig::Nightscout {
                base_url,
                token,
                token_sha1,
            } => {
                stored.data_source = Some(SOURCE_NIGHTSCOUT.to_string());
                stored.nightscout_url = base_url.clone();
                stored.api_secret = token.clone();
                stored.api_secret_sha1 = token_sha1.clone();
            }
            ConnectionConfig::DexcomShare {
                username,
                password,
                region,
            } => {
                stored.data_source = Some(SOURCE_DEXCOM.to_string());
                stored.dexcom_username = username.clone();
                stored.dexcom_password = password.clone();
                stored.dexcom_region = region.clone();
            }
        }
        stored
    }
}

/// Encrypted settings file plus the key that protects it.
pub struct ConfigStore {
    config_path: PathBuf,
    cipher: Fernet,
}

impl ConfigStore {
    /// Opens the store in the per-user data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(&data_dir())
    }

    /// Opens the store in `dir`, creating the directory and key if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let key = load_or_create_key(&dir.join(KEY_FILENAME))?;
        let cipher = Fernet::new(&key).context("Invalid encryption key")?;
        Ok(Self {
            config_path: dir.join(CONFIG_FILENAME),
            cipher,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Reads the settings. Plain JSON from an older version is migrated to
    /// the encrypted form; anything unreadable yields defaults, which send
    /// the user through setup again.
    pub fn load(&self) -> Settings {
        let contents = match fs::read_to_string(&self.config_path) {
            Ok(contents) => contents,
            Err(err) => {
                if self.exists() {
                    warn!("Failed to read {}: {err}", self.config_path.display());
                }
                return Settings::default();
            }
        };

        if let Ok(stored) = serde_json::from_str::<StoredSettings>(&contents) {
            let settings = Settings::from(stored);
            info!("Migrating plaintext configuration to encrypted form");
            if let Err(err) = self.save(&settings) {
                warn!("Configuration migration failed: {err:#}");
            }
            return settings;
        }

        match self.decrypt(&contents) {
            Some(settings) => settings,
            None => {
                warn!("Configuration could not be decrypted, starting from defaults");
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        let payload = self.encrypt(settings)?;
        fs::write(&self.config_path, payload)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))
    }

    pub fn encrypt(&self, settings: &Settings) -> Result<String> {
        let json = serde_json::to_string(&StoredSettings::from(settings))?;
        let token = self.cipher.encrypt(json.as_bytes());
        Ok(STANDARD.encode(token))
    }

    pub fn decrypt(&self, payload: &str) -> Option<Settings> {
        let mut payload = payload.trim().to_string();
        let padding = payload.len() % 4;
        if padding != 0 {
            payload.push_str(&"=".repeat(4 - padding));
        }
        let token_bytes = STANDARD.decode(payload).ok()?;
        let token = String::from_utf8(token_bytes).ok()?;
        let plain = self.cipher.decrypt(&token).ok()?;
        let stored: StoredSettings = serde_json::from_slice(&plain).ok()?;
        Some(stored.into())
    }
}

fn load_or_create_key(path: &Path) -> Result<String> {
    if let Ok(key) = fs::read_to_string(path) {
        let key = key.trim().to_string();
        if Fernet::new(&key).is_some() {
            return Ok(key);
        }
        warn!("Key file {} is not a valid key, generating a new one", path.display());
    }
    let key = Fernet::generate_key();
    fs::write(path, &key).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nightscout_settings() -> Settings {
        Settings {
            connection: ConnectionConfig::Nightscout {
                base_url: "https://cgm.example.org".into(),
                token: "token-api-secret".into(),
                token_sha1: "2b7f0f2b0b2cdb8a8b5c7e84ec6b9e6b3e0c1c1a".into(),
            },
            refresh_interval_secs: 60,
            minimize_to_tray: false,
            autostart: true,
            dark_mode: true,
        }
    }

    fn dexcom_settings() -> Settings {
        Settings {
            connection: ConnectionConfig::DexcomShare {
                username: "mario.rossi@example.it".into(),
                password: "segreta123".into(),
                region: "jp".into(),
            },
            ..Settings::default()
        }
    }

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path()).unwrap();
        for settings in [Settings::default(), nightscout_settings(), dexcom_settings()] {
            let payload = store.encrypt(&settings).unwrap();
            assert!(!payload.contains("segreta123"));
            assert_eq!(store.decrypt(&payload), Some(settings));
        }
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path()).unwrap();
        assert!(store.load().needs_setup());
        store.save(&dexcom_settings()).unwrap();

        let reopened = ConfigStore::open(dir.path()).unwrap();
        assert_eq!(reopened.load(), dexcom_settings());
    }

    #[test]
    fn tolerates_missing_padding() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path()).unwrap();
        let payload = store.encrypt(&nightscout_settings()).unwrap();
        let trimmed = format!("  {}\n", payload.trim_end_matches('='));
        assert_eq!(store.decrypt(&trimmed), Some(nightscout_settings()));
    }

    #[test]
    fn migrates_plaintext_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path()).unwrap();
        let legacy = r#"{
            "nightscout_url": "https://cgm.example.org",
            "api_secret": "token",
            "api_secret_sha1": "abc",
            "dark_mode": true,
            "minimize_to_tray": true,
            "refresh_interval": 45
        }"#;
        fs::write(store.config_path(), legacy).unwrap();

        let settings = store.load();
        assert_eq!(settings.refresh_interval_secs, 45);
        assert!(matches!(
            &settings.connection,
            ConnectionConfig::Nightscout { base_url, .. } if base_url == "https://cgm.example.org"
        ));

        let on_disk = fs::read_to_string(store.config_path()).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&on_disk).is_err());
        assert_eq!(store.decrypt(&on_disk), Some(settings));
    }

    #[test]
    fn garbage_falls_back_to_setup() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path()).unwrap();
        fs::write(store.config_path(), "definitely not a config").unwrap();
        let settings = store.load();
        assert_eq!(settings, Settings::default());
        assert!(settings.needs_setup());
    }

    #[test]
    fn other_key_cannot_decrypt() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let payload = ConfigStore::open(a.path())
            .unwrap()
            .encrypt(&nightscout_settings())
            .unwrap();
        assert_eq!(ConfigStore::open(b.path()).unwrap().decrypt(&payload), None);
    }

    #[test]
    fn key_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        ConfigStore::open(dir.path()).unwrap();
        let first = fs::read_to_string(dir.path().join(KEY_FILENAME)).unwrap();
        ConfigStore::open(dir.path()).unwrap();
        let second = fs::read_to_string(dir.path().join(KEY_FILENAME)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn refresh_interval_is_clamped() {
        let stored = StoredSettings {
            refresh_interval: Some(1),
            ..Default::default()
        };
        assert_eq!(Settings::from(stored).refresh_interval_secs, MIN_REFRESH_SECS);
        let stored = StoredSettings {
            refresh_interval: Some(3600),
            ..Default::default()
        };
        assert_eq!(Settings::from(stored).refresh_interval_secs, MAX_REFRESH_SECS);
    }
}
