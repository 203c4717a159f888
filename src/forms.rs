//! Editable copies of the settings behind the setup and settings windows.
//! A form never touches the live settings: saving builds a new `Settings`.

use reqwest::Url;

use crate::config::{ConnectionConfig, Settings, clamp_refresh};
use crate::source::FetchError;
use crate::source::credentials;
use crate::source::dexcom::Region;
use crate::source::nightscout::hash_secret;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Nightscout,
    Dexcom,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Nightscout => "Nightscout",
            SourceKind::Dexcom => "Dexcom Share",
        }
    }
}

#[derive(Clone, Debug)]
pub struct SettingsForm {
    pub kind: SourceKind,
    pub nightscout_url: String,
    pub token: String,
    /// Hash kept from the stored settings; replaced when a token is typed.
    pub stored_sha1: String,
    pub username: String,
    pub password: String,
    pub region: Region,
    pub refresh_interval_secs: u64,
    pub minimize_to_tray: bool,
    pub autostart: bool,
    dark_mode: bool,
    pub error: Option<String>,
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings) -> Self {
        let mut form = Self {
            kind: SourceKind::Nightscout,
            nightscout_url: String::new(),
            token: String::new(),
            stored_sha1: String::new(),
            username: String::new(),
            password: String::new(),
            region: Region::Ous,
            refresh_interval_secs: clamp_refresh(settings.refresh_interval_secs),
            minimize_to_tray: settings.minimize_to_tray,
            autostart: settings.autostart,
            dark_mode: settings.dark_mode,
            error: None,
        };
        match &settings.connection {
            ConnectionConfig::Nightscout {
                base_url,
                token,
                token_sha1,
            } => {
                form.nightscout_url = base_url.clone();
                form.token = token.clone();
                form.stored_sha1 = token_sha1.clone();
            }
            ConnectionConfig::DexcomShare {
                username,
                password,
                region,
            } => {
                form.kind = SourceKind::Dexcom;
                form.username = username.clone();
                form.password = password.clone();
                form.region = region.parse().unwrap_or(Region::Ous);
            }
        }
        form
    }

    /// SHA-1 sent as `api-secret`: computed from the token when there is
    /// one, otherwise the hash that was already stored.
    pub fn token_sha1(&self) -> String {
        if self.token.trim().is_empty() {
            self.stored_sha1.trim().to_string()
        } else {
            hash_secret(&self.token)
        }
    }

    /// Checks the form and builds the settings it describes.
    pub fn build(&self) -> Result<Settings, FetchError> {
        let connection = match self.kind {
            SourceKind::Nightscout => {
                let base_url = self.nightscout_url.trim().trim_end_matches('/').to_string();
                check_site_url(&base_url)?;
                ConnectionConfig::Nightscout {
                    base_url,
                    token: self.token.trim().to_string(),
                    token_sha1: self.token_sha1(),
                }
            }
            SourceKind::Dexcom => {
                credentials::validate(&self.username, &self.password)?;
                ConnectionConfig::DexcomShare {
                    username: self.username.trim().to_string(),
                    password: self.password.clone(),
                    region: self.region.code().to_string(),
                }
            }
        };
        Ok(Settings {
            connection,
            refresh_interval_secs: clamp_refresh(self.refresh_interval_secs),
            minimize_to_tray: self.minimize_to_tray,
            autostart: self.autostart,
            dark_mode: self.dark_mode,
        })
    }
}

fn check_site_url(base_url: &str) -> Result<(), FetchError> {
    if base_url.is_empty() {
        return Err(FetchError::InvalidCredentials("URL Nightscout obbligatorio".into()));
    }
    let url = Url::parse(base_url)
        .map_err(|e| FetchError::InvalidCredentials(format!("URL Nightscout non valido: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(FetchError::InvalidCredentials(
            "l'URL deve iniziare con http:// o https://".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_REFRESH_SECS, MIN_REFRESH_SECS};

    fn nightscout_form() -> SettingsForm {
        let mut form = SettingsForm::from_settings(&Settings::default());
        form.nightscout_url = " https://cgm.example.org/ ".into();
        form.token = "token-api-secret".into();
        form
    }

    #[test]
    fn defaults_to_nightscout() {
        let form = SettingsForm::from_settings(&Settings::default());
        assert_eq!(form.kind, SourceKind::Nightscout);
        assert_eq!(form.refresh_interval_secs, 30);
        assert_eq!(form.region, Region::Ous);
    }

    #[test]
    fn builds_nightscout_settings_with_hash() {
        let settings = nightscout_form().build().unwrap();
        match settings.connection {
            ConnectionConfig::Nightscout {
                base_url,
                token,
                token_sha1,
            } => {
                assert_eq!(base_url, "https://cgm.example.org");
                assert_eq!(token, "token-api-secret");
                assert_eq!(token_sha1, hash_secret("token-api-secret"));
                assert_eq!(token_sha1.len(), 40);
            }
            other => panic!("unexpected connection {other:?}"),
        }
    }

    #[test]
    fn keeps_stored_hash_without_token() {
        let mut form = nightscout_form();
        form.token.clear();
        form.stored_sha1 = "abc123".into();
        assert_eq!(form.token_sha1(), "abc123");
    }

    #[test]
    fn rejects_bad_site_urls() {
        for url in ["", "cgm.example.org", "ftp://cgm.example.org"] {
            let mut form = nightscout_form();
            form.nightscout_url = url.into();
            assert!(
                matches!(form.build(), Err(FetchError::InvalidCredentials(_))),
                "{url:?} accepted"
            );
        }
    }

    #[test]
    fn dexcom_credentials_are_validated() {
        let mut form = SettingsForm::from_settings(&Settings::default());
        form.kind = SourceKind::Dexcom;
        form.username = "ab".into();
        form.password = "segreta123".into();
        assert!(matches!(form.build(), Err(FetchError::InvalidCredentials(_))));

        form.username = "  mario.rossi@example.it ".into();
        form.region = Region::Jp;
        let settings = form.build().unwrap();
        assert_eq!(
            settings.connection,
            ConnectionConfig::DexcomShare {
                username: "mario.rossi@example.it".into(),
                password: "segreta123".into(),
                region: "jp".into(),
            }
        );
    }

    #[test]
    fn refresh_interval_is_clamped() {
        let mut form = nightscout_form();
        form.refresh_interval_secs = 5;
        assert_eq!(form.build().unwrap().refresh_interval_secs, MIN_REFRESH_SECS);
        form.refresh_interval_secs = 3600;
        assert_eq!(form.build().unwrap().refresh_interval_secs, MAX_REFRESH_SECS);
    }

    #[test]
    fn round_trips_existing_settings() {
        let original = nightscout_form().build().unwrap();
        let reopened = SettingsForm::from_settings(&original);
        assert_eq!(reopened.build().unwrap(), original);
    }
}
