//! Nightscout `entries.json` client.

use log::{debug, warn};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{DataSource, FetchError};
use crate::reading::{Direction, Reading};

pub const ENTRIES_PATH: &str = "/api/v1/entries.json";

/// Entry as served by `/api/v1/entries.json`.
#[derive(Debug, Deserialize)]
struct Entry {
    sgv: i32,
    direction: String,
    #[serde(rename = "dateString")]
    date_string: String,
    #[serde(default)]
    delta: Option<f64>,
}

/// Lowercase hex SHA-1 of the API secret, the form Nightscout expects in
/// the `api-secret` header.
pub fn hash_secret(token: &str) -> String {
    hex::encode(Sha1::digest(token.trim().as_bytes()))
}

pub struct NightscoutClient {
    http: Client,
    base_url: String,
    secret_sha1: String,
    endpoint: Option<Url>,
    last_error: Option<FetchError>,
}

impl NightscoutClient {
    pub fn new(http: Client, base_url: &str, secret_sha1: String) -> Self {
        Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            secret_sha1,
            endpoint: None,
            last_error: None,
        }
    }

    #[cfg(test)]
    pub fn secret_sha1(&self) -> &str {
        &self.secret_sha1
    }

    /// Resolves the entries endpoint. Nightscout is stateless, so being
    /// "connected" only means the site address is usable.
    fn connect(&mut self) -> Result<(), FetchError> {
        let url = entries_url(&self.base_url)?;
        self.endpoint = Some(url);
        self.last_error = None;
        Ok(())
    }

    fn request(&self, url: Url, count: usize) -> Result<Vec<Reading>, FetchError> {
        debug!("GET {url} count={count}");
        let response = self
            .http
            .get(url)
            .query(&[("count", count.to_string()), ("find[type]", "sgv".to_string())])
            .header("api-secret", &self.secret_sha1)
            .header("Content-Type", "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                body: body.trim().chars().take(200).collect(),
            });
        }
        let body = response.text()?;
        parse_entries(&body)
    }
}

impl DataSource for NightscoutClient {
    fn fetch_latest(&mut self, count: usize) -> Result<Vec<Reading>, FetchError> {
        if self.endpoint.is_none() {
            if let Err(err) = self.connect() {
                self.last_error = Some(err.clone());
                return Err(err);
            }
        }
        let Some(url) = self.endpoint.clone() else {
            return Err(FetchError::Unknown("endpoint non inizializzato".into()));
        };
        let result = self.request(url, count);
        match &result {
            Ok(_) => self.last_error = None,
            Err(err) => {
                warn!("nightscout fetch failed: {err}");
                // Rejected or unreachable: not connected until a fetch succeeds.
                if matches!(err, FetchError::Http { .. } | FetchError::Network(_)) {
                    self.endpoint = None;
                }
                self.last_error = Some(err.clone());
            }
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.endpoint.is_some()
    }

    fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    fn label(&self) -> &'static str {
        "Nightscout"
    }
}

fn entries_url(base_url: &str) -> Result<Url, FetchError> {
    if base_url.is_empty() {
        return Err(FetchError::InvalidCredentials("URL Nightscout mancante".into()));
    }
    let url = Url::parse(&format!("{base_url}{ENTRIES_PATH}"))
        .map_err(|e| FetchError::InvalidCredentials(format!("URL Nightscout non valido: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidCredentials(format!(
            "schema URL non supportato: {other}"
        ))),
    }
}

/// Turns an `entries.json` body into readings, newest first. When the newest
/// entry carries no delta it is computed from the one before it.
fn parse_entries(body: &str) -> Result<Vec<Reading>, FetchError> {
    let entries: Vec<Entry> =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    if entries.is_empty() {
        return Err(FetchError::Empty);
    }
    let newest_has_delta = entries[0].delta.is_some();
    let readings: Vec<Reading> = entries
        .into_iter()
        .map(|e| {
            Reading::new(
                e.sgv,
                Direction::parse(&e.direction),
                e.date_string,
                e.delta.unwrap_or(0.0),
            )
        })
        .collect();
    if newest_has_delta {
        Ok(readings)
    } else {
        Ok(crate::reading::with_local_delta(readings))
    }
}
