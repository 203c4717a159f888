//! Data sources: a Nightscout site or a Dexcom Share account, both behind
//! the same `fetch_latest` contract.

pub mod credentials;
pub mod dexcom;
pub mod nightscout;

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::ConnectionConfig;
use crate::reading::Reading;

pub use dexcom::DexcomClient;
pub use nightscout::NightscoutClient;

/// Readings requested per cycle: the newest plus one for the delta fallback.
pub const FETCH_COUNT: usize = 2;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Why a fetch cycle failed. Every variant ends the current cycle only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    Http { status: u16, body: String },
    Empty,
    Parse(String),
    Network(String),
    Auth(String),
    InvalidCredentials(String),
    RegionInvalid(String),
    Unknown(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http { status, body } if body.is_empty() => write!(f, "Errore HTTP {status}"),
            FetchError::Http { status, body } => write!(f, "Errore HTTP {status}: {body}"),
            FetchError::Empty => write!(f, "Nessun dato disponibile"),
            FetchError::Parse(msg) => write!(f, "Risposta non valida: {msg}"),
            FetchError::Network(msg) => write!(f, "Errore di rete: {msg}"),
            FetchError::Auth(msg) => write!(f, "Autenticazione fallita: {msg}"),
            FetchError::InvalidCredentials(msg) => write!(f, "Credenziali non valide: {msg}"),
            FetchError::RegionInvalid(msg) => write!(f, "Regione non valida: {msg}"),
            FetchError::Unknown(msg) => write!(f, "Errore: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
                body: String::new(),
            }
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else if err.is_timeout() || err.is_connect() || err.is_request() {
            FetchError::Network(err.to_string())
        } else {
            FetchError::Unknown(err.to_string())
        }
    }
}

/// A backend able to produce the most recent readings, newest first.
///
/// Implementations reconnect on demand: when not connected, `fetch_latest`
/// first re-establishes the connection and fails with the connection error
/// if that does not work.
pub trait DataSource: Send {
    fn fetch_latest(&mut self, count: usize) -> Result<Vec<Reading>, FetchError>;

    fn is_connected(&self) -> bool;

    fn last_error(&self) -> Option<&FetchError>;

    fn label(&self) -> &'static str;
}

/// The configured backend.
pub enum Source {
    Nightscout(NightscoutClient),
    Dexcom(DexcomClient),
}

impl Source {
    pub fn from_connection(connection: &ConnectionConfig, http: Client) -> Self {
        match connection {
            ConnectionConfig::Nightscout {
                base_url,
                token,
                token_sha1,
            } => {
                let hashed = if token_sha1.trim().is_empty() && !token.trim().is_empty() {
                    nightscout::hash_secret(token)
                } else {
                    token_sha1.trim().to_string()
                };
                Source::Nightscout(NightscoutClient::new(http, base_url, hashed))
            }
            ConnectionConfig::DexcomShare {
                username,
                password,
                region,
            } => Source::Dexcom(DexcomClient::new(http, username, password, region)),
        }
    }

    fn inner(&self) -> &dyn DataSource {
        match self {
            Source::Nightscout(client) => client,
            Source::Dexcom(client) => client,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn DataSource {
        match self {
            Source::Nightscout(client) => client,
            Source::Dexcom(client) => client,
        }
    }
}

impl DataSource for Source {
    fn fetch_latest(&mut self, count: usize) -> Result<Vec<Reading>, FetchError> {
        self.inner_mut().fetch_latest(count)
    }

    fn is_connected(&self) -> bool {
        self.inner().is_connected()
    }

    fn last_error(&self) -> Option<&FetchError> {
        self.inner().last_error()
    }

    fn label(&self) -> &'static str {
        self.inner().label()
    }
}

/// Shared blocking HTTP client for both backends.
pub fn http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("glik/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
}
