//! Dexcom Share client: account login, session handling and the latest
//! glucose values endpoint.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{DataSource, FetchError, credentials};
use crate::reading::{self, Direction, Reading};

const SERVICES_PATH: &str = "/ShareWebServices/Services";
const AUTHENTICATE: &str = "/General/AuthenticatePublisherAccount";
const LOGIN: &str = "/General/LoginPublisherAccountById";
const READ_VALUES: &str = "/Publisher/ReadPublisherLatestGlucoseValues";

/// Look-back window for the latest values request.
const HISTORY_MINUTES: u32 = 1440;
const NIL_UUID: &str = "00000000-0000-0000-0000-000000000000";
const MMOL_PER_MGDL: f64 = 0.0555;

/// Share account region, selects the API host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Us,
    Ous,
    Jp,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Us, Region::Ous, Region::Jp];

    pub fn code(self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Ous => "ous",
            Region::Jp => "jp",
        }
    }

    pub fn host(self) -> &'static str {
        match self {
            Region::Us => "https://share2.dexcom.com",
            Region::Ous => "https://shareous1.dexcom.com",
            Region::Jp => "https://share.dexcom.jp",
        }
    }

    pub fn application_id(self) -> &'static str {
        match self {
            Region::Us | Region::Ous => "d89443d2-327c-4a6f-89e5-496bbb0317db",
            Region::Jp => "d8665ade-9673-4e27-9ff6-92db4ce13d13",
        }
    }

    fn endpoint(self, path: &str) -> String {
        format!("{}{SERVICES_PATH}{path}", self.host())
    }
}

impl FromStr for Region {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "ous" => Ok(Region::Ous),
            "jp" => Ok(Region::Jp),
            other => Err(FetchError::RegionInvalid(format!(
                "'{other}' (valori ammessi: us, ous, jp)"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ShareValue {
    #[serde(rename = "WT")]
    wt: String,
    #[serde(rename = "Value")]
    value: i32,
    #[serde(rename = "Trend")]
    trend: Trend,
}

/// Older Share hosts send the trend as a number, newer ones as a name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Trend {
    Name(String),
    Code(u8),
}

impl Trend {
    fn direction(&self) -> Option<Direction> {
        match self {
            Trend::Name(name) => Direction::parse(name),
            Trend::Code(code) => Direction::from_code(*code),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ServiceError {
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

enum ShareError {
    SessionExpired,
    Fetch(FetchError),
}

impl From<ShareError> for FetchError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::SessionExpired => FetchError::Auth("sessione non valida".into()),
            ShareError::Fetch(err) => err,
        }
    }
}

struct Session {
    region: Region,
    id: String,
}

pub struct DexcomClient {
    http: Client,
    username: String,
    password: String,
    region: String,
    session: Option<Session>,
    last_error: Option<FetchError>,
}

impl DexcomClient {
    pub fn new(http: Client, username: &str, password: &str, region: &str) -> Self {
        Self {
            http,
            username: username.trim().to_string(),
            password: password.to_string(),
            region: region.to_string(),
            session: None,
            last_error: None,
        }
    }

    /// Validates the credentials, then authenticates and opens a session.
    fn connect(&mut self) -> Result<(), FetchError> {
        self.session = None;
        credentials::validate(&self.username, &self.password)?;
        let region: Region = self.region.parse()?;

        let account_id: String = self.post(
            region,
            AUTHENTICATE,
            &[],
            Some(json!({
                "accountName": self.username,
                "password": self.password,
                "applicationId": region.application_id(),
            })),
        )?;
        if account_id == NIL_UUID {
            return Err(FetchError::Auth("account non trovato".into()));
        }

        let session_id: String = self.post(
            region,
            LOGIN,
            &[],
            Some(json!({
                "accountId": account_id,
                "password": self.password,
                "applicationId": region.application_id(),
            })),
        )?;
        if session_id == NIL_UUID {
            return Err(FetchError::Auth("login rifiutato".into()));
        }

        info!("connected to Dexcom Share ({})", region.code());
        self.session = Some(Session {
            region,
            id: session_id,
        });
        self.last_error = None;
        Ok(())
    }

    fn read_values(&self, count: usize) -> Result<Vec<ShareValue>, ShareError> {
        let Some(session) = &self.session else {
            return Err(ShareError::SessionExpired);
        };
        self.post(
            session.region,
            READ_VALUES,
            &[
                ("sessionId", session.id.clone()),
                ("minutes", HISTORY_MINUTES.to_string()),
                ("maxCount", count.to_string()),
            ],
            None,
        )
    }

    fn post<T: DeserializeOwned>(
        &self,
        region: Region,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ShareError> {
        debug!("POST {}{path}", region.host());
        let mut request = self
            .http
            .post(region.endpoint(path))
            .query(query)
            .header("Accept", "application/json");
        request = match body {
            Some(body) => request.json(&body),
            None => request.header("Content-Length", "0"),
        };
        let response = request
            .send()
            .map_err(|e| ShareError::Fetch(transport_error(e)))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ShareError::Fetch(transport_error(e)))?;
        if status.is_success() {
            return serde_json::from_str(&text)
                .map_err(|e| ShareError::Fetch(FetchError::Parse(e.to_string())));
        }
        let service: ServiceError = serde_json::from_str(&text).unwrap_or_default();
        match service.code {
            Some(code) => Err(classify_code(&code, service.message.as_deref().unwrap_or(""))),
            None if text.trim().is_empty() => Err(ShareError::Fetch(FetchError::Http {
                status: status.as_u16(),
                body: String::new(),
            })),
            None => Err(ShareError::Fetch(classify_text(&text))),
        }
    }

    fn fail(&mut self, err: FetchError) -> FetchError {
        warn!("dexcom fetch failed: {err}");
        self.session = None;
        self.last_error = Some(err.clone());
        err
    }
}

impl DataSource for DexcomClient {
    fn fetch_latest(&mut self, count: usize) -> Result<Vec<Reading>, FetchError> {
        if self.session.is_none() {
            if let Err(err) = self.connect() {
                return Err(self.fail(err));
            }
        }

        let values = match self.read_values(count) {
            Ok(values) => values,
            Err(ShareError::SessionExpired) => {
                info!("share session expired, logging in again");
                if let Err(err) = self.connect() {
                    return Err(self.fail(err));
                }
                match self.read_values(count) {
                    Ok(values) => values,
                    Err(err) => return Err(self.fail(err.into())),
                }
            }
            Err(ShareError::Fetch(err)) => return Err(self.fail(err)),
        };

        normalize(values)
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    fn label(&self) -> &'static str {
        "Dexcom Share"
    }
}

/// Share values to readings, newest first, with the delta computed locally
/// because Share does not report one.
fn normalize(values: Vec<ShareValue>) -> Result<Vec<Reading>, FetchError> {
    if values.is_empty() {
        return Err(FetchError::Empty);
    }
    let mut readings: Vec<Reading> = values
        .into_iter()
        .map(|v| {
            let date_string = parse_share_date(&v.wt)
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_else(|| v.wt.clone());
            let mmol = (f64::from(v.value) * MMOL_PER_MGDL * 10.0).round() / 10.0;
            Reading::new(v.value, v.trend.direction(), date_string, 0.0).with_mmol_l(mmol)
        })
        .collect();
    reading::sort_newest_first(&mut readings);
    Ok(reading::with_local_delta(readings))
}

/// Parses `Date(1691455258000-0400)`: epoch millis with an optional offset.
fn parse_share_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let inner = raw.trim().strip_prefix("Date(")?.strip_suffix(')')?;
    let split = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i);
    let (millis, offset) = match split {
        Some(i) => (&inner[..i], parse_offset(&inner[i..])?),
        None => (inner, FixedOffset::east_opt(0)?),
    };
    let utc = DateTime::<Utc>::from_timestamp_millis(millis.parse().ok()?)?;
    Some(utc.with_timezone(&offset))
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, digits) = match raw.split_at(1) {
        ("+", d) => (1, d),
        ("-", d) => (-1, d),
        _ => return None,
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Structured service codes first, text matching as a fallback.
fn classify_code(code: &str, message: &str) -> ShareError {
    match code {
        "SessionIdNotFound" | "SessionNotValid" => ShareError::SessionExpired,
        "AccountPasswordInvalid"
        | "SSO_AuthenticatePasswordInvalid"
        | "SSO_AuthenticateAccountNotFound"
        | "SSO_AuthenticateMaxAttemptsExceeed" => {
            let detail = if message.is_empty() { code } else { message };
            ShareError::Fetch(FetchError::Auth(detail.to_string()))
        }
        _ => ShareError::Fetch(classify_text(&format!("{code}: {message}"))),
    }
}

/// The URL is dropped before any text matching: Share paths contain
/// "Account" and "Login".
fn transport_error(err: reqwest::Error) -> FetchError {
    let err = err.without_url();
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        FetchError::Network(err.to_string())
    } else {
        classify_text(&err.to_string())
    }
}

/// Best-effort guess from free-form error text. Not exhaustive.
pub fn classify_text(text: &str) -> FetchError {
    const AUTH: &[&str] = &["auth", "password", "credential", "account", "login"];
    const NETWORK: &[&str] = &["network", "connect", "timed out", "timeout", "dns", "resolve", "unreachable"];

    let lower = text.to_lowercase();
    let detail = text.trim().to_string();
    if lower.contains("region") {
        FetchError::RegionInvalid(detail)
    } else if AUTH.iter().any(|k| lower.contains(k)) {
        FetchError::Auth(detail)
    } else if NETWORK.iter().any(|k| lower.contains(k)) {
        FetchError::Network(detail)
    } else {
        FetchError::Unknown(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(wt: &str, v: i32, trend: &str) -> ShareValue {
        ShareValue {
            wt: wt.to_string(),
            value: v,
            trend: Trend::Name(trend.to_string()),
        }
    }

    #[test]
    fn regions() {
        assert_eq!("US".parse::<Region>(), Ok(Region::Us));
        assert_eq!(" ous ".parse::<Region>(), Ok(Region::Ous));
        assert_eq!("jp".parse::<Region>(), Ok(Region::Jp));
        assert!(matches!("eu".parse::<Region>(), Err(FetchError::RegionInvalid(_))));
        assert_eq!(
            Region::Ous.endpoint(LOGIN),
            "https://shareous1.dexcom.com/ShareWebServices/Services/General/LoginPublisherAccountById"
        );
        assert_ne!(Region::Jp.application_id(), Region::Us.application_id());
    }

    #[test]
    fn parses_share_dates() {
        let ts = parse_share_date("Date(1691455258000-0400)").unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-08-07T20:40:58-04:00");
        let ts = parse_share_date("Date(1691455258000)").unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-08-08T00:40:58+00:00");
        assert!(parse_share_date("/Date(abc)/").is_none());
        assert!(parse_share_date("Date(1691455258000-04)").is_none());
    }

    #[test]
    fn parses_values_payload() {
        let body = r#"[
            {"WT":"Date(1691455258000)","ST":"Date(1691455258000)","DT":"Date(1691455258000+0200)","Value":120,"Trend":"Flat"},
            {"WT":"Date(1691454958000)","ST":"Date(1691454958000)","DT":"Date(1691454958000+0200)","Value":115,"Trend":4}
        ]"#;
        let values: Vec<ShareValue> = serde_json::from_str(body).unwrap();
        assert_eq!(values[1].trend.direction(), Some(Direction::Flat));
        let readings = normalize(values).unwrap();
        assert_eq!(readings[0].value, 120);
        assert_eq!(readings[0].delta, 5.0);
        assert_eq!(readings[0].mmol_l, Some(6.7));
        assert_eq!(readings[0].direction, Some(Direction::Flat));
    }

    #[test]
    fn delta_uses_newest_even_if_sent_out_of_order() {
        let readings = normalize(vec![
            value("Date(1691454958000)", 115, "Flat"),
            value("Date(1691455258000)", 120, "SingleUp"),
        ])
        .unwrap();
        assert_eq!(readings[0].value, 120);
        assert_eq!(readings[0].delta, 5.0);
    }

    #[test]
    fn single_value_keeps_zero_delta() {
        let readings = normalize(vec![value("Date(1691455258000)", 120, "Flat")]).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].delta, 0.0);
    }

    #[test]
    fn no_values_is_empty() {
        assert_eq!(normalize(Vec::new()), Err(FetchError::Empty));
    }

    #[test]
    fn classifies_error_text() {
        assert!(matches!(classify_text("Authentication failed"), FetchError::Auth(_)));
        assert!(matches!(classify_text("AccountPasswordInvalid"), FetchError::Auth(_)));
        assert!(matches!(classify_text("Network is unreachable"), FetchError::Network(_)));
        assert!(matches!(classify_text("operation timed out"), FetchError::Network(_)));
        assert!(matches!(classify_text("Invalid region"), FetchError::RegionInvalid(_)));
        assert!(matches!(classify_text("something odd"), FetchError::Unknown(_)));
    }

    #[test]
    fn classifies_service_codes() {
        assert!(matches!(classify_code("SessionIdNotFound", ""), ShareError::SessionExpired));
        assert!(matches!(
            classify_code("SSO_AuthenticateMaxAttemptsExceeed", "too many"),
            ShareError::Fetch(FetchError::Auth(m)) if m == "too many"
        ));
        assert!(matches!(
            classify_code("InvalidArgument", "bad argument"),
            ShareError::Fetch(FetchError::Unknown(_))
        ));
    }

    #[test]
    fn dropped_login_connection_is_network_error() {
        use std::io::Read;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
        });

        let url = format!("http://127.0.0.1:{port}{SERVICES_PATH}{AUTHENTICATE}");
        let err = Client::new().post(url).send().unwrap_err();
        server.join().unwrap();
        assert!(matches!(transport_error(err), FetchError::Network(_)));
    }

    #[test]
    fn invalid_credentials_fail_without_network() {
        let mut client = DexcomClient::new(Client::new(), "ab", "segreta1", "ous");
        let err = client.fetch_latest(2).unwrap_err();
        assert!(matches!(err, FetchError::InvalidCredentials(_)));
        assert_eq!(client.last_error(), Some(&err));
        assert!(!client.is_connected());

        let mut client = DexcomClient::new(Client::new(), "mrossi", "segreta1", "mars");
        assert!(matches!(client.fetch_latest(2), Err(FetchError::RegionInvalid(_))));
    }
}
