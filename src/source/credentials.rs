//! Up-front checks on Share credentials so obviously bad input never
//! reaches the login endpoint.

use super::FetchError;

pub const MAX_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PHONE_DIGITS: usize = 10;

const FORBIDDEN: &[char] = &['<', '>', '"', '\\'];

/// How the account is identified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountKind {
    Email,
    Phone,
    Username,
}

pub fn validate(username: &str, password: &str) -> Result<AccountKind, FetchError> {
    let username = username.trim();
    check_text("Username", username)?;
    check_text("Password", password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(format!(
            "Password troppo corta (minimo {MIN_PASSWORD_LEN} caratteri)"
        )));
    }
    account_kind(username)
}

fn check_text(field: &str, value: &str) -> Result<(), FetchError> {
    if value.is_empty() {
        return Err(invalid(format!("{field} obbligatorio")));
    }
    if value.chars().count() > MAX_LEN {
        return Err(invalid(format!("{field} troppo lungo (massimo {MAX_LEN} caratteri)")));
    }
    if value.chars().any(char::is_control) {
        return Err(invalid(format!("{field} contiene caratteri di controllo")));
    }
    if value.chars().all(char::is_whitespace) {
        return Err(invalid(format!("{field} non stampabile")));
    }
    if let Some(c) = value.chars().find(|c| FORBIDDEN.contains(c)) {
        return Err(invalid(format!("{field} contiene un carattere non ammesso: {c}")));
    }
    Ok(())
}

fn account_kind(username: &str) -> Result<AccountKind, FetchError> {
    if username.contains('@') {
        let mut parts = username.split('@');
        let domain = match (parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(domain), None) => domain,
            _ => return Err(invalid("Email non valida: deve contenere una sola @".into())),
        };
        if !domain.contains('.') {
            return Err(invalid("Email non valida: dominio senza punto".into()));
        }
        return Ok(AccountKind::Email);
    }
    if let Some(number) = username.strip_prefix('+') {
        let digits = number.chars().filter(char::is_ascii_digit).count();
        if digits < MIN_PHONE_DIGITS {
            return Err(invalid(format!(
                "Numero di telefono non valido (almeno {MIN_PHONE_DIGITS} cifre)"
            )));
        }
        return Ok(AccountKind::Phone);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(invalid(format!(
            "Username troppo corto (minimo {MIN_USERNAME_LEN} caratteri)"
        )));
    }
    Ok(AccountKind::Username)
}

fn invalid(msg: String) -> FetchError {
    FetchError::InvalidCredentials(msg)
}
