use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParsingError {
    #[error("Invalid key-value list: {0}")]
    InvalidKeyVal(String),
    #[error("Invalid authorization header: {0}")]
    InvalidAuthorization(String),
}

type Result<T> = std::result::Result<T, ParsingError>;

pub fn parse_cookie_str(cookie_str: &str) -> Result<HashMap<String, String>> {
    parse_kv_list(cookie_str, ';')
}

/// Parse the token out of a `Bearer <token>` authorization header.
pub fn parse_bearer_token(header: &str) -> Result<String> {
    let mut parts = header.trim().splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim().to_string())
        }
        _ => Err(ParsingError::InvalidAuthorization(header.to_string())),
    }
}

/// Parse a list of key-value pairs separated by `sep`. Usually from a cookie string.
fn parse_kv_list(s: &str, sep: char) -> Result<HashMap<String, String>> {
    let mut results = HashMap::new();
    for param in s.split(sep) {
        if param.contains('=') {
            let mut parts = param.splitn(2, '=');
            let key = parts.next().ok_or(ParsingError::InvalidKeyVal(param.to_string()))?;
            let value = parts.next().ok_or(ParsingError::InvalidKeyVal(param.to_string()))?;
            results.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(results)
}
