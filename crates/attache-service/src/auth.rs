use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::warn;

use crate::AuthType;

/// Set the `Authorization` header for the configured auth mode.
///
/// * `basic`: `Basic base64(login:token)`
/// * `bearer`: `Bearer <token>`
/// * `mtls`: `Bearer <token>` when a token is configured; the client
///   certificate carries the identity otherwise.
///
/// Never fails. Missing credentials, or credentials that cannot be sent as a
/// header value, leave the request unauthenticated for the server to reject.
/// Any existing `Authorization` header is replaced.
pub fn apply_auth(
    headers: &mut HeaderMap,
    auth_type: AuthType,
    login: &str,
    token: Option<&str>,
) {
    let token = token.filter(|t| !t.is_empty());

    let value = match auth_type {
        AuthType::Basic => {
            if login.is_empty() && token.is_none() {
                None
            } else {
                let raw = format!("{login}:{}", token.unwrap_or_default());
                Some(format!("Basic {}", STANDARD.encode(raw)))
            }
        }
        AuthType::Bearer | AuthType::Mtls => token.map(|t| format!("Bearer {t}")),
    };

    let Some(value) = value else {
        headers.remove(AUTHORIZATION);
        return;
    };

    match HeaderValue::from_str(&value) {
        Ok(mut header) => {
            header.set_sensitive(true);
            headers.insert(AUTHORIZATION, header);
        }
        Err(_) => {
            warn!(
                "{auth_type} credentials contain characters not allowed in a header, \
                 sending request unauthenticated"
            );
            headers.remove(AUTHORIZATION);
        }
    }
}
