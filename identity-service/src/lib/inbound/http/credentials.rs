use axum::http::header;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::inbound::http::cookies::ACCESS_TOKEN_COOKIE;

/// Where the request gate looks for the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// `Authorization: Bearer <token>`
    Header,
    /// The `accessToken` cookie
    Cookie,
    /// Cookie first, then the header
    #[default]
    HeaderOrCookie,
}

impl CredentialSource {
    /// Pull the access token out of the request headers, if present.
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        match self {
            CredentialSource::Header => from_authorization(headers),
            CredentialSource::Cookie => from_cookie(headers),
            CredentialSource::HeaderOrCookie => {
                from_cookie(headers).or_else(|| from_authorization(headers))
            }
        }
    }
}

fn from_cookie(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}

fn from_authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
