use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::login::SessionResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::cookies::REFRESH_TOKEN_COOKIE;
use crate::inbound::http::router::AppState;

/// Rotate the session. The refresh token comes from the cookie, or from the
/// JSON body for clients that do not keep cookies.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<(CookieJar, ApiSuccess<SessionResponseData>), ApiError> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| body.and_then(|Json(body)| body.refresh_token));

    let session = state
        .session_service
        .refresh(presented.as_deref())
        .await?;

    let jar = state.cookies.set(jar, &session.tokens);
    Ok((jar, ApiSuccess::new(StatusCode::OK, session.into())))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default, rename = "refreshToken")]
    refresh_token: Option<String>,
}
