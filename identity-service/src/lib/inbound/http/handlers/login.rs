use auth::TokenPair;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::Session;
use crate::domain::user::models::UserProfile;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionResponseData>), ApiError> {
    let command = LoginCommand::new(body.identifier, body.password)?;
    let session = state.session_service.login(command).await?;

    let jar = state.cookies.set(jar, &session.tokens);
    Ok((jar, ApiSuccess::new(StatusCode::OK, session.into())))
}

/// `identifier` is a username or an email; either field name is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    identifier: String,
    password: String,
}

/// Body of login and refresh responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponseData {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<Session> for SessionResponseData {
    fn from(session: Session) -> Self {
        let TokenPair {
            access_token,
            refresh_token,
        } = session.tokens;

        Self {
            user: session.user,
            access_token,
            refresh_token,
        }
    }
}
