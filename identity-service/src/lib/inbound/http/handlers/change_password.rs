use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::models::ChangePasswordCommand;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    jar: CookieJar,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, ApiSuccess<ChangePasswordResponseData>), ApiError> {
    let command = ChangePasswordCommand::new(body.old_password, body.new_password)?;
    let changed = state
        .session_service
        .change_password(&user.user_id, command)
        .await?;

    // A revoked session cannot be refreshed, so drop its cookies too.
    let jar = if changed.session_revoked {
        state.cookies.clear(jar)
    } else {
        jar
    };

    Ok((
        jar,
        ApiSuccess::new(
            StatusCode::OK,
            ChangePasswordResponseData {
                session_revoked: changed.session_revoked,
            },
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    old_password: String,
    new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordResponseData {
    pub session_revoked: bool,
}
