use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::session::errors::SessionError;
use crate::domain::session::errors::UnauthenticatedReason;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated user in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub profile: UserProfile,
}

/// Middleware that resolves the access token to a user and adds it to
/// request extensions. Runs before every protected handler.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = state.credentials.extract(req.headers()).ok_or(
        SessionError::Unauthenticated(UnauthenticatedReason::MissingToken),
    )?;

    let profile = state.session_service.authenticate(&token).await?;

    let user_id = UserId::from_string(&profile.id).map_err(|e| {
        tracing::error!(error = %e, "Resolved profile carries an invalid id");
        ApiError::from(SessionError::Internal(e.to_string()))
    })?;

    tracing::debug!(user_id = %user_id, "Request authenticated");
    req.extensions_mut()
        .insert(AuthenticatedUser { user_id, profile });

    Ok(next.run(req).await)
}
