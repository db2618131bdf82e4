use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use crate::domain::user::models::UserProfile;
use crate::inbound::http::middleware::AuthenticatedUser;

pub async fn current_user(
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiSuccess<UserProfile> {
    ApiSuccess::new(StatusCode::OK, user.profile)
}
