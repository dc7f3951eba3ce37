use auth::require_role;
use auth::AuthenticatedContext;
use auth::Role;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
) -> Result<ApiSuccess<Vec<UserData>>, ApiError> {
    if !require_role(&context, Role::Admin).is_allowed() {
        tracing::warn!(caller = %context.user_id(), "User listing denied: ADMIN required");
        return Err(ApiError::Forbidden(
            "Not allowed to access this resource".to_string(),
        ));
    }

    state
        .user_service
        .list_users()
        .await
        .map_err(ApiError::from)
        .map(|users| ApiSuccess::new(StatusCode::OK, users.iter().map(UserData::from).collect()))
}
