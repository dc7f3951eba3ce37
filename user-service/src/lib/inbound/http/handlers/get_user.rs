use auth::require_self_or_role;
use auth::AuthenticatedContext;
use auth::Role;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

/// A user may read their own record; anyone else needs `ADMIN`.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if !require_self_or_role(&context, &user_id.to_string(), Role::Admin).is_allowed() {
        tracing::warn!(
            caller = %context.user_id(),
            target = %user_id,
            "Access to another user's record denied"
        );
        return Err(ApiError::Forbidden(
            "Not allowed to access this resource".to_string(),
        ));
    }

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
