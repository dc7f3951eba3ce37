use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use crate::domain::user::models::LoginCommand;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    let Json(body) = payload?;
    let command = LoginCommand::new(&body.email, body.password);

    state
        .user_service
        .login(command)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
