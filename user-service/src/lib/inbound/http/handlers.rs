use auth::TokenPair;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::user::models::User;
use crate::domain::user::models::UserSession;
use crate::user::errors::UserError;

pub mod get_user;
pub mod list_users;
pub mod login;
pub mod signup;

/// Message returned for every credential or token failure.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const INVALID_TOKEN: &str = "Invalid or expired token";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::EmailAlreadyExists(_) | UserError::PhoneAlreadyExists(_) => {
                ApiError::Conflict(err.to_string())
            }
            UserError::InvalidCredentials => ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()),
            UserError::InvalidName(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPhone(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidUserType(_) => ApiError::UnprocessableEntity(err.to_string()),
            UserError::InvalidUserId(_) => ApiError::BadRequest(err.to_string()),
            UserError::Password(_) | UserError::Token(_) | UserError::DatabaseError(_) => {
                tracing::error!(error = %err, "Internal fault while handling request");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::UnprocessableEntity(rejection.body_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Public view of a user. Never includes the password hash or tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub user_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            phone: user.phone.as_str().to_string(),
            user_type: user.user_type.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response to signup and login: the user plus the freshly issued pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub user: UserData,
    pub token: String,
    pub refresh_token: String,
}

impl From<&UserSession> for SessionResponseData {
    fn from(session: &UserSession) -> Self {
        let TokenPair {
            access_token,
            refresh_token,
        } = session.tokens.clone();

        Self {
            user: (&session.user).into(),
            token: access_token,
            refresh_token,
        }
    }
}
