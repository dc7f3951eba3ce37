use auth::Role;
use auth::RoleError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::SignupCommand;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::PersonNameError;
use crate::user::errors::PhoneError;

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .user_service
        .signup(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SignupRequest {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    password: String,
    user_type: String,
}

#[derive(Debug, Clone, Error)]
enum ParseSignupRequestError {
    #[error("Invalid first name: {0}")]
    FirstName(PersonNameError),

    #[error("Invalid last name: {0}")]
    LastName(PersonNameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid phone: {0}")]
    Phone(#[from] PhoneError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),

    #[error("Invalid user type: {0}")]
    UserType(#[from] RoleError),
}

impl SignupRequest {
    fn try_into_command(self) -> Result<SignupCommand, ParseSignupRequestError> {
        let first_name =
            PersonName::new(self.first_name).map_err(ParseSignupRequestError::FirstName)?;
        let last_name =
            PersonName::new(self.last_name).map_err(ParseSignupRequestError::LastName)?;
        let email = EmailAddress::new(self.email)?;
        let phone = PhoneNumber::new(self.phone)?;
        let password = Password::new(self.password)?;
        let user_type: Role = self.user_type.parse()?;

        Ok(SignupCommand {
            first_name,
            last_name,
            email,
            phone,
            password,
            user_type,
        })
    }
}

impl From<ParseSignupRequestError> for ApiError {
    fn from(err: ParseSignupRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
