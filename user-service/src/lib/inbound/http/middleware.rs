use auth::AuthenticationError;
use auth::TOKEN_HEADER;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::INVALID_TOKEN;
use crate::inbound::http::router::AppState;

/// Middleware that validates the `token` header and attaches the verified
/// `AuthenticatedContext` to request extensions.
///
/// Any failure ends the request here; the protected handler never runs.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match req.headers().get(TOKEN_HEADER) {
        Some(value) => Some(value.to_str().map_err(|_| {
            tracing::warn!("Token header is not valid ASCII");
            ApiError::Unauthorized(INVALID_TOKEN.to_string())
        })?),
        None => None,
    };

    let context = state
        .authenticator
        .authenticate(token)
        .map_err(|e| match e {
            AuthenticationError::MissingToken => {
                ApiError::BadRequest("Client token missing from request".to_string())
            }
            AuthenticationError::Unauthenticated(reason) => {
                tracing::warn!(reason = %reason, "Token validation failed");
                ApiError::Unauthorized(INVALID_TOKEN.to_string())
            }
        })?;

    tracing::debug!(user_id = %context.user_id(), role = %context.role(), "Request authenticated");
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use auth::AuthenticatedContext;
    use auth::Authenticator;
    use auth::Identity;
    use auth::Role;
    use auth::SessionIssuer;
    use auth::SigningKey;
    use auth::TokenCodec;
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::StatusCode;
    use axum::middleware;
    use axum::routing::get;
    use axum::Extension;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::user::service::UserService;
    use crate::outbound::repositories::InMemoryUserRepository;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(
            &SigningKey::new("test-secret-key-for-jwt-signing-at-least-32-bytes").unwrap(),
        ))
    }

    /// Router with one protected route that records whether it ran.
    fn app(codec: Arc<TokenCodec>, reached: Arc<AtomicBool>) -> Router {
        let session_issuer = Arc::new(SessionIssuer::new(Arc::clone(&codec)));
        let state = AppState {
            user_service: Arc::new(UserService::new(
                Arc::new(InMemoryUserRepository::new()),
                session_issuer,
            )),
            authenticator: Arc::new(Authenticator::new(codec)),
        };

        Router::new()
            .route(
                "/protected",
                get(move |Extension(context): Extension<AuthenticatedContext>| {
                    let reached = Arc::clone(&reached);
                    async move {
                        reached.store(true, Ordering::SeqCst);
                        context.user_id().to_string()
                    }
                }),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            .with_state(state)
    }

    fn access_token(codec: &Arc<TokenCodec>) -> String {
        SessionIssuer::new(Arc::clone(codec))
            .issue_tokens(&Identity {
                email: "a@x.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                uid: "42".to_string(),
                user_type: Role::User,
            })
            .unwrap()
            .access_token
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let codec = codec();
        let reached = Arc::new(AtomicBool::new(false));
        let token = access_token(&codec);

        let response = app(codec, Arc::clone(&reached))
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(TOKEN_HEADER, token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(reached.load(Ordering::SeqCst));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn test_missing_token_never_reaches_handler() {
        let reached = Arc::new(AtomicBool::new(false));

        let response = app(codec(), Arc::clone(&reached))
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_corrupted_token_never_reaches_handler() {
        let codec = codec();
        let reached = Arc::new(AtomicBool::new(false));
        let token = access_token(&codec);
        let corrupted = &token[..token.len() - 3];

        let response = app(codec, Arc::clone(&reached))
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(TOKEN_HEADER, corrupted)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_bearer_header_is_not_accepted() {
        let codec = codec();
        let reached = Arc::new(AtomicBool::new(false));
        let token = access_token(&codec);

        let response = app(codec, Arc::clone(&reached))
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!reached.load(Ordering::SeqCst));
    }
}
