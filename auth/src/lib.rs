//! Credential and session core
//!
//! Transport-independent building blocks for password login and signed sessions:
//! - Password hashing (Argon2id)
//! - Signed token encoding and decoding (HS256)
//! - Access/refresh token issuance
//! - Request authentication from the `token` header value
//! - Role-based access decisions
//!
//! Persistence and HTTP wiring live in the service crate.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Complete Session Flow
//! ```
//! use std::sync::Arc;
//!
//! use auth::{
//!     require_self_or_role, Authenticator, Identity, Role, SessionIssuer, SigningKey, TokenCodec,
//! };
//!
//! let key = SigningKey::new("secret_key_at_least_32_bytes_long!").unwrap();
//! let codec = Arc::new(TokenCodec::new(&key));
//!
//! // Login: issue a token pair
//! let identity = Identity {
//!     email: "a@x.com".to_string(),
//!     first_name: "Ada".to_string(),
//!     last_name: "Lovelace".to_string(),
//!     uid: "42".to_string(),
//!     user_type: Role::User,
//! };
//! let pair = SessionIssuer::new(Arc::clone(&codec)).issue_tokens(&identity).unwrap();
//!
//! // Protected request: authenticate and check access
//! let context = Authenticator::new(codec)
//!     .authenticate(Some(&pair.access_token))
//!     .unwrap();
//! assert_eq!(context.user_id(), "42");
//! assert!(require_self_or_role(&context, "42", Role::Admin).is_allowed());
//! ```

pub mod access;
pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod role;
pub mod session;

// Re-export commonly used items
pub use access::require_role;
pub use access::require_self_or_role;
pub use access::AccessDecision;
pub use authenticator::AuthenticatedContext;
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TOKEN_HEADER;
pub use jwt::ClaimSet;
pub use jwt::DecodeError;
pub use jwt::Identity;
pub use jwt::SigningKey;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use jwt::TokenLifetime;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use role::Role;
pub use role::RoleError;
pub use session::SessionIssuer;
pub use session::TokenPair;
