pub mod claims;
pub mod codec;
pub mod errors;
pub mod key;

pub use claims::ClaimSet;
pub use claims::Expiring;
pub use claims::Identity;
pub use claims::RefreshClaims;
pub use claims::TokenLifetime;
pub use codec::TokenCodec;
pub use errors::DecodeError;
pub use errors::TokenError;
pub use key::SigningKey;
