//! Signed bearer tokens and opaque refresh tokens.

pub mod claims;
pub mod issuer;
pub mod verifier;

pub use claims::Claims;
pub use issuer::{IssuedToken, TokenIssuer};
pub use verifier::{TokenError, TokenVerifier};
