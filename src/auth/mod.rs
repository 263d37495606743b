//! Caller and callback authentication
//!
//! Two narrow seams: a signature predicate for server-to-server callbacks
//! and a bearer-token verifier for client calls. Both are traits so the
//! coordinator can be driven by test doubles.

pub mod signature;
pub mod token;

pub use signature::{
    HmacSignatureVerifier, RejectingSignatureVerifier, SignatureError, SignatureVerifier,
};
pub use token::{
    AuthError, AuthenticatedUser, SignedTokenVerifier, TokenVerifier, UnconfiguredTokenVerifier,
};

#[cfg(test)]
pub use signature::MockSignatureVerifier;
#[cfg(test)]
pub use token::MockTokenVerifier;
