// Bearer token verification for client-originated calls

use async_trait::async_trait;
use thiserror::Error;

use super::signature::{HmacSignatureVerifier, SignatureError, SignatureVerifier};
use crate::registration::UserId;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Malformed bearer token")]
    MalformedToken,
    #[error("Bearer token rejected")]
    InvalidToken,
    #[error("Token verifier unavailable: {message}")]
    Unavailable { message: String },
}

/// A caller whose identity was established by a [`TokenVerifier`].
///
/// The coordinator trusts this identity as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    /// Wrap an identity the surrounding application has already verified
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// External bearer-token verifier yielding the caller's user id
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Tokens of the form `<user id>.<hex hmac of user id>`, signed with a
/// shared secret. Used by the CLI and single-node deployments that have no
/// external identity provider.
#[derive(Debug, Clone)]
pub struct SignedTokenVerifier {
    signer: HmacSignatureVerifier,
}

impl SignedTokenVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SignatureError> {
        Ok(Self {
            signer: HmacSignatureVerifier::new(secret)?,
        })
    }

    pub fn issue(&self, user_id: &UserId) -> String {
        format!("{}.{}", user_id, self.signer.sign(user_id.as_str().as_bytes()))
    }
}

#[async_trait]
impl TokenVerifier for SignedTokenVerifier {
    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let (user_id, signature) = token.rsplit_once('.').ok_or(AuthError::MalformedToken)?;
        if user_id.is_empty() || signature.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        if !self.signer.verify(signature, user_id.as_bytes()) {
            return Err(AuthError::InvalidToken);
        }

        Ok(UserId::new(user_id))
    }
}

/// Stand-in used when no token secret is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredTokenVerifier;

#[async_trait]
impl TokenVerifier for UnconfiguredTokenVerifier {
    async fn verify_token(&self, _token: &str) -> Result<UserId, AuthError> {
        Err(AuthError::Unavailable {
            message: "no token secret configured".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issued_token_verifies() {
        let verifier = SignedTokenVerifier::new("token-secret").unwrap();
        let token = verifier.issue(&UserId::new("member.42"));

        let user = verifier.verify_token(&token).await.unwrap();
        assert_eq!(user, UserId::new("member.42"));

        let user = verifier.verify_token(&format!("Bearer {token}")).await.unwrap();
        assert_eq!(user, UserId::new("member.42"));
    }

    #[tokio::test]
    async fn test_forged_tokens_are_rejected() {
        let verifier = SignedTokenVerifier::new("token-secret").unwrap();
        let other = SignedTokenVerifier::new("other-secret").unwrap();
        let token = verifier.issue(&UserId::new("u1"));
        let signature = token.rsplit_once('.').unwrap().1;

        assert_eq!(
            verifier.verify_token(&format!("u2.{signature}")).await,
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            other.verify_token(&token).await,
            Err(AuthError::InvalidToken)
        );
        assert_eq!(verifier.verify_token("").await, Err(AuthError::MissingToken));
        assert_eq!(verifier.verify_token("u1").await, Err(AuthError::MalformedToken));
        assert_eq!(verifier.verify_token(".abc").await, Err(AuthError::MalformedToken));
    }

    #[tokio::test]
    async fn test_unconfigured_verifier_is_unavailable() {
        let result = UnconfiguredTokenVerifier.verify_token("u1.abcd").await;
        assert!(matches!(result, Err(AuthError::Unavailable { .. })));
    }
}
