use anyhow::{Context, Result};

use crate::auth::SignedTokenVerifier;
use crate::config::OnboardingConfig;
use crate::registration::UserId;

/// Mints a bearer token with the configured token secret
pub struct IssueTokenCommand {
    pub user: String,
}

impl IssueTokenCommand {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    pub fn issue(&self, config: &OnboardingConfig) -> Result<String> {
        if self.user.trim().is_empty() {
            anyhow::bail!("User id must not be empty");
        }
        let secret = config
            .auth
            .token_secret
            .as_deref()
            .context("No auth token secret configured (set MEMBER_ONBOARDING_AUTH__TOKEN_SECRET)")?;
        let verifier = SignedTokenVerifier::new(secret)?;
        Ok(verifier.issue(&UserId::new(self.user.trim())))
    }

    pub fn execute(&self, config: &OnboardingConfig) -> Result<()> {
        println!("{}", self.issue(config)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenVerifier;

    #[tokio::test]
    async fn test_issued_token_round_trips_through_verifier() {
        let mut config = OnboardingConfig::default();
        config.auth.token_secret = Some("token-secret".to_string());

        let token = IssueTokenCommand::new("member-7").issue(&config).unwrap();
        let verifier = SignedTokenVerifier::new("token-secret").unwrap();
        assert_eq!(verifier.verify_token(&token).await.unwrap(), UserId::new("member-7"));
    }

    #[test]
    fn test_requires_secret_and_user() {
        let config = OnboardingConfig::default();
        assert!(IssueTokenCommand::new("member-7").issue(&config).is_err());

        let mut config = OnboardingConfig::default();
        config.auth.token_secret = Some("token-secret".to_string());
        assert!(IssueTokenCommand::new("  ").issue(&config).is_err());
    }
}
