use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{print_record, report_failure};
use crate::auth::HmacSignatureVerifier;
use crate::config::OnboardingConfig;
use crate::registration::RegistrationCoordinator;

/// Feeds a raw provider callback body through the coordinator
pub struct VerificationCallbackCommand {
    pub payload: PathBuf,
    pub signature: Option<String>,
    pub sign: bool,
}

impl VerificationCallbackCommand {
    pub fn new(payload: PathBuf) -> Self {
        Self {
            payload,
            signature: None,
            sign: false,
        }
    }

    pub fn with_signature(mut self, signature: Option<String>) -> Self {
        self.signature = signature;
        self
    }

    pub fn with_local_signing(mut self, sign: bool) -> Self {
        self.sign = sign;
        self
    }

    fn resolve_signature(&self, config: &OnboardingConfig, body: &[u8]) -> Result<String> {
        if !self.sign {
            return self
                .signature
                .clone()
                .context("A --signature is required unless --sign is given");
        }

        let secret = config
            .verification
            .webhook_secret
            .as_deref()
            .context("--sign needs a configured verification webhook secret")?;
        Ok(HmacSignatureVerifier::new(secret)?.sign(body))
    }

    pub async fn execute(
        &self,
        config: &OnboardingConfig,
        coordinator: &RegistrationCoordinator,
    ) -> Result<()> {
        let body = tokio::fs::read(&self.payload)
            .await
            .with_context(|| format!("Failed to read callback payload {}", self.payload.display()))?;
        let signature = self.resolve_signature(config, &body)?;

        println!("🪪 Applying verification callback from {}", self.payload.display());
        let record = coordinator
            .ingest_verification_callback(&signature, &body)
            .await
            .map_err(report_failure)?;

        println!(
            "✅ {} verification is now {}",
            record.user_id, record.verification_status
        );
        print_record(&record)
    }
}
