use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

use crate::auth::{
    HmacSignatureVerifier, RejectingSignatureVerifier, SignatureVerifier, SignedTokenVerifier,
    TokenVerifier, UnconfiguredTokenVerifier,
};
use crate::config::{OnboardingConfig, StorageBackend};
use crate::payments::UnconfiguredPaymentProvider;
use crate::registration::{
    CoordinatorSettings, RegistrationCoordinator, RegistrationError, RegistrationStep,
    UserRegistration,
};
use crate::store::{FileRegistrationStore, InMemoryRegistrationStore, RegistrationStore};

pub mod complete;
pub mod payment;
pub mod reset;
pub mod status;
pub mod token;
pub mod verification_callback;

/// Build the storage backend named in configuration
pub async fn build_store(config: &OnboardingConfig) -> Result<Arc<dyn RegistrationStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory registration store; records are lost on exit");
            Ok(Arc::new(InMemoryRegistrationStore::new()))
        }
        StorageBackend::File => Ok(Arc::new(FileRegistrationStore::new(
            config.storage.state_dir.clone(),
        ))),
        #[cfg(feature = "database")]
        StorageBackend::Sqlite => {
            let store = crate::store::SqliteRegistrationStore::new(
                &config.storage.database_url,
                config.storage.auto_migrate,
            )
            .await
            .context("Failed to open SQLite registration store")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "database"))]
        StorageBackend::Sqlite => {
            anyhow::bail!("The sqlite storage backend requires the 'database' feature")
        }
    }
}

/// Wire a coordinator from configuration.
///
/// Missing secrets don't stop startup: callbacks and tokens are simply
/// rejected until they are configured.
pub async fn build_coordinator(config: &OnboardingConfig) -> Result<RegistrationCoordinator> {
    let store = build_store(config).await?;

    let signatures: Arc<dyn SignatureVerifier> = match &config.verification.webhook_secret {
        Some(secret) => Arc::new(
            HmacSignatureVerifier::new(secret).context("Invalid verification webhook secret")?,
        ),
        None => {
            warn!("No verification webhook secret configured; callbacks will be rejected");
            Arc::new(RejectingSignatureVerifier)
        }
    };

    let tokens: Arc<dyn TokenVerifier> = match &config.auth.token_secret {
        Some(secret) => {
            Arc::new(SignedTokenVerifier::new(secret).context("Invalid auth token secret")?)
        }
        None => {
            warn!("No auth token secret configured; client calls will be rejected");
            Arc::new(UnconfiguredTokenVerifier)
        }
    };

    Ok(
        RegistrationCoordinator::new(store, signatures, tokens, Arc::new(UnconfiguredPaymentProvider))
            .with_settings(CoordinatorSettings::from(config)),
    )
}

/// Print a coordinator failure the way a transport would classify it
pub fn report_failure(error: RegistrationError) -> anyhow::Error {
    println!("❌ {:?} ({}): {}", error.kind(), error.status_code(), error);
    error.into()
}

pub fn print_record(record: &UserRegistration) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

pub fn print_step(step: RegistrationStep) {
    println!("📍 Step: {} → {}", step, step.route());
}

pub async fn show_usage() -> Result<()> {
    println!("🏢 Member Onboarding - registration state coordinator");
    println!();
    println!("Client commands (need --token):");
    println!("  📊 member-onboarding status               # Current step and record");
    println!("  💳 member-onboarding payment-setup        # Record payment method");
    println!("  🔄 member-onboarding reset                # Restart identity verification");
    println!("  ✅ member-onboarding complete             # Finish onboarding");
    println!();
    println!("Provider and admin commands:");
    println!("  🪪 member-onboarding verification-callback --payload body.json --signature <hex>");
    println!("  🔑 member-onboarding issue-token --user <id>");
    Ok(())
}
