// Registration state coordinator
//
// Applies the onboarding transitions (verification callback, payment setup,
// reset, completion) to the per-user record. Every collaborator is injected
// so the coordinator can run against test doubles.

use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};

use super::callback::VerificationCallback;
use super::clock::{Clock, SystemClock};
use super::errors::{RegistrationError, Result};
use super::step_resolver::{is_consistent, resolve_registration};
use super::types::{
    PaymentStatus, RegistrationStep, RegistrationUpdate, RegistrationView, UserId,
    UserRegistration, VerificationStatus,
};
use crate::auth::{AuthenticatedUser, SignatureVerifier, TokenVerifier};
use crate::config::OnboardingConfig;
use crate::payments::{development_placeholder, PaymentProvider, PaymentSetup};
use crate::store::RegistrationStore;
use crate::telemetry::{create_registration_span, generate_correlation_id};

/// How payment setup should obtain its payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentSetupMode {
    /// Register the method with the payment provider
    Provider,
    /// Skip the provider and store placeholder identifiers (development only)
    DevelopmentBypass,
}

/// Deployment facts the coordinator needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub production: bool,
    pub allow_payment_bypass: bool,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            production: true,
            allow_payment_bypass: false,
        }
    }
}

impl From<&OnboardingConfig> for CoordinatorSettings {
    fn from(config: &OnboardingConfig) -> Self {
        Self {
            production: config.deployment.production,
            allow_payment_bypass: config.deployment.allow_payment_bypass,
        }
    }
}

impl CoordinatorSettings {
    pub fn development() -> Self {
        Self {
            production: false,
            allow_payment_bypass: true,
        }
    }

    fn bypass_permitted(&self) -> bool {
        !self.production && self.allow_payment_bypass
    }
}

pub struct RegistrationCoordinator {
    store: Arc<dyn RegistrationStore>,
    signatures: Arc<dyn SignatureVerifier>,
    tokens: Arc<dyn TokenVerifier>,
    payments: Arc<dyn PaymentProvider>,
    clock: Arc<dyn Clock>,
    settings: CoordinatorSettings,
}

impl RegistrationCoordinator {
    /// Build a coordinator with production settings and the system clock
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        signatures: Arc<dyn SignatureVerifier>,
        tokens: Arc<dyn TokenVerifier>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            store,
            signatures,
            tokens,
            payments,
            clock: Arc::new(SystemClock),
            settings: CoordinatorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CoordinatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Establish the caller's identity from a bearer token
    pub async fn authenticate(&self, bearer_token: &str) -> Result<AuthenticatedUser> {
        match self.tokens.verify_token(bearer_token).await {
            Ok(user_id) => Ok(AuthenticatedUser::new(user_id)),
            Err(e) => {
                warn!(error = %e, "Rejected bearer token");
                Err(RegistrationError::unauthorized(e.to_string()))
            }
        }
    }

    /// Read the caller's registration, creating the default record on first read
    pub async fn registration_status(&self, caller: &AuthenticatedUser) -> Result<RegistrationView> {
        let user_id = caller.user_id();
        let correlation_id = generate_correlation_id();
        let span = create_registration_span(
            "registration_status",
            Some(user_id.as_str()),
            Some(&correlation_id),
        );

        async {
            let record = match self.store.get(user_id).await? {
                Some(record) => record,
                None => {
                    info!(user_id = %user_id, "Creating registration record on first read");
                    self.store
                        .merge(user_id, &RegistrationUpdate::default())
                        .await
                        .inspect_err(|e| error!(error = %e, "Failed to create registration record"))?
                }
            };

            let step = resolve_registration(Some(&record));
            if !is_consistent(&record) {
                debug!(
                    user_id = %user_id,
                    cached_step = ?record.registration_step,
                    resolved_step = %step,
                    "Cached registration step disagrees with sub-states; using resolved step"
                );
            }

            Ok(RegistrationView::new(record, step))
        }
        .instrument(span)
        .await
    }

    /// Apply a signed verification provider callback.
    ///
    /// Re-delivery of the same callback leaves the record unchanged apart
    /// from advisory timestamps.
    pub async fn ingest_verification_callback(
        &self,
        signature: &str,
        payload: &[u8],
    ) -> Result<UserRegistration> {
        let correlation_id = generate_correlation_id();
        let span = create_registration_span("verification_callback", None, Some(&correlation_id));

        async {
            if !self.signatures.verify(signature, payload) {
                warn!("Rejected verification callback with invalid signature");
                return Err(RegistrationError::unauthorized(
                    "verification callback signature is invalid",
                ));
            }

            let callback = VerificationCallback::parse(payload)?;
            let user_id = callback.target_user()?;
            let previous = self.require_record(&user_id).await?;

            let status = callback.outcome();
            let now = self.clock.now();
            let mut update = RegistrationUpdate {
                verification_status: Some(status),
                verification_session_id: callback.id.clone().map(Some),
                verification_code: callback.code.clone().map(Some),
                last_updated: Some(now),
                ..Default::default()
            };
            if status == VerificationStatus::Completed {
                update.registration_step = Some(RegistrationStep::Verification.index());
                // Redelivery keeps the original verification time
                if previous.verification_status != VerificationStatus::Completed
                    || previous.verified_at.is_none()
                {
                    update.verified_at = Some(now);
                }
            } else {
                // Completion only stands while verification does
                update.registration_completed = Some(false);
                update.completed_at = Some(None);
                if previous.registration_completed {
                    update.registration_step = Some(RegistrationStep::Verification.index());
                }
            }

            let record = self.merge(&user_id, &update).await?;

            info!(
                user_id = %user_id,
                outcome = callback.status.as_deref().unwrap_or_default(),
                verification_status = %status,
                session_id = callback.id.as_deref(),
                "Verification callback applied"
            );
            Ok(record)
        }
        .instrument(span)
        .await
    }

    /// Record that the caller's payment method is set up
    pub async fn complete_payment_setup(
        &self,
        caller: &AuthenticatedUser,
        mode: PaymentSetupMode,
    ) -> Result<UserRegistration> {
        let user_id = caller.user_id();
        let correlation_id = generate_correlation_id();
        let span = create_registration_span(
            "payment_setup",
            Some(user_id.as_str()),
            Some(&correlation_id),
        );

        async {
            self.require_record(user_id).await?;

            let setup = self.obtain_payment_setup(user_id, mode).await?;
            let now = self.clock.now();
            let update = RegistrationUpdate {
                payment_status: Some(PaymentStatus::Configured),
                registration_step: Some(RegistrationStep::Payment.index()),
                payment_customer_id: Some(setup.customer_id.clone()),
                payment_method_id: Some(setup.payment_method_id.clone()),
                payment_configured_at: Some(now),
                last_updated: Some(now),
                ..Default::default()
            };

            let record = self.merge(user_id, &update).await?;

            info!(
                user_id = %user_id,
                mode = ?mode,
                customer_id = %setup.customer_id,
                "Payment setup completed"
            );
            Ok(record)
        }
        .instrument(span)
        .await
    }

    /// Send the caller back to the start of identity verification.
    ///
    /// Payment configuration is left as it is.
    pub async fn reset_verification(&self, caller: &AuthenticatedUser) -> Result<UserRegistration> {
        let user_id = caller.user_id();
        let correlation_id = generate_correlation_id();
        let span = create_registration_span(
            "reset_verification",
            Some(user_id.as_str()),
            Some(&correlation_id),
        );

        async {
            let previous = self.require_record(user_id).await?;

            let now = self.clock.now();
            let update = RegistrationUpdate {
                verification_status: Some(VerificationStatus::Pending),
                verification_session_id: Some(None),
                verification_code: Some(None),
                registration_step: Some(RegistrationStep::Verification.index()),
                registration_completed: Some(false),
                completed_at: Some(None),
                reset_at: Some(now),
                last_updated: Some(now),
                ..Default::default()
            };

            let record = self.merge(user_id, &update).await?;

            info!(
                user_id = %user_id,
                previous_status = %previous.verification_status,
                payment_status = %record.payment_status,
                "Verification status reset"
            );
            Ok(record)
        }
        .instrument(span)
        .await
    }

    /// Mark onboarding finished once verification and payment are both done
    pub async fn complete_registration(&self, caller: &AuthenticatedUser) -> Result<UserRegistration> {
        let user_id = caller.user_id();
        let correlation_id = generate_correlation_id();
        let span = create_registration_span(
            "complete_registration",
            Some(user_id.as_str()),
            Some(&correlation_id),
        );

        async {
            let record = self.require_record(user_id).await?;

            if record.verification_status != VerificationStatus::Completed {
                return Err(RegistrationError::forbidden(format!(
                    "identity verification is {}",
                    record.verification_status
                )));
            }
            if record.payment_status != PaymentStatus::Configured {
                return Err(RegistrationError::forbidden(format!(
                    "payment method is {}",
                    record.payment_status
                )));
            }
            if record.registration_completed {
                debug!(user_id = %user_id, "Registration already complete");
                return Ok(record);
            }

            let now = self.clock.now();
            let update = RegistrationUpdate {
                registration_completed: Some(true),
                registration_step: Some(RegistrationStep::Complete.index()),
                completed_at: Some(Some(now)),
                last_updated: Some(now),
                ..Default::default()
            };

            let record = self.merge(user_id, &update).await?;
            info!(user_id = %user_id, "Registration completed");
            Ok(record)
        }
        .instrument(span)
        .await
    }

    async fn require_record(&self, user_id: &UserId) -> Result<UserRegistration> {
        match self.store.get(user_id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => {
                warn!(user_id = %user_id, "No registration record");
                Err(RegistrationError::not_found(user_id))
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Registration store read failed");
                Err(e.into())
            }
        }
    }

    async fn merge(&self, user_id: &UserId, update: &RegistrationUpdate) -> Result<UserRegistration> {
        self.store.merge(user_id, update).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Registration store write failed");
            e.into()
        })
    }

    async fn obtain_payment_setup(&self, user_id: &UserId, mode: PaymentSetupMode) -> Result<PaymentSetup> {
        match mode {
            PaymentSetupMode::Provider => self
                .payments
                .register_payment_method(user_id)
                .await
                .map_err(|e| {
                    error!(user_id = %user_id, error = %e, "Payment provider rejected setup");
                    e.into()
                }),
            PaymentSetupMode::DevelopmentBypass => {
                if self.settings.production {
                    warn!(user_id = %user_id, "Payment bypass attempted in production");
                    return Err(RegistrationError::forbidden(
                        "payment bypass is disabled in production",
                    ));
                }
                if !self.settings.bypass_permitted() {
                    warn!(user_id = %user_id, "Payment bypass attempted while disabled");
                    return Err(RegistrationError::forbidden("payment bypass is disabled"));
                }
                warn!(user_id = %user_id, "Using development payment bypass");
                Ok(development_placeholder())
            }
        }
    }
}
