// Member Onboarding Library - registration state coordination
// This exposes the core components for testing and integration

pub mod auth;
pub mod cli;
pub mod config;
pub mod payments;
pub mod registration;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use auth::{
    AuthError, AuthenticatedUser, HmacSignatureVerifier, SignatureVerifier, SignedTokenVerifier,
    TokenVerifier,
};
pub use config::{OnboardingConfig, StorageBackend};
pub use payments::{PaymentError, PaymentProvider, PaymentSetup, UnconfiguredPaymentProvider};
pub use registration::{
    resolve_registration, resolve_step, CoordinatorSettings, PaymentSetupMode, PaymentStatus,
    RegistrationCoordinator, RegistrationError, RegistrationProgress, RegistrationStep,
    RegistrationView, UserId, UserRegistration, VerificationStatus,
};
pub use store::{FileRegistrationStore, InMemoryRegistrationStore, RegistrationStore, StoreError};
pub use telemetry::{create_registration_span, generate_correlation_id, init_telemetry};
