// Registration Module - onboarding state coordinator
//
// Verification → payment → complete, tracked on one record per user and
// driven by provider callbacks and authenticated client calls.

pub mod callback;
pub mod clock;
pub mod coordinator;
pub mod errors;
pub mod step_resolver;
pub mod types;

#[cfg(test)]
pub mod mocks;


pub use callback::VerificationCallback;
pub use clock::{Clock, SystemClock};
pub use coordinator::{CoordinatorSettings, PaymentSetupMode, RegistrationCoordinator};
pub use errors::{ErrorKind, RegistrationError};
pub use step_resolver::{derive_step, is_consistent, resolve_registration, resolve_step};
pub use types::{
    PaymentStatus, RegistrationProgress, RegistrationStep, RegistrationUpdate, RegistrationView,
    UserId, UserRegistration, VerificationStatus,
};
