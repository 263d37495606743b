// Step resolution - pure mapping from registration state to onboarding step

use super::types::{
    PaymentStatus, RegistrationProgress, RegistrationStep, UserRegistration, VerificationStatus,
};

/// Resolve the step a user should be on from the cached step pointer.
///
/// Total over its input: a missing record, a missing pointer, or a pointer
/// outside the step list all resolve to `Verification`, the earliest step.
/// A completed registration always resolves to `Complete`.
pub fn resolve_step(progress: Option<&RegistrationProgress>) -> RegistrationStep {
    let Some(progress) = progress else {
        return RegistrationStep::Verification;
    };

    if progress.registration_completed == Some(true) {
        return RegistrationStep::Complete;
    }

    progress
        .registration_step
        .and_then(RegistrationStep::from_index)
        .unwrap_or(RegistrationStep::Verification)
}

/// Step implied by the verification and payment sub-states.
///
/// Payment setup alone never finishes onboarding; only the explicit
/// completion flag moves a user to `Complete`.
pub fn derive_step(
    verification: VerificationStatus,
    _payment: PaymentStatus,
    registration_completed: bool,
) -> RegistrationStep {
    if registration_completed {
        return RegistrationStep::Complete;
    }

    match verification {
        VerificationStatus::Completed => RegistrationStep::Payment,
        VerificationStatus::Pending | VerificationStatus::Failed => RegistrationStep::Verification,
    }
}

/// Canonical step for a stored record. The sub-states are the source of
/// truth; the cached pointer only matters when it agrees with them.
pub fn resolve_registration(record: Option<&UserRegistration>) -> RegistrationStep {
    match record {
        None => resolve_step(None),
        Some(record) => derive_step(
            record.verification_status,
            record.payment_status,
            record.registration_completed,
        ),
    }
}

/// Whether the cached step pointer resolves to the same step as the sub-states
pub fn is_consistent(record: &UserRegistration) -> bool {
    resolve_step(Some(&record.progress())) == resolve_registration(Some(record))
}
