//! Property tests for step resolution over arbitrary stored state

use member_onboarding::registration::{derive_step, is_consistent};
use member_onboarding::{
    resolve_registration, resolve_step, PaymentStatus, RegistrationProgress, RegistrationStep,
    UserId, UserRegistration, VerificationStatus,
};
use proptest::prelude::*;

fn verification_status() -> impl Strategy<Value = VerificationStatus> {
    prop_oneof![
        Just(VerificationStatus::Pending),
        Just(VerificationStatus::Completed),
        Just(VerificationStatus::Failed),
    ]
}

fn payment_status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![Just(PaymentStatus::NotConfigured), Just(PaymentStatus::Configured)]
}

proptest! {
    #[test]
    fn resolve_step_is_total(completed in proptest::option::of(any::<bool>()), step in proptest::option::of(any::<i64>())) {
        let progress = RegistrationProgress { registration_completed: completed, registration_step: step };
        let resolved = resolve_step(Some(&progress));

        if completed == Some(true) {
            prop_assert_eq!(resolved, RegistrationStep::Complete);
        } else {
            match step {
                Some(i) if (0..3).contains(&i) => prop_assert_eq!(resolved.index(), i),
                _ => prop_assert_eq!(resolved, RegistrationStep::Verification),
            }
        }
    }

    #[test]
    fn completion_flag_always_wins(verification in verification_status(), payment in payment_status()) {
        prop_assert_eq!(derive_step(verification, payment, true), RegistrationStep::Complete);
    }

    #[test]
    fn payment_alone_never_completes(verification in verification_status(), payment in payment_status()) {
        prop_assert_ne!(derive_step(verification, payment, false), RegistrationStep::Complete);
    }

    #[test]
    fn pointer_matching_sub_states_is_consistent(verification in verification_status(), payment in payment_status(), completed in any::<bool>()) {
        let mut record = UserRegistration::new(UserId::new("prop"));
        record.verification_status = verification;
        record.payment_status = payment;
        record.registration_completed = completed;
        record.registration_step = Some(derive_step(verification, payment, completed).index());

        prop_assert!(is_consistent(&record));
        prop_assert_eq!(resolve_registration(Some(&record)), resolve_step(Some(&record.progress())));
    }
}
