use anyhow::Result;

use super::{print_record, print_step, report_failure};
use crate::registration::{resolve_registration, RegistrationCoordinator};

pub struct ResetCommand {
    pub token: String,
}

impl ResetCommand {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub async fn execute(&self, coordinator: &RegistrationCoordinator) -> Result<()> {
        println!("🔄 Resetting identity verification");

        let caller = coordinator
            .authenticate(&self.token)
            .await
            .map_err(report_failure)?;
        let record = coordinator
            .reset_verification(&caller)
            .await
            .map_err(report_failure)?;

        println!(
            "✅ Verification is {}; payment left {}",
            record.verification_status, record.payment_status
        );
        print_step(resolve_registration(Some(&record)));
        print_record(&record)
    }
}
