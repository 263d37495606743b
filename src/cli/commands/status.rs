use anyhow::Result;

use super::{print_record, print_step, report_failure};
use crate::registration::RegistrationCoordinator;

pub struct StatusCommand {
    pub token: String,
}

impl StatusCommand {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub async fn execute(&self, coordinator: &RegistrationCoordinator) -> Result<()> {
        let caller = coordinator
            .authenticate(&self.token)
            .await
            .map_err(report_failure)?;
        let view = coordinator
            .registration_status(&caller)
            .await
            .map_err(report_failure)?;

        println!("👤 Member: {}", view.registration.user_id);
        println!(
            "🪪 Verification: {} | 💳 Payment: {} | Completed: {}",
            view.registration.verification_status,
            view.registration.payment_status,
            view.registration.registration_completed
        );
        print_step(view.step);
        println!();
        print_record(&view.registration)
    }
}
