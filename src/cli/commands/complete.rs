use anyhow::Result;

use super::{print_record, print_step, report_failure};
use crate::registration::{RegistrationCoordinator, RegistrationStep};

pub struct CompleteCommand {
    pub token: String,
}

impl CompleteCommand {
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
        let record = coordinator
            .complete_registration(&caller)
            .await
            .map_err(report_failure)?;

        println!("🎉 Registration complete for {}", record.user_id);
        print_step(RegistrationStep::Complete);
        print_record(&record)
    }
}
