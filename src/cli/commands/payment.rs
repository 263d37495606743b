use anyhow::Result;

use super::{print_record, report_failure};
use crate::registration::{PaymentSetupMode, RegistrationCoordinator};

pub struct PaymentSetupCommand {
    pub token: String,
    pub dev_bypass: bool,
}

impl PaymentSetupCommand {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            dev_bypass: false,
        }
    }

    pub fn with_dev_bypass(mut self, dev_bypass: bool) -> Self {
        self.dev_bypass = dev_bypass;
        self
    }

    fn mode(&self) -> PaymentSetupMode {
        if self.dev_bypass {
            PaymentSetupMode::DevelopmentBypass
        } else {
            PaymentSetupMode::Provider
        }
    }

    pub async fn execute(&self, coordinator: &RegistrationCoordinator) -> Result<()> {
        if self.dev_bypass {
            println!("⚠️  [DEV] Bypassing the payment provider with placeholder identifiers");
        }

        let caller = coordinator
            .authenticate(&self.token)
            .await
            .map_err(report_failure)?;
        let record = coordinator
            .complete_payment_setup(&caller, self.mode())
            .await
            .map_err(report_failure)?;

        println!("💳 Payment method configured for {}", record.user_id);
        print_record(&record)
    }
}
