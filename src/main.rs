use anyhow::Result;
use clap::Parser;

use member_onboarding::cli::commands::{
    build_coordinator, complete::CompleteCommand, payment::PaymentSetupCommand,
    reset::ResetCommand, show_usage, status::StatusCommand, token::IssueTokenCommand,
    verification_callback::VerificationCallbackCommand,
};
use member_onboarding::cli::{Cli, Commands};
use member_onboarding::config::OnboardingConfig;
use member_onboarding::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    OnboardingConfig::load_env_file()?;
    let config = OnboardingConfig::load_from(&cli.config)?;
    init_telemetry(&config.observability)?;

    let Some(command) = cli.command else {
        return tokio::runtime::Runtime::new()?.block_on(show_usage());
    };

    if let Commands::IssueToken { user } = &command {
        return IssueTokenCommand::new(user.as_str()).execute(&config);
    }

    tokio::runtime::Runtime::new()?.block_on(async {
        let coordinator = build_coordinator(&config).await?;

        match command {
            Commands::Status { token } => StatusCommand::new(token).execute(&coordinator).await,
            Commands::VerificationCallback {
                payload,
                signature,
                sign,
            } => {
                VerificationCallbackCommand::new(payload)
                    .with_signature(signature)
                    .with_local_signing(sign)
                    .execute(&config, &coordinator)
                    .await
            }
            Commands::PaymentSetup { token, dev_bypass } => {
                PaymentSetupCommand::new(token)
                    .with_dev_bypass(dev_bypass)
                    .execute(&coordinator)
                    .await
            }
            Commands::Reset { token } => ResetCommand::new(token).execute(&coordinator).await,
            Commands::Complete { token } => CompleteCommand::new(token).execute(&coordinator).await,
            Commands::IssueToken { .. } => Ok(()),
        }
    })
}
