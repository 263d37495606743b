use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "member-onboarding")]
#[command(about = "Registration state coordinator for coworking membership onboarding")]
#[command(long_about = "Tracks each member's progress through identity verification, payment setup \
                       and completion. Client operations take a bearer token; provider callbacks \
                       take the raw signed payload.")]
pub struct Cli {
    /// Configuration file to load
    #[arg(long, global = true, default_value = "member-onboarding.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the caller's registration record and the step to show them
    Status {
        /// Bearer token identifying the caller
        #[arg(long)]
        token: String,
    },
    /// Apply a signed verification provider callback
    VerificationCallback {
        /// File holding the raw callback body
        #[arg(long)]
        payload: PathBuf,
        /// Hex HMAC-SHA256 signature sent with the callback
        #[arg(long, required_unless_present = "sign")]
        signature: Option<String>,
        /// Sign the payload with the configured webhook secret (local testing)
        #[arg(long, conflicts_with = "signature")]
        sign: bool,
    },
    /// Record that the caller's payment method is set up
    PaymentSetup {
        /// Bearer token identifying the caller
        #[arg(long)]
        token: String,
        /// Skip the payment provider and store placeholder identifiers
        #[arg(long, help = "Development only: refused when the deployment is production")]
        dev_bypass: bool,
    },
    /// Send the caller back to identity verification
    Reset {
        /// Bearer token identifying the caller
        #[arg(long)]
        token: String,
    },
    /// Finish onboarding once verification and payment are done
    Complete {
        /// Bearer token identifying the caller
        #[arg(long)]
        token: String,
    },
    /// Issue a locally signed bearer token for a user
    IssueToken {
        /// User id the token identifies
        #[arg(long)]
        user: String,
    },
}
