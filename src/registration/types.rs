// Core types for the registration state coordinator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, externally issued user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl PartialEq<str> for UserId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Identity verification state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl VerificationStatus {
    /// Map a verification provider outcome string onto a status.
    ///
    /// Unknown outcomes map to `Pending` so a surprise value never advances
    /// or fails a user.
    pub fn from_outcome(outcome: &str) -> Self {
        match outcome {
            "approved" => VerificationStatus::Completed,
            "declined" | "abandoned" | "expired" => VerificationStatus::Failed,
            _ => VerificationStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Completed => "completed",
            VerificationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method setup state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    NotConfigured,
    Configured,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::NotConfigured => "not_configured",
            PaymentStatus::Configured => "configured",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Onboarding steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    Verification,
    Payment,
    Complete,
}

impl RegistrationStep {
    /// All steps in onboarding order; a stored step pointer indexes this list.
    pub const ORDERED: [RegistrationStep; 3] = [
        RegistrationStep::Verification,
        RegistrationStep::Payment,
        RegistrationStep::Complete,
    ];

    /// Look up a stored step pointer. Negative or out-of-range pointers yield `None`.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ORDERED.get(i).copied())
    }

    pub fn index(&self) -> i64 {
        match self {
            RegistrationStep::Verification => 0,
            RegistrationStep::Payment => 1,
            RegistrationStep::Complete => 2,
        }
    }

    /// Route the client should be sent to for this step
    pub fn route(&self) -> &'static str {
        match self {
            RegistrationStep::Verification => "/register/verification",
            RegistrationStep::Payment => "/register/payment",
            RegistrationStep::Complete => "/dashboard",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStep::Verification => "verification",
            RegistrationStep::Payment => "payment",
            RegistrationStep::Complete => "complete",
        }
    }
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user registration record as persisted in the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistration {
    pub user_id: UserId,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Cached step pointer. Kept as a raw integer because stored documents may
    /// carry values written by older clients.
    #[serde(default)]
    pub registration_step: Option<i64>,
    #[serde(default)]
    pub registration_completed: bool,
    #[serde(default)]
    pub verification_session_id: Option<String>,
    #[serde(default)]
    pub verification_code: Option<String>,
    #[serde(default)]
    pub payment_customer_id: Option<String>,
    #[serde(default)]
    pub payment_method_id: Option<String>,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_configured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reset_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl UserRegistration {
    /// Fresh record for a user seen for the first time
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            verification_status: VerificationStatus::Pending,
            payment_status: PaymentStatus::NotConfigured,
            registration_step: Some(0),
            registration_completed: false,
            verification_session_id: None,
            verification_code: None,
            payment_customer_id: None,
            payment_method_id: None,
            verified_at: None,
            payment_configured_at: None,
            completed_at: None,
            reset_at: None,
            last_updated: None,
        }
    }

    /// Apply a partial update field-by-field. Fields left as `None` in the
    /// update keep their stored value.
    pub fn apply(&mut self, update: &RegistrationUpdate) {
        if let Some(status) = update.verification_status {
            self.verification_status = status;
        }
        if let Some(status) = update.payment_status {
            self.payment_status = status;
        }
        if let Some(step) = update.registration_step {
            self.registration_step = Some(step);
        }
        if let Some(completed) = update.registration_completed {
            self.registration_completed = completed;
        }
        if let Some(session_id) = &update.verification_session_id {
            self.verification_session_id = session_id.clone();
        }
        if let Some(code) = &update.verification_code {
            self.verification_code = code.clone();
        }
        if let Some(customer_id) = &update.payment_customer_id {
            self.payment_customer_id = Some(customer_id.clone());
        }
        if let Some(method_id) = &update.payment_method_id {
            self.payment_method_id = Some(method_id.clone());
        }
        if let Some(at) = update.verified_at {
            self.verified_at = Some(at);
        }
        if let Some(at) = update.payment_configured_at {
            self.payment_configured_at = Some(at);
        }
        if let Some(at) = update.completed_at {
            self.completed_at = at;
        }
        if let Some(at) = update.reset_at {
            self.reset_at = Some(at);
        }
        if let Some(at) = update.last_updated {
            self.last_updated = Some(at);
        }
    }

    /// Snapshot consumed by the step resolver
    pub fn progress(&self) -> RegistrationProgress {
        RegistrationProgress {
            registration_completed: Some(self.registration_completed),
            registration_step: self.registration_step,
        }
    }
}

/// Typed partial update for a registration record.
///
/// `None` leaves the stored field untouched. The correlation identifiers and
/// `completed_at` use `Option<Option<_>>` so an update can clear them with
/// `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationUpdate {
    pub verification_status: Option<VerificationStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub registration_step: Option<i64>,
    pub registration_completed: Option<bool>,
    pub verification_session_id: Option<Option<String>>,
    pub verification_code: Option<Option<String>>,
    pub payment_customer_id: Option<String>,
    pub payment_method_id: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub payment_configured_at: Option<DateTime<Utc>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub reset_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl RegistrationUpdate {
    pub fn is_empty(&self) -> bool {
        self == &RegistrationUpdate::default()
    }
}

/// The subset of registration state the step resolver looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistrationProgress {
    pub registration_completed: Option<bool>,
    pub registration_step: Option<i64>,
}

/// Record returned to callers reading their registration status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    pub registration: UserRegistration,
    pub step: RegistrationStep,
    pub route: String,
}

impl RegistrationView {
    pub fn new(registration: UserRegistration, step: RegistrationStep) -> Self {
        Self {
            registration,
            step,
            route: step.route().to_string(),
        }
    }
}
