// Inbound verification provider callback payload

use serde::{Deserialize, Serialize};

use super::errors::{RegistrationError, Result};
use super::types::{UserId, VerificationStatus};

/// Body posted by the identity verification provider when a session ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationCallback {
    #[serde(default)]
    pub status: Option<String>,
    /// Echo of the user id the session was started for
    #[serde(default)]
    pub vendor_data: Option<String>,
    /// Provider session id
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl VerificationCallback {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| RegistrationError::bad_request(format!("malformed callback body: {e}")))
    }

    /// User the callback is about, taken from `vendorData`
    pub fn target_user(&self) -> Result<UserId> {
        match self.vendor_data.as_deref() {
            Some(user) if !user.is_empty() => Ok(UserId::new(user)),
            _ => Err(RegistrationError::bad_request("callback is missing vendorData")),
        }
    }

    pub fn outcome(&self) -> VerificationStatus {
        VerificationStatus::from_outcome(self.status.as_deref().unwrap_or_default())
    }
}
