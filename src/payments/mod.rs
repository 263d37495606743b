//! Payment provider seam
//!
//! The vendor SDK that registers a customer's payment method sits behind
//! [`PaymentProvider`]. Development deployments may skip it entirely and use
//! [`development_placeholder`] identifiers instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::registration::UserId;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Payment method declined: {reason}")]
    Declined { reason: String },
    #[error("Payment provider unreachable: {message}")]
    Unavailable { message: String },
    #[error("No payment provider configured")]
    NotConfigured,
}

/// Identifiers returned by the payment provider for a registered method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSetup {
    pub customer_id: String,
    pub payment_method_id: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Register (or confirm) a payment method for the user
    async fn register_payment_method(&self, user_id: &UserId) -> Result<PaymentSetup, PaymentError>;
}

/// Provider used when no payment vendor is wired in; every call fails
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredPaymentProvider;

#[async_trait]
impl PaymentProvider for UnconfiguredPaymentProvider {
    async fn register_payment_method(&self, _user_id: &UserId) -> Result<PaymentSetup, PaymentError> {
        Err(PaymentError::NotConfigured)
    }
}

/// Placeholder identifiers for the development payment bypass
pub fn development_placeholder() -> PaymentSetup {
    PaymentSetup {
        customer_id: format!("dev_cus_{}", Uuid::new_v4().simple()),
        payment_method_id: format!("dev_pm_{}", Uuid::new_v4().simple()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_marked_and_unique() {
        let a = development_placeholder();
        let b = development_placeholder();

        assert!(a.customer_id.starts_with("dev_cus_"));
        assert!(a.payment_method_id.starts_with("dev_pm_"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_fails() {
        let result = UnconfiguredPaymentProvider
            .register_payment_method(&UserId::new("u1"))
            .await;
        assert_eq!(result, Err(PaymentError::NotConfigured));
    }
}
