//! Authenticated caller identity.

use serde::{Deserialize, Serialize};

use super::CustomerId;

/// The already-authenticated caller of an operation.
///
/// Authentication happens upstream; the engine only sees who is calling
/// and whether they hold the admin capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    customer_id: CustomerId,
    is_admin: bool,
}

impl Principal {
    /// A regular customer.
    #[must_use]
    pub const fn customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            is_admin: false,
        }
    }

    /// An administrator.
    #[must_use]
    pub const fn admin(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            is_admin: true,
        }
    }

    /// The caller's own customer id.
    #[must_use]
    pub const fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Whether the caller holds the admin capability.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Admins act for anyone; customers only for themselves.
    #[must_use]
    pub fn can_act_for(&self, customer_id: &CustomerId) -> bool {
        self.is_admin || &self.customer_id == customer_id
    }
}
