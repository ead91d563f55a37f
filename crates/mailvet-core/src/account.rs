//! Account types for MailVet.
//!
//! This module defines the user account structure consumed by the credit
//! ledger. Only the fields the verification pipeline depends on live here;
//! billing/profile data is owned by other services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Credits granted to a newly registered free-plan user.
pub const FREE_PLAN_INITIAL_CREDITS: i64 = 25;

/// A user account as seen by the credit ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// The user ID (from the upstream auth gateway).
    pub user_id: UserId,

    /// The user's current plan.
    pub plan: Plan,

    /// Remaining verification credits.
    ///
    /// Meaningful only when `plan` is metered; never negative. Mutated only
    /// by the ledger's atomic reserve/refund operations (and by billing
    /// flows outside this subsystem, which use the same storage primitive).
    pub credits: i64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Create a new free-plan account with the initial credit grant.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            plan: Plan::Free,
            credits: FREE_PLAN_INITIAL_CREDITS,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an account with an explicit plan and balance.
    #[must_use]
    pub fn with_credits(user_id: UserId, plan: Plan, credits: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            plan,
            credits,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether verifications for this account consume credits.
    #[must_use]
    pub fn is_metered(&self) -> bool {
        self.plan.is_metered()
    }
}

/// Available plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Free tier: metered, one credit per verification.
    Free,

    /// Ultimate plan: unmetered single verifications.
    Ultimate,

    /// Enterprise plan: unmetered, custom contract.
    Enterprise,
}

impl Plan {
    /// Whether the plan consumes credits per verification.
    ///
    /// Paid plans are unmetered here: the ledger never reads or writes
    /// their balance.
    #[must_use]
    pub const fn is_metered(&self) -> bool {
        matches!(self, Self::Free)
    }
}
