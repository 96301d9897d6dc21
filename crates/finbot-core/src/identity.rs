//! Per-message user identity.
//!
//! Identity is resolved once per inbound message and then passed
//! explicitly into the agent and every tool call. There is no ambient
//! slot: each processing task owns its `UserIdentity` value, so
//! concurrent messages from different users cannot observe each other's
//! identity by construction.

use crate::model::User;
use uuid::Uuid;

/// The resolved identity of the user whose message is being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: Uuid,
    /// Canonical local phone (no country code, no network suffix).
    pub phone: String,
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    SubscriptionExpired,
}

/// Access decision attached to a fully resolved user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied(DenialReason),
}

/// A user resolved from an inbound sender, with the access decision
/// already evaluated (including the lazy subscription-expiry flip).
#[derive(Debug, Clone)]
pub struct ResolvedUser {
    pub user: User,
    pub access: AccessDecision,
}

impl ResolvedUser {
    /// Build the per-task identity for a user with granted access.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            user_id: self.user.id,
            phone: self.user.phone.clone(),
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self.access, AccessDecision::Denied(_))
    }
}
