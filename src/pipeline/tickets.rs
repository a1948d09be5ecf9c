//! Ticket Store Seam
//!
//! The account collaborator owns ticket persistence; the pipeline only
//! needs a balance read and an atomic check-and-decrement. The in-memory
//! implementation backs the CLI surface and tests; a deployment wires a
//! real account store behind the same trait.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::TicketsConfig;
use crate::types::{Result, TicketBalance, TicketTier, UserId};

// =============================================================================
// Store Trait
// =============================================================================

/// Result of an atomic debit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// One ticket consumed; the remaining balance is returned
    Debited(TicketBalance),
    /// Balance was zero at debit time; nothing was consumed
    Insufficient,
}

/// Account-collaborator seam for ticket balances
///
/// `debit` must be atomic: two concurrent requests must never both pass a
/// balance check of 1.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Current balance for a user (zero for unknown users)
    async fn balance(&self, user: &UserId) -> Result<TicketBalance>;

    /// Atomically consume one ticket of the tier
    async fn debit(&self, user: &UserId, tier: TicketTier) -> Result<DebitOutcome>;
}

/// Shared ticket store handle for the pipeline
pub type SharedTicketStore = Arc<dyn TicketStore>;

// =============================================================================
// In-Memory Store
// =============================================================================

/// DashMap-backed store; per-entry mutation holds the shard write lock, so
/// check-and-decrement is a single atomic operation
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    balances: DashMap<UserId, TicketBalance>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a user's balance (initial grant or top-up)
    pub fn grant(&self, user: UserId, balance: TicketBalance) {
        debug!(user = %user, ?balance, "granting ticket balance");
        self.balances.insert(user, balance);
    }

    /// Store with one user seeded from configuration
    pub fn seeded(user: UserId, config: TicketsConfig) -> Self {
        let store = Self::new();
        store.grant(user, config.into());
        store
    }
}

impl From<TicketsConfig> for TicketBalance {
    fn from(config: TicketsConfig) -> Self {
        Self::new(config.golden, config.silver, config.pink)
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn balance(&self, user: &UserId) -> Result<TicketBalance> {
        Ok(self
            .balances
            .get(user)
            .map(|entry| *entry)
            .unwrap_or_default())
    }

    async fn debit(&self, user: &UserId, tier: TicketTier) -> Result<DebitOutcome> {
        let Some(mut entry) = self.balances.get_mut(user) else {
            return Ok(DebitOutcome::Insufficient);
        };

        let slot = entry.slot_mut(tier);
        if *slot == 0 {
            return Ok(DebitOutcome::Insufficient);
        }
        *slot -= 1;
        Ok(DebitOutcome::Debited(*entry))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_has_zero_balance() {
        let store = InMemoryTicketStore::new();
        let balance = store.balance(&UserId::from("nobody")).await.unwrap();
        assert_eq!(balance, TicketBalance::default());
    }

    #[tokio::test]
    async fn test_debit_consumes_exactly_one() {
        let store = InMemoryTicketStore::new();
        let user = UserId::from("alice");
        store.grant(user.clone(), TicketBalance::new(2, 0, 1));

        let outcome = store.debit(&user, TicketTier::Golden).await.unwrap();
        assert_eq!(outcome, DebitOutcome::Debited(TicketBalance::new(1, 0, 1)));

        let balance = store.balance(&user).await.unwrap();
        assert_eq!(balance.of(TicketTier::Golden), 1);
        assert_eq!(balance.of(TicketTier::Pink), 1);
    }

    #[tokio::test]
    async fn test_debit_refuses_empty_tier() {
        let store = InMemoryTicketStore::new();
        let user = UserId::from("alice");
        store.grant(user.clone(), TicketBalance::new(1, 0, 0));

        let outcome = store.debit(&user, TicketTier::Silver).await.unwrap();
        assert_eq!(outcome, DebitOutcome::Insufficient);

        // Untouched tiers keep their balance
        let balance = store.balance(&user).await.unwrap();
        assert_eq!(balance.of(TicketTier::Golden), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_never_overdraft() {
        let store = Arc::new(InMemoryTicketStore::new());
        let user = UserId::from("alice");
        store.grant(user.clone(), TicketBalance::new(5, 0, 0));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = Arc::clone(&store);
            let user = user.clone();
            handles.push(tokio::spawn(async move {
                store.debit(&user, TicketTier::Golden).await.unwrap()
            }));
        }

        let mut debited = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), DebitOutcome::Debited(_)) {
                debited += 1;
            }
        }

        assert_eq!(debited, 5);
        let balance = store.balance(&user).await.unwrap();
        assert_eq!(balance.of(TicketTier::Golden), 0);
    }

    #[tokio::test]
    async fn test_seeded_from_config() {
        let store = InMemoryTicketStore::seeded(
            UserId::from("local"),
            TicketsConfig {
                golden: 1,
                silver: 2,
                pink: 3,
            },
        );
        let balance = store.balance(&UserId::from("local")).await.unwrap();
        assert_eq!(balance, TicketBalance::new(1, 2, 3));
    }
}
