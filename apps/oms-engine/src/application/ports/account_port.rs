//! Account data port (driven port).
//!
//! Account balance bookkeeping lives outside this system; the risk gate
//! only needs a read-only snapshot at validation time.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::risk::AccountContext;

/// Provides the account snapshot consumed by the risk validator.
#[async_trait]
pub trait AccountDataPort: Send + Sync {
    /// Current account snapshot (buying power, positions, limits,
    /// reference prices). Recent-order data is layered in by the router.
    async fn account_context(&self) -> AccountContext;
}

/// Account data held in memory, updated administratively.
///
/// Suitable for demos and tests; production deployments adapt their
/// account system behind `AccountDataPort` instead.
#[derive(Debug, Default)]
pub struct StaticAccountData {
    context: RwLock<AccountContext>,
}

impl StaticAccountData {
    /// Create from an initial snapshot.
    #[must_use]
    pub fn new(context: AccountContext) -> Self {
        Self {
            context: RwLock::new(context),
        }
    }

    /// Replace the snapshot.
    pub async fn set(&self, context: AccountContext) {
        *self.context.write().await = context;
    }
}

#[async_trait]
impl AccountDataPort for StaticAccountData {
    async fn account_context(&self) -> AccountContext {
        self.context.read().await.clone()
    }
}
