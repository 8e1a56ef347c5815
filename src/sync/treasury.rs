// Treasury Monitor - Contract owner and balance for the admin panel
// Publishes the balance the transaction manager uses to guard withdrawals

use super::view::{follow, RefreshOrder, Refreshable, SyncHandle};
use crate::ledger::{CallKind, LedgerError, LedgerReader};
use crate::notify::{surface, Notifier};
use crate::session::SessionContext;
use crate::tx::TransactionManager;
use async_trait::async_trait;
use ethers_core::types::{Address, U256};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Render wei as ether with four decimals (truncated)
pub fn format_ether(wei: U256) -> String {
    let unit = U256::exp10(18);
    let whole = wei / unit;
    let fraction = (wei % unit) / U256::exp10(14);
    format!("{}.{:04}", whole, fraction.low_u64())
}

/// Tracks the contract's owner and collected fees
pub struct TreasuryMonitor {
    contract: Address,
    reader: Arc<dyn LedgerReader>,
    notifier: Arc<dyn Notifier>,
    owner: watch::Sender<Option<Address>>,
    balance: watch::Sender<Option<U256>>,
    order: RefreshOrder,
}

impl TreasuryMonitor {
    pub fn new(
        context: &SessionContext,
        reader: Arc<dyn LedgerReader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (owner, _) = watch::channel(None);
        let (balance, _) = watch::channel(None);
        Self {
            contract: context.contract(),
            reader,
            notifier,
            owner,
            balance,
            order: RefreshOrder::default(),
        }
    }

    /// Fetch owner and balance; on failure both become unknown
    ///
    /// A read that started before the last published one is dropped, so the
    /// withdraw guard never falls back to an older balance.
    pub async fn refresh(&self) -> Result<(), LedgerError> {
        let ticket = self.order.begin();
        let result = async {
            let owner = self.reader.get_owner().await?;
            let balance = self.reader.get_balance(self.contract).await?;
            Ok::<_, LedgerError>((owner, balance))
        }
        .await;

        match result {
            Ok((owner, balance)) => {
                let published = self.order.publish_if_newer(ticket, || {
                    self.owner.send_replace(Some(owner));
                    self.balance.send_replace(Some(balance));
                });
                debug!(?owner, %balance, published, "treasury refreshed");
                Ok(())
            }
            Err(err) => {
                if self.order.publish_if_newer(ticket, || {
                    self.owner.send_replace(None);
                    self.balance.send_replace(None);
                }) {
                    warn!(error = %err, "treasury refresh failed");
                    surface(self.notifier.as_ref(), &err);
                }
                Err(err)
            }
        }
    }

    /// Receiver to hand to `TransactionManager::with_balance_cache`
    pub fn balance_cache(&self) -> watch::Receiver<Option<U256>> {
        self.balance.subscribe()
    }

    pub fn balance(&self) -> Option<U256> {
        *self.balance.borrow()
    }

    pub fn owner(&self) -> Option<Address> {
        *self.owner.borrow()
    }

    /// Whether `account` is the known owner; false while unknown
    ///
    /// Presentation gating only. The ledger enforces the privilege.
    pub fn is_owner(&self, account: Address) -> bool {
        self.owner() == Some(account)
    }

    pub fn formatted_balance(&self) -> Option<String> {
        self.balance().map(format_ether)
    }

    /// Refresh when fees arrive or a withdrawal confirms
    pub fn follow(self: &Arc<Self>, manager: &TransactionManager) -> SyncHandle {
        follow(Arc::clone(self), manager)
    }
}

#[async_trait]
impl Refreshable for TreasuryMonitor {
    fn is_affected_by(&self, call: &CallKind) -> bool {
        call.touches_treasury()
    }

    async fn refresh_view(&self) {
        let _ = self.refresh().await;
    }
}
