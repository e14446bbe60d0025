//! Subscription types.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::subscriptions::contracts::IFunctionsRouter;

/// Snapshot of on-chain subscription state, as printed after each command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    /// Balance in Juels.
    pub balance: U256,
    /// Subscription owner.
    pub owner: Address,
    /// Juels reserved for in-flight requests.
    pub blocked_balance: U256,
    /// Pending ownership transfer target (zero when none).
    pub proposed_owner: Address,
    /// Allow-listed consumer contracts.
    pub consumers: Vec<Address>,
    /// Router-defined flags.
    pub flags: B256,
}

impl From<IFunctionsRouter::Subscription> for SubscriptionInfo {
    fn from(sub: IFunctionsRouter::Subscription) -> Self {
        Self {
            balance: U256::from(sub.balance),
            owner: sub.owner,
            blocked_balance: U256::from(sub.blockedBalance),
            proposed_owner: sub.proposedOwner,
            consumers: sub.consumers,
            flags: sub.flags,
        }
    }
}
