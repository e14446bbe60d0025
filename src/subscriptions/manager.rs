//! Subscription manager: router calls for subscription state changes.
//!
//! # Responsibilities
//! - Read subscription state from the Functions router
//! - Create, cancel, and fund subscriptions
//! - Maintain the consumer allow-list
//!
//! All semantic validation (existence, ownership, balance) is left to the
//! router; its reverts surface as `ExternalError`.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::DynProvider;
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;

use crate::blockchain::signer::FunctionsSigner;
use crate::blockchain::types::BlockchainResult;
use crate::error::ExternalError;
use crate::subscriptions::contracts::{IFunctionsRouter, LinkTokenInterface};
use crate::subscriptions::types::SubscriptionInfo;

/// Operations on Functions subscriptions.
#[async_trait]
pub trait SubscriptionManager: Send + Sync {
    /// Current state of a subscription.
    async fn get_subscription_info(&self, subscription_id: u64) -> BlockchainResult<SubscriptionInfo>;

    /// Create a subscription, optionally allow-listing one consumer. Returns the new id.
    async fn create_subscription(&self, consumer: Option<Address>) -> BlockchainResult<u64>;

    /// Cancel a subscription. `None` refunds the signer.
    async fn cancel_subscription(
        &self,
        subscription_id: u64,
        refund_address: Option<Address>,
    ) -> BlockchainResult<TxHash>;

    /// Transfer `juels` LINK into the subscription balance.
    async fn fund_subscription(&self, subscription_id: u64, juels: U256) -> BlockchainResult<TxHash>;

    /// Allow-list a consumer contract.
    async fn add_consumer(&self, subscription_id: u64, consumer: Address) -> BlockchainResult<TxHash>;

    /// Remove a consumer contract from the allow-list.
    async fn remove_consumer(&self, subscription_id: u64, consumer: Address)
        -> BlockchainResult<TxHash>;
}

/// `SubscriptionManager` backed by the router and LINK token contracts.
pub struct RouterSubscriptionManager {
    signer: FunctionsSigner,
    router: IFunctionsRouter::IFunctionsRouterInstance<DynProvider>,
    link: LinkTokenInterface::LinkTokenInterfaceInstance<DynProvider>,
}

impl RouterSubscriptionManager {
    /// Bind to the chain's router and token, after checking the RPC serves that chain.
    pub async fn initialize(signer: FunctionsSigner) -> BlockchainResult<Self> {
        signer.verify_chain_id().await?;

        let network = signer.network();
        let router = IFunctionsRouter::new(network.router, signer.provider().clone());
        let link = LinkTokenInterface::new(network.link_token, signer.provider().clone());

        tracing::debug!(
            chain = %signer.chain(),
            router = %network.router,
            link = %network.link_token,
            "Subscription manager initialized"
        );

        Ok(Self { signer, router, link })
    }
}

/// Fail on a reverted receipt, otherwise hand it back.
fn ensure_success(receipt: TransactionReceipt, call: &'static str) -> BlockchainResult<TransactionReceipt> {
    if !receipt.status() {
        return Err(ExternalError::Reverted(format!(
            "{} in transaction {}",
            call, receipt.transaction_hash
        )));
    }
    Ok(receipt)
}

/// Extract the new subscription id from a creation receipt.
fn created_subscription_id(receipt: &TransactionReceipt) -> BlockchainResult<u64> {
    receipt
        .inner
        .logs()
        .iter()
        .find_map(|log| log.log_decode::<IFunctionsRouter::SubscriptionCreated>().ok())
        .map(|decoded| decoded.inner.data.subscriptionId)
        .ok_or(ExternalError::MissingEvent("SubscriptionCreated"))
}

macro_rules! send_and_confirm {
    ($builder:expr, $call:literal) => {{
        let pending = $builder.send().await.map_err(|e| ExternalError::Contract {
            call: $call,
            reason: e.to_string(),
        })?;
        tracing::info!(tx_hash = %pending.tx_hash(), call = $call, "Transaction sent");
        let receipt = pending.get_receipt().await.map_err(|e| ExternalError::Contract {
            call: $call,
            reason: e.to_string(),
        })?;
        ensure_success(receipt, $call)?
    }};
}

#[async_trait]
impl SubscriptionManager for RouterSubscriptionManager {
    async fn get_subscription_info(&self, subscription_id: u64) -> BlockchainResult<SubscriptionInfo> {
        let sub = self
            .router
            .getSubscription(subscription_id)
            .call()
            .await
            .map_err(|e| ExternalError::Contract {
                call: "getSubscription",
                reason: e.to_string(),
            })?;
        Ok(sub.into())
    }

    async fn create_subscription(&self, consumer: Option<Address>) -> BlockchainResult<u64> {
        let receipt = match consumer {
            None => send_and_confirm!(self.router.createSubscription(), "createSubscription"),
            Some(consumer) => send_and_confirm!(
                self.router.createSubscriptionWithConsumer(consumer),
                "createSubscriptionWithConsumer"
            ),
        };
        created_subscription_id(&receipt)
    }

    async fn cancel_subscription(
        &self,
        subscription_id: u64,
        refund_address: Option<Address>,
    ) -> BlockchainResult<TxHash> {
        let refund = refund_address.unwrap_or_else(|| self.signer.address());
        let receipt = send_and_confirm!(
            self.router.cancelSubscription(subscription_id, refund),
            "cancelSubscription"
        );
        Ok(receipt.transaction_hash)
    }

    async fn fund_subscription(&self, subscription_id: u64, juels: U256) -> BlockchainResult<TxHash> {
        let available = self
            .link
            .balanceOf(self.signer.address())
            .call()
            .await
            .map_err(|e| ExternalError::Contract {
                call: "balanceOf",
                reason: e.to_string(),
            })?;
        if available < juels {
            return Err(ExternalError::InsufficientBalance {
                requested: juels.to_string(),
                available: available.to_string(),
            });
        }

        // abi.encode(uint64 subscriptionId)
        let data = Bytes::from(U256::from(subscription_id).to_be_bytes::<32>().to_vec());
        let receipt = send_and_confirm!(
            self.link
                .transferAndCall(self.signer.network().router, juels, data),
            "transferAndCall"
        );
        Ok(receipt.transaction_hash)
    }

    async fn add_consumer(&self, subscription_id: u64, consumer: Address) -> BlockchainResult<TxHash> {
        let receipt = send_and_confirm!(
            self.router.addConsumer(subscription_id, consumer),
            "addConsumer"
        );
        Ok(receipt.transaction_hash)
    }

    async fn remove_consumer(
        &self,
        subscription_id: u64,
        consumer: Address,
    ) -> BlockchainResult<TxHash> {
        let receipt = send_and_confirm!(
            self.router.removeConsumer(subscription_id, consumer),
            "removeConsumer"
        );
        Ok(receipt.transaction_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funding_payload_encodes_id() {
        let data = U256::from(37u64).to_be_bytes::<32>();
        assert_eq!(data.len(), 32);
        assert_eq!(data[31], 37);
        assert!(data[..31].iter().all(|b| *b == 0));
    }
}
