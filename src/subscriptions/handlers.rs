//! Subscription command handlers.
//!
//! Each handler acquires a fresh manager, performs one operation, and prints
//! the outcome. State-changing handlers re-read the subscription afterwards.

use std::io::Write;

use alloy::primitives::{Address, U256};

use crate::config::Chain;
use crate::error::FunctionsResult;
use crate::subscriptions::types::SubscriptionInfo;
use crate::toolkit::Toolkit;

/// Fetch and print subscription information.
pub async fn read<T, W>(
    toolkit: &T,
    chain: Chain,
    subscription_id: u64,
    out: &mut W,
) -> FunctionsResult<SubscriptionInfo>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let manager = toolkit.subscription_manager(chain).await?;
    let info = manager.get_subscription_info(subscription_id).await?;

    tracing::debug!(chain = %chain, subscription_id, "Subscription fetched");
    writeln!(out, "Subscription {}", subscription_id)?;
    writeln!(
        out,
        "Subscription details: {}",
        serde_json::to_string_pretty(&info).unwrap_or_else(|_| format!("{:?}", info))
    )?;
    Ok(info)
}

/// Create a subscription and print it.
pub async fn create<T, W>(
    toolkit: &T,
    chain: Chain,
    consumer: Option<Address>,
    out: &mut W,
) -> FunctionsResult<u64>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let manager = toolkit.subscription_manager(chain).await?;
    let subscription_id = manager.create_subscription(consumer).await?;

    tracing::info!(chain = %chain, subscription_id, consumer = ?consumer, "Subscription created");
    writeln!(out, "Subscription created: {}", subscription_id)?;

    read(toolkit, chain, subscription_id, out).await?;
    Ok(subscription_id)
}

/// Cancel a subscription.
pub async fn cancel<T, W>(
    toolkit: &T,
    chain: Chain,
    subscription_id: u64,
    refund_address: Option<Address>,
    out: &mut W,
) -> FunctionsResult<()>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let manager = toolkit.subscription_manager(chain).await?;
    let tx_hash = manager
        .cancel_subscription(subscription_id, refund_address)
        .await?;

    tracing::info!(chain = %chain, subscription_id, tx_hash = %tx_hash, "Subscription cancelled");
    writeln!(out, "Subscription {} deleted.", subscription_id)?;
    writeln!(out, "Transaction: {}", chain.config().tx_url(tx_hash))?;
    Ok(())
}

/// Fund a subscription with `juels` and print it.
pub async fn fund<T, W>(
    toolkit: &T,
    chain: Chain,
    subscription_id: u64,
    juels: U256,
    out: &mut W,
) -> FunctionsResult<()>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let manager = toolkit.subscription_manager(chain).await?;
    let tx_hash = manager.fund_subscription(subscription_id, juels).await?;

    tracing::info!(chain = %chain, subscription_id, juels = %juels, "Subscription funded");
    writeln!(out, "Subscription {} funded with {} Juels", subscription_id, juels)?;
    writeln!(out, "Transaction: {}", chain.config().tx_url(tx_hash))?;

    read(toolkit, chain, subscription_id, out).await?;
    Ok(())
}

/// Allow-list a consumer and print the subscription.
pub async fn add_consumer<T, W>(
    toolkit: &T,
    chain: Chain,
    subscription_id: u64,
    consumer: Address,
    out: &mut W,
) -> FunctionsResult<()>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let manager = toolkit.subscription_manager(chain).await?;
    let tx_hash = manager.add_consumer(subscription_id, consumer).await?;

    tracing::info!(chain = %chain, subscription_id, consumer = %consumer, "Consumer added");
    writeln!(out, "Consumer {} added to subscription {}", consumer, subscription_id)?;
    writeln!(out, "Transaction: {}", chain.config().tx_url(tx_hash))?;

    read(toolkit, chain, subscription_id, out).await?;
    Ok(())
}

/// Remove a consumer and print the subscription.
pub async fn remove_consumer<T, W>(
    toolkit: &T,
    chain: Chain,
    subscription_id: u64,
    consumer: Address,
    out: &mut W,
) -> FunctionsResult<()>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let manager = toolkit.subscription_manager(chain).await?;
    let tx_hash = manager.remove_consumer(subscription_id, consumer).await?;

    tracing::info!(chain = %chain, subscription_id, consumer = %consumer, "Consumer removed");
    writeln!(out, "Consumer {} removed from subscription {}", consumer, subscription_id)?;
    writeln!(out, "Transaction: {}", chain.config().tx_url(tx_hash))?;

    read(toolkit, chain, subscription_id, out).await?;
    Ok(())
}
