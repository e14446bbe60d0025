//! Routes a parsed command to its handler.

use std::io::Write;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cli::command::Command;
use crate::config::Chain;
use crate::error::FunctionsResult;
use crate::lifecycle::DeferredAction;
use crate::secrets::handlers as secrets;
use crate::subscriptions::handlers as subscriptions;
use crate::toolkit::Toolkit;

/// How long a published gist stays up before it is deleted.
pub const GIST_LIFETIME: Duration = Duration::from_secs(60);

/// Runs commands against one toolkit.
pub struct Dispatcher<'a, T: Toolkit + ?Sized> {
    toolkit: &'a T,
    gist_lifetime: Duration,
    gist_token: CancellationToken,
}

impl<'a, T: Toolkit + ?Sized> Dispatcher<'a, T> {
    pub fn new(toolkit: &'a T) -> Self {
        Self {
            toolkit,
            gist_lifetime: GIST_LIFETIME,
            gist_token: CancellationToken::new(),
        }
    }

    /// Override the gist lifetime.
    pub fn with_gist_lifetime(mut self, lifetime: Duration) -> Self {
        self.gist_lifetime = lifetime;
        self
    }

    /// Token that aborts a pending gist deletion.
    pub fn with_gist_cancellation(mut self, token: CancellationToken) -> Self {
        self.gist_token = token;
        self
    }

    /// Run `command`, writing its output to `out`.
    pub async fn dispatch<W: Write + Send>(&self, command: Command, out: &mut W) -> FunctionsResult<()> {
        let toolkit = self.toolkit;
        tracing::debug!(command = %command.kind(), "Dispatching command");

        match command {
            Command::Read {
                chain,
                subscription_id,
            } => {
                subscriptions::read(toolkit, chain, subscription_id, out).await?;
            }
            Command::Create { chain, consumer } => {
                subscriptions::create(toolkit, chain, consumer, out).await?;
            }
            Command::Cancel {
                chain,
                subscription_id,
                refund_address,
            } => {
                subscriptions::cancel(toolkit, chain, subscription_id, refund_address, out).await?;
            }
            Command::Fund {
                chain,
                subscription_id,
                juels,
            } => {
                subscriptions::fund(toolkit, chain, subscription_id, juels, out).await?;
            }
            Command::AddConsumer {
                chain,
                subscription_id,
                consumer,
            } => {
                subscriptions::add_consumer(toolkit, chain, subscription_id, consumer, out).await?;
            }
            Command::RemoveConsumer {
                chain,
                subscription_id,
                consumer,
            } => {
                subscriptions::remove_consumer(toolkit, chain, subscription_id, consumer, out)
                    .await?;
            }
            Command::Encrypt { chain, keys } => {
                secrets::encrypt(toolkit, chain, &keys, out).await?;
            }
            Command::EncryptUpload {
                chain,
                keys,
                slot_id,
                minutes_until_expiration,
            } => {
                secrets::encrypt_and_upload(
                    toolkit,
                    chain,
                    &keys,
                    slot_id,
                    minutes_until_expiration,
                    out,
                )
                .await?;
            }
            Command::EncryptGist { chain, keys } => {
                let deletion =
                    DeferredAction::with_token(self.gist_lifetime, self.gist_token.clone());
                secrets::encrypt_to_gist(toolkit, chain, &keys, deletion, out).await?;
            }
            Command::EncryptUrls { chain, urls } => {
                secrets::encrypt_urls(toolkit, chain, &urls, out).await?;
            }
            Command::Networks => print_networks(out)?,
        }
        Ok(())
    }
}

fn print_networks<W: Write>(out: &mut W) -> FunctionsResult<()> {
    for chain in Chain::ALL {
        let network = chain.config();
        writeln!(
            out,
            "{:<16} chain id {:<9} router {} DON {}",
            chain.as_str(),
            network.chain_id,
            network.router,
            network.don_id
        )?;
        writeln!(out, "{:<16} rpc url from {}", "", network.rpc_url_var)?;
    }
    Ok(())
}
