//! Secrets command handlers.

use std::io::Write;

use crate::config::Chain;
use crate::error::{FunctionsError, FunctionsResult};
use crate::lifecycle::{Deferred, DeferredAction};
use crate::secrets::types::{EncryptedSecrets, UploadReport, UploadRequest};
use crate::toolkit::Toolkit;

/// What happened to a published gist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GistOutcome {
    /// Deleted after the delay.
    Deleted { url: String },
    /// The wait was cancelled; the gist is still published.
    Retained { url: String },
}

/// Encrypt secrets and print the ciphertext.
pub async fn encrypt<T, W>(
    toolkit: &T,
    chain: Chain,
    keys: &[String],
    out: &mut W,
) -> FunctionsResult<EncryptedSecrets>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let secrets = toolkit.secrets(keys)?;
    let manager = toolkit.secrets_manager(chain).await?;
    let encrypted = manager.encrypt_secrets(&secrets).await?;

    tracing::info!(chain = %chain, keys = secrets.len(), "Secrets encrypted");
    writeln!(out, "Encrypted secrets: {}", encrypted)?;
    Ok(encrypted)
}

/// Encrypt secrets and push them to every gateway of the chain.
pub async fn encrypt_and_upload<T, W>(
    toolkit: &T,
    chain: Chain,
    keys: &[String],
    slot_id: u32,
    minutes_until_expiration: u64,
    out: &mut W,
) -> FunctionsResult<UploadReport>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let secrets = toolkit.secrets(keys)?;
    let manager = toolkit.secrets_manager(chain).await?;
    let gateway_urls = chain.config().gateway_urls;

    let encrypted = manager.encrypt_secrets(&secrets).await?;
    writeln!(out, "Encrypted secrets: {}", encrypted)?;
    writeln!(
        out,
        "Upload encrypted secret to gateways {}. slotId {}. Expiration in minutes: {}",
        gateway_urls.join(","),
        slot_id,
        minutes_until_expiration
    )?;

    let report = manager
        .upload_encrypted_secrets(UploadRequest {
            encrypted_secrets_hex: &encrypted.encrypted_secrets,
            gateway_urls,
            slot_id,
            minutes_until_expiration,
        })
        .await?;

    tracing::info!(
        chain = %chain,
        slot_id,
        version = report.version,
        success = report.success,
        "Secrets uploaded"
    );
    writeln!(
        out,
        "Secrets uploaded to gateways {}. Gateways response: {}",
        gateway_urls.join(","),
        report
    )?;
    Ok(report)
}

/// Encrypt secrets, publish them as a gist, and delete the gist after `deletion` elapses.
///
/// A failed deletion is not retried; it is reported as
/// [`FunctionsError::GistDeletion`] naming the gist left behind.
pub async fn encrypt_to_gist<T, W>(
    toolkit: &T,
    chain: Chain,
    keys: &[String],
    deletion: DeferredAction,
    out: &mut W,
) -> FunctionsResult<GistOutcome>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let secrets = toolkit.secrets(keys)?;
    let gists = toolkit.gist_client()?;
    let manager = toolkit.secrets_manager(chain).await?;

    let encrypted = manager.encrypt_secrets(&secrets).await?;
    writeln!(out, "Encrypted secrets: {}", encrypted)?;

    writeln!(out, "Creating gist...")?;
    let url = gists.create_gist(&encrypted.to_json()).await?;

    tracing::info!(url = %url, delay_secs = deletion.delay().as_secs(), "Gist created");
    writeln!(
        out,
        "Gist {} created. You have {} seconds to verify its creation before it gets deleted.",
        url,
        deletion.delay().as_secs()
    )?;
    out.flush()?;

    let outcome = deletion.run(|| gists.delete_gist(&url)).await;
    match outcome {
        Deferred::Ran(Ok(status)) => {
            tracing::info!(url = %url, "Gist deleted");
            writeln!(out, "Gist {} successfully deleted. Status: {}", url, status)?;
            Ok(GistOutcome::Deleted { url })
        }
        Deferred::Ran(Err(reason)) => Err(FunctionsError::GistDeletion { url, reason }),
        Deferred::Cancelled => {
            tracing::warn!(url = %url, "Gist deletion cancelled, gist remains published");
            writeln!(out, "Deletion of gist {} cancelled; it remains published.", url)?;
            Ok(GistOutcome::Retained { url })
        }
    }
}

/// Encrypt secrets-hosting URLs and print the ciphertext.
pub async fn encrypt_urls<T, W>(
    toolkit: &T,
    chain: Chain,
    urls: &[String],
    out: &mut W,
) -> FunctionsResult<String>
where
    T: Toolkit + ?Sized,
    W: Write + Send,
{
    let manager = toolkit.secrets_manager(chain).await?;
    let encrypted = manager.encrypt_secrets_urls(urls).await?;

    tracing::info!(chain = %chain, urls = urls.len(), "Secrets URLs encrypted");
    writeln!(out, "Encrypted secrets URLs: {}", encrypted)?;
    Ok(encrypted)
}
