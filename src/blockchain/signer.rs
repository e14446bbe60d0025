//! Signer factory: provider + wallet for one chain.
//!
//! # Responsibilities
//! - Compose the Environment (private key, RPC URL) with the network registry
//! - Build an HTTP provider that signs and fills transactions
//! - Verify the endpoint serves the chain the registry expects

use std::time::Duration;

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainResult, ChainId};
use crate::blockchain::wallet::Wallet;
use crate::config::{Chain, ChainConfig, Environment};
use crate::error::{ExternalError, FunctionsError, FunctionsResult};

/// Timeout applied to read-only RPC calls issued here.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated client able to submit transactions on one chain.
#[derive(Clone)]
pub struct FunctionsSigner {
    chain: Chain,
    wallet: Wallet,
    provider: DynProvider,
}

/// Build a fresh signer for `chain`. Nothing is cached between calls.
pub fn get_signer(env: &Environment, chain: Chain) -> FunctionsResult<FunctionsSigner> {
    let network = chain.config();

    let private_key = env.private_key()?;
    let wallet = Wallet::from_private_key(private_key, network.chain_id).map_err(|e| {
        FunctionsError::InvalidConfiguration {
            variable: crate::config::env::PRIVATE_KEY_ENV_VAR.to_string(),
            reason: e.to_string(),
        }
    })?;

    let rpc_url = env.provider_rpc_url(chain)?;
    let url: url::Url = rpc_url
        .parse()
        .map_err(|e: url::ParseError| FunctionsError::InvalidConfiguration {
            variable: network.rpc_url_var.to_string(),
            reason: e.to_string(),
        })?;

    let provider = ProviderBuilder::new()
        .wallet(wallet.ethereum_wallet())
        .connect_http(url)
        .erased();

    tracing::debug!(
        chain = %chain,
        address = %wallet.address(),
        "Signer created"
    );

    Ok(FunctionsSigner {
        chain,
        wallet,
        provider,
    })
}

impl FunctionsSigner {
    /// Chain this signer is bound to.
    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Static configuration of the bound chain.
    pub fn network(&self) -> &'static ChainConfig {
        self.chain.config()
    }

    /// Signing wallet.
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Address transactions are sent from.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Provider with the wallet filler attached.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        match timeout(RPC_TIMEOUT, self.provider.get_chain_id()).await {
            Ok(Ok(id)) => Ok(ChainId(id)),
            Ok(Err(e)) => Err(ExternalError::Rpc(e.to_string())),
            Err(_) => Err(ExternalError::Timeout(RPC_TIMEOUT.as_secs())),
        }
    }

    /// Verify the connected chain ID matches the registry.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let expected = self.network().chain_id;
        let actual = self.get_chain_id().await?;
        if actual.0 != expected {
            return Err(ExternalError::ChainMismatch {
                expected,
                actual: actual.0,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for FunctionsSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionsSigner")
            .field("chain", &self.chain)
            .field("address", &self.wallet.address())
            .finish()
    }
}
