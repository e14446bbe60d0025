//! Factory for the external collaborators a command needs.
//!
//! Handlers never build managers themselves; they ask a `Toolkit`. The live
//! toolkit builds a new signer and manager on every call.

use async_trait::async_trait;

use crate::blockchain::signer::get_signer;
use crate::config::{Chain, Environment};
use crate::error::FunctionsResult;
use crate::secrets::bundle::{build_secrets_object, SecretsBundle};
use crate::secrets::gist::{GistClient, GithubGistClient};
use crate::secrets::manager::{DonSecretsManager, SecretsManager};
use crate::subscriptions::manager::{RouterSubscriptionManager, SubscriptionManager};

/// Source of initialized collaborators.
#[async_trait]
pub trait Toolkit: Send + Sync {
    /// Initialized subscription manager for `chain`.
    async fn subscription_manager(&self, chain: Chain) -> FunctionsResult<Box<dyn SubscriptionManager>>;

    /// Initialized secrets manager for `chain`.
    async fn secrets_manager(&self, chain: Chain) -> FunctionsResult<Box<dyn SecretsManager>>;

    /// Token-authenticated gist client.
    fn gist_client(&self) -> FunctionsResult<Box<dyn GistClient>>;

    /// Secrets bundle for `keys` from the configuration.
    fn secrets(&self, keys: &[String]) -> FunctionsResult<SecretsBundle>;
}

/// Toolkit backed by the chain, the DON gateways, and GitHub.
#[derive(Debug)]
pub struct LiveToolkit<'a> {
    env: &'a Environment,
}

impl<'a> LiveToolkit<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Toolkit for LiveToolkit<'_> {
    async fn subscription_manager(&self, chain: Chain) -> FunctionsResult<Box<dyn SubscriptionManager>> {
        let signer = get_signer(self.env, chain)?;
        let manager = RouterSubscriptionManager::initialize(signer).await?;
        Ok(Box::new(manager))
    }

    async fn secrets_manager(&self, chain: Chain) -> FunctionsResult<Box<dyn SecretsManager>> {
        let signer = get_signer(self.env, chain)?;
        let manager = DonSecretsManager::initialize(signer).await?;
        Ok(Box::new(manager))
    }

    fn gist_client(&self) -> FunctionsResult<Box<dyn GistClient>> {
        let token = self.env.github_api_token()?;
        Ok(Box::new(GithubGistClient::new(token)?))
    }

    fn secrets(&self, keys: &[String]) -> FunctionsResult<SecretsBundle> {
        build_secrets_object(self.env, keys)
    }
}
