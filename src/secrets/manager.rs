//! Secrets manager: DON key lookup, secrets encryption, gateway upload.
//!
//! # Responsibilities
//! - Resolve the DON coordinator through the router
//! - Sign and encrypt secrets for the DON
//! - Upload encrypted secrets to the DON gateways
//!
//! The hosted DON additionally applies threshold encryption; that layer
//! belongs to the DON toolchain and is not produced here.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy::hex;
use alloy::primitives::{Address, FixedBytes};
use alloy::providers::DynProvider;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use k256::PublicKey;

use crate::blockchain::signer::FunctionsSigner;
use crate::blockchain::types::BlockchainResult;
use crate::error::ExternalError;
use crate::secrets::bundle::SecretsBundle;
use crate::secrets::cipher;
use crate::secrets::gateway::{self, GatewayRequest, MessageBody, SecretsSetPayload};
use crate::secrets::types::{EncryptedSecrets, UploadReport, UploadRequest};
use crate::subscriptions::contracts::{IFunctionsCoordinator, IFunctionsRouter};

/// Minimum lifetime of DON-hosted secrets.
pub const MIN_EXPIRATION_MINUTES: u64 = 5;

/// Maximum lifetime of DON-hosted secrets (one year).
pub const MAX_EXPIRATION_MINUTES: u64 = 365 * 24 * 60;

/// Operations on off-chain secrets.
#[async_trait]
pub trait SecretsManager: Send + Sync {
    /// Sign and encrypt a secrets bundle for the DON.
    async fn encrypt_secrets(&self, secrets: &SecretsBundle) -> BlockchainResult<EncryptedSecrets>;

    /// Encrypt a list of URLs that host encrypted secrets. Returns `0x` hex.
    async fn encrypt_secrets_urls(&self, urls: &[String]) -> BlockchainResult<String>;

    /// Push encrypted secrets to the DON gateways.
    async fn upload_encrypted_secrets(&self, request: UploadRequest<'_>)
        -> BlockchainResult<UploadReport>;
}

/// `SecretsManager` bound to one chain's router and DON.
pub struct DonSecretsManager {
    signer: FunctionsSigner,
    coordinator: IFunctionsCoordinator::IFunctionsCoordinatorInstance<DynProvider>,
    http: reqwest::Client,
}

/// DON id as the router's bytes32 contract id.
pub fn don_id_bytes32(don_id: &str) -> BlockchainResult<FixedBytes<32>> {
    if don_id.len() > 32 {
        return Err(ExternalError::Encryption(format!(
            "DON id '{}' exceeds 32 bytes",
            don_id
        )));
    }
    Ok(FixedBytes::<32>::right_padding_from(don_id.as_bytes()))
}

/// Expiration timestamp in unix milliseconds, `minutes` after `now_millis`.
pub fn expiration_millis(now_millis: u64, minutes: u64) -> BlockchainResult<u64> {
    if !(MIN_EXPIRATION_MINUTES..=MAX_EXPIRATION_MINUTES).contains(&minutes) {
        return Err(ExternalError::Gateway(format!(
            "Expiration must be between {} and {} minutes, got {}",
            MIN_EXPIRATION_MINUTES, MAX_EXPIRATION_MINUTES, minutes
        )));
    }
    minutes
        .checked_mul(60 * 1000)
        .and_then(|ms| ms.checked_add(now_millis))
        .ok_or_else(|| ExternalError::Gateway(format!("Expiration of {} minutes overflows", minutes)))
}

fn now() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

impl DonSecretsManager {
    /// Resolve the coordinator serving the chain's DON.
    pub async fn initialize(signer: FunctionsSigner) -> BlockchainResult<Self> {
        signer.verify_chain_id().await?;

        let network = signer.network();
        let router = IFunctionsRouter::new(network.router, signer.provider().clone());
        let coordinator_address: Address = router
            .getContractById(don_id_bytes32(network.don_id)?)
            .call()
            .await
            .map_err(|e| ExternalError::Contract {
                call: "getContractById",
                reason: e.to_string(),
            })?;

        tracing::debug!(
            chain = %signer.chain(),
            don_id = network.don_id,
            coordinator = %coordinator_address,
            "Secrets manager initialized"
        );

        let coordinator = IFunctionsCoordinator::new(coordinator_address, signer.provider().clone());
        Ok(Self {
            signer,
            coordinator,
            http: reqwest::Client::new(),
        })
    }

    async fn don_public_key(&self) -> BlockchainResult<PublicKey> {
        let raw = self
            .coordinator
            .getDONPublicKey()
            .call()
            .await
            .map_err(|e| ExternalError::Contract {
                call: "getDONPublicKey",
                reason: e.to_string(),
            })?;
        cipher::parse_public_key(&raw)
    }
}

#[async_trait]
impl SecretsManager for DonSecretsManager {
    async fn encrypt_secrets(&self, secrets: &SecretsBundle) -> BlockchainResult<EncryptedSecrets> {
        let message = secrets.to_json();
        let signature = self.signer.wallet().sign_message(message.as_bytes()).await?;

        let signed = serde_json::json!({
            "message": message,
            "signature": format!("0x{}", hex::encode(signature.as_bytes())),
        })
        .to_string();

        let don_key = self.don_public_key().await?;
        let envelope = cipher::seal(&don_key, signed.as_bytes())?;
        let wrapped = serde_json::json!({ "0x0": general_purpose::STANDARD.encode(envelope) })
            .to_string();

        tracing::debug!(keys = secrets.len(), "Secrets encrypted");
        tracing::warn!(
            "Secrets are sealed to the DON public key without threshold encryption; \
             a hosted DON that expects threshold-encrypted secrets cannot decrypt them"
        );
        Ok(EncryptedSecrets {
            encrypted_secrets: format!("0x{}", hex::encode(wrapped.as_bytes())),
        })
    }

    async fn encrypt_secrets_urls(&self, urls: &[String]) -> BlockchainResult<String> {
        for raw in urls {
            url::Url::parse(raw)
                .map_err(|e| ExternalError::Encryption(format!("Invalid secrets URL '{}': {}", raw, e)))?;
        }
        let don_key = self.don_public_key().await?;
        let envelope = cipher::seal(&don_key, urls.join(" ").as_bytes())?;
        Ok(format!("0x{}", hex::encode(envelope)))
    }

    async fn upload_encrypted_secrets(
        &self,
        request: UploadRequest<'_>,
    ) -> BlockchainResult<UploadReport> {
        let now = now();
        let version = now.as_secs();
        let expiration = expiration_millis(
            u64::try_from(now.as_millis()).unwrap_or(u64::MAX),
            request.minutes_until_expiration,
        )?;

        let encrypted = hex::decode(request.encrypted_secrets_hex)
            .map_err(|e| ExternalError::Gateway(format!("Encrypted secrets are not hex: {}", e)))?;
        let payload = general_purpose::STANDARD.encode(encrypted);

        let storage_message = serde_json::json!({
            "address": self.signer.address().to_string(),
            "slotid": request.slot_id,
            "payload": payload,
            "version": version,
            "expiration": expiration,
        })
        .to_string();
        let storage_signature = self
            .signer
            .wallet()
            .sign_message(storage_message.as_bytes())
            .await?;

        let body = MessageBody {
            message_id: fastrand::u32(..).to_string(),
            method: gateway::SECRETS_SET_METHOD.to_string(),
            don_id: self.signer.network().don_id.to_string(),
            receiver: String::new(),
            payload: SecretsSetPayload {
                slot_id: request.slot_id,
                version,
                payload,
                expiration,
                signature: general_purpose::STANDARD.encode(storage_signature.as_bytes()),
            },
        };
        let message_signature = self
            .signer
            .wallet()
            .sign_message(&gateway::signing_bytes(&body)?)
            .await?;
        let gateway_request = GatewayRequest::new(
            body,
            format!("0x{}", hex::encode(message_signature.as_bytes())),
        );

        let tally =
            gateway::send_to_gateways(&self.http, request.gateway_urls, &gateway_request).await?;

        Ok(UploadReport {
            version,
            success: tally.all_succeeded(),
            node_count: tally.node_count,
            successful_nodes: tally.successful_nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::signer::get_signer;
    use crate::config::{Chain, Environment};

    /// Manager wired to endpoints that refuse connections.
    fn offline_manager() -> DonSecretsManager {
        let env = Environment::from_vars([
            (
                "PRIVATE_KEY",
                "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            ),
            ("POLYGON_MUMBAI_RPC_URL", "http://127.0.0.1:1"),
        ]);
        let signer = get_signer(&env, Chain::PolygonMumbai).unwrap();
        let coordinator = IFunctionsCoordinator::new(Address::ZERO, signer.provider().clone());
        DonSecretsManager {
            signer,
            coordinator,
            http: reqwest::Client::new(),
        }
    }

    fn upload(minutes: u64) -> UploadRequest<'static> {
        UploadRequest {
            encrypted_secrets_hex: "0xdeadbeef",
            gateway_urls: &["http://127.0.0.1:1/"],
            slot_id: 0,
            minutes_until_expiration: minutes,
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_short_expiration() {
        let err = offline_manager()
            .upload_encrypted_secrets(upload(MIN_EXPIRATION_MINUTES - 1))
            .await
            .unwrap_err();
        match err {
            ExternalError::Gateway(reason) => assert!(reason.contains("between 5 and")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_huge_expiration() {
        let err = offline_manager()
            .upload_encrypted_secrets(upload(u64::MAX / 1000))
            .await
            .unwrap_err();
        assert!(matches!(err, ExternalError::Gateway(_)));
    }

    #[test]
    fn test_expiration_millis() {
        assert_eq!(expiration_millis(1_000, 5).unwrap(), 1_000 + 5 * 60 * 1000);
        assert!(expiration_millis(0, MAX_EXPIRATION_MINUTES).is_ok());
        assert!(expiration_millis(0, MAX_EXPIRATION_MINUTES + 1).is_err());
        assert!(expiration_millis(u64::MAX, MIN_EXPIRATION_MINUTES).is_err());
        assert!(expiration_millis(0, u64::MAX).is_err());
    }

    #[test]
    fn test_don_id_bytes32() {
        let id = don_id_bytes32("fun-polygon-mumbai-1").unwrap();
        assert_eq!(&id[..20], b"fun-polygon-mumbai-1");
        assert!(id[20..].iter().all(|b| *b == 0));
        assert!(don_id_bytes32(&"x".repeat(33)).is_err());
    }
}
