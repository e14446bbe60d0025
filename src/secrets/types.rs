//! Secrets types.

use serde::{Deserialize, Serialize};

/// Encrypted secrets as published to gists and printed by `encrypt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedSecrets {
    /// `0x`-prefixed hex ciphertext.
    pub encrypted_secrets: String,
}

impl EncryptedSecrets {
    /// JSON document published to a gist.
    pub fn to_json(&self) -> String {
        serde_json::json!({ "encryptedSecrets": self.encrypted_secrets }).to_string()
    }
}

impl std::fmt::Display for EncryptedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encrypted_secrets)
    }
}

/// Parameters of a DON-hosted secrets upload.
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    /// `0x`-prefixed hex ciphertext from `encrypt_secrets`.
    pub encrypted_secrets_hex: &'a str,
    pub gateway_urls: &'a [&'a str],
    pub slot_id: u32,
    pub minutes_until_expiration: u64,
}

/// Gateway verdict on an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    /// Secrets version (unix seconds at upload).
    pub version: u64,
    /// Whether every node acknowledged the upload.
    pub success: bool,
    pub node_count: usize,
    pub successful_nodes: usize,
}

impl std::fmt::Display for UploadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "version {}, success {} ({}/{} nodes)",
            self.version, self.success, self.successful_nodes, self.node_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypted_secrets_json_shape() {
        let secrets = EncryptedSecrets {
            encrypted_secrets: "0xabcd".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&secrets).unwrap(),
            r#"{"encryptedSecrets":"0xabcd"}"#
        );
        assert_eq!(secrets.to_json(), serde_json::to_string(&secrets).unwrap());
    }
}
