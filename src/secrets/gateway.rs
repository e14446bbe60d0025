//! DON gateway messages.
//!
//! A gateway request is a JSON-RPC envelope whose body is signed by the
//! sender. The signed bytes are the fixed-width, zero-padded header fields
//! followed by the JSON payload.

use serde::{Deserialize, Serialize};

use crate::error::ExternalError;

pub const SECRETS_SET_METHOD: &str = "secrets_set";

const MESSAGE_ID_LEN: usize = 128;
const METHOD_LEN: usize = 64;
const DON_ID_LEN: usize = 64;
const RECEIVER_LEN: usize = 42;

/// Payload of a `secrets_set` request.
#[derive(Debug, Clone, Serialize)]
pub struct SecretsSetPayload {
    pub slot_id: u32,
    pub version: u64,
    /// Base64 of the encrypted secrets bytes.
    pub payload: String,
    /// Expiration as unix milliseconds.
    pub expiration: u64,
    /// Base64 of the storage signature.
    pub signature: String,
}

/// Signed portion of a gateway request.
#[derive(Debug, Clone, Serialize)]
pub struct MessageBody<P> {
    pub message_id: String,
    pub method: String,
    pub don_id: String,
    pub receiver: String,
    pub payload: P,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayParams<P> {
    pub body: MessageBody<P>,
    /// `0x` hex signature over [`signing_bytes`].
    pub signature: String,
}

/// JSON-RPC request sent to a gateway.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayRequest<P> {
    pub id: String,
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: GatewayParams<P>,
}

impl<P> GatewayRequest<P> {
    pub fn new(body: MessageBody<P>, signature: String) -> Self {
        Self {
            id: body.message_id.clone(),
            jsonrpc: "2.0",
            method: body.method.clone(),
            params: GatewayParams { body, signature },
        }
    }
}

fn pad(field: &'static str, value: &str, width: usize) -> Result<Vec<u8>, ExternalError> {
    let bytes = value.as_bytes();
    if bytes.len() > width {
        return Err(ExternalError::Gateway(format!(
            "{} exceeds {} bytes",
            field, width
        )));
    }
    let mut padded = vec![0u8; width];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(padded)
}

/// Bytes the sender signs for a gateway message.
pub fn signing_bytes<P: Serialize>(body: &MessageBody<P>) -> Result<Vec<u8>, ExternalError> {
    let mut bytes = Vec::with_capacity(MESSAGE_ID_LEN + METHOD_LEN + DON_ID_LEN + RECEIVER_LEN);
    bytes.extend(pad("message_id", &body.message_id, MESSAGE_ID_LEN)?);
    bytes.extend(pad("method", &body.method, METHOD_LEN)?);
    bytes.extend(pad("don_id", &body.don_id, DON_ID_LEN)?);
    bytes.extend(pad("receiver", &body.receiver, RECEIVER_LEN)?);
    let payload =
        serde_json::to_vec(&body.payload).map_err(|e| ExternalError::Gateway(e.to_string()))?;
    bytes.extend(payload);
    Ok(bytes)
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    result: Option<ResponseResult>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseResult {
    body: ResponseBody,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    payload: ResponsePayload,
}

#[derive(Debug, Deserialize)]
struct ResponsePayload {
    #[serde(default)]
    node_responses: Vec<NodeResponse>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NodeResponse {
    body: NodeBody,
}

#[derive(Debug, Deserialize)]
struct NodeBody {
    payload: NodePayload,
}

#[derive(Debug, Deserialize)]
struct NodePayload {
    #[serde(default)]
    success: bool,
}

/// Per-node acknowledgement counts from one gateway answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTally {
    pub node_count: usize,
    pub successful_nodes: usize,
}

impl NodeTally {
    pub fn all_succeeded(&self) -> bool {
        self.node_count > 0 && self.successful_nodes == self.node_count
    }
}

fn tally(response: GatewayResponse) -> Result<NodeTally, ExternalError> {
    if let Some(error) = response.error {
        return Err(ExternalError::Gateway(error.to_string()));
    }
    let payload = response
        .result
        .ok_or_else(|| ExternalError::Gateway("Response has no result".to_string()))?
        .body
        .payload;

    if payload.node_responses.is_empty() {
        let reason = payload
            .error_message
            .unwrap_or_else(|| "No node responses".to_string());
        return Err(ExternalError::Gateway(reason));
    }

    Ok(NodeTally {
        node_count: payload.node_responses.len(),
        successful_nodes: payload
            .node_responses
            .iter()
            .filter(|n| n.body.payload.success)
            .count(),
    })
}

/// Send `request` to each gateway in order until one answers.
pub async fn send_to_gateways<P: Serialize>(
    http: &reqwest::Client,
    gateway_urls: &[&str],
    request: &GatewayRequest<P>,
) -> Result<NodeTally, ExternalError> {
    for url in gateway_urls {
        let response = match http.post(*url).json(request).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(gateway = %url, error = %e, "Gateway unreachable, trying next");
                continue;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(gateway = %url, status = %status, "Gateway returned error status, trying next");
            continue;
        }

        match response.json::<GatewayResponse>().await {
            Ok(parsed) => match tally(parsed) {
                Ok(t) => {
                    tracing::info!(
                        gateway = %url,
                        nodes = t.node_count,
                        successful = t.successful_nodes,
                        "Gateway accepted request"
                    );
                    return Ok(t);
                }
                Err(e) => tracing::warn!(gateway = %url, error = %e, "Gateway rejected request"),
            },
            Err(e) => tracing::warn!(gateway = %url, error = %e, "Malformed gateway response"),
        }
    }
    Err(ExternalError::Gateway("All gateways failed".to_string()))
}
