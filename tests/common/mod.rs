//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use functions_cli::blockchain::BlockchainResult;
use functions_cli::cli::{Command, Dispatcher, Invocation};
use functions_cli::config::{Chain, Environment};
use functions_cli::error::{ExternalError, FunctionsResult};
use functions_cli::secrets::{
    build_secrets_object, EncryptedSecrets, GistClient, SecretsBundle, SecretsManager,
    UploadReport, UploadRequest,
};
use functions_cli::subscriptions::{SubscriptionInfo, SubscriptionManager};
use functions_cli::toolkit::Toolkit;

pub const GIST_URL: &str = "https://gist.github.com/octocat/aa5a315d61ae9438b18d/raw";
pub const CREATED_SUBSCRIPTION_ID: u64 = 4242;

/// Collaborator calls observed by a [`FakeToolkit`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SubscriptionManager(Chain),
    SecretsManager(Chain),
    GistClient,
    GetSubscription(u64),
    CreateSubscription(Option<Address>),
    CancelSubscription(u64, Option<Address>),
    FundSubscription(u64, U256),
    AddConsumer(u64, Address),
    RemoveConsumer(u64, Address),
    EncryptSecrets(Vec<String>),
    EncryptSecretsUrls(Vec<String>),
    UploadSecrets { slot_id: u32, minutes: u64 },
    CreateGist(String),
    DeleteGist(String),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

fn record(log: &CallLog, call: Call) {
    log.lock().unwrap().push(call);
}

/// In-memory toolkit recording every collaborator call.
#[derive(Clone)]
pub struct FakeToolkit {
    pub env: Environment,
    pub calls: CallLog,
    pub fail_gist_deletion: bool,
}

impl FakeToolkit {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_gist_deletion: false,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DeleteGist(url) => Some(url),
                _ => None,
            })
            .collect()
    }
}

/// Environment with a GitHub token and two configured secrets.
pub fn test_env() -> Environment {
    Environment::from_vars([
        ("PRIVATE_KEY", "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
        ("POLYGON_MUMBAI_RPC_URL", "http://127.0.0.1:8545"),
        ("GITHUB_API_TOKEN", "ghp_test"),
        ("SECRET1", "value1"),
        ("A", "valueA"),
    ])
}

#[async_trait]
impl Toolkit for FakeToolkit {
    async fn subscription_manager(&self, chain: Chain) -> FunctionsResult<Box<dyn SubscriptionManager>> {
        record(&self.calls, Call::SubscriptionManager(chain));
        Ok(Box::new(FakeSubscriptions {
            calls: self.calls.clone(),
        }))
    }

    async fn secrets_manager(&self, chain: Chain) -> FunctionsResult<Box<dyn SecretsManager>> {
        record(&self.calls, Call::SecretsManager(chain));
        Ok(Box::new(FakeSecrets {
            calls: self.calls.clone(),
        }))
    }

    fn gist_client(&self) -> FunctionsResult<Box<dyn GistClient>> {
        self.env.github_api_token()?;
        record(&self.calls, Call::GistClient);
        Ok(Box::new(FakeGists {
            calls: self.calls.clone(),
            fail_deletion: self.fail_gist_deletion,
        }))
    }

    fn secrets(&self, keys: &[String]) -> FunctionsResult<SecretsBundle> {
        build_secrets_object(&self.env, keys)
    }
}

struct FakeSubscriptions {
    calls: CallLog,
}

fn tx_hash(n: u8) -> TxHash {
    B256::repeat_byte(n)
}

#[async_trait]
impl SubscriptionManager for FakeSubscriptions {
    async fn get_subscription_info(&self, subscription_id: u64) -> BlockchainResult<SubscriptionInfo> {
        record(&self.calls, Call::GetSubscription(subscription_id));
        Ok(SubscriptionInfo {
            balance: U256::from(subscription_id),
            owner: Address::repeat_byte(0x11),
            blocked_balance: U256::ZERO,
            proposed_owner: Address::ZERO,
            consumers: vec![],
            flags: B256::ZERO,
        })
    }

    async fn create_subscription(&self, consumer: Option<Address>) -> BlockchainResult<u64> {
        record(&self.calls, Call::CreateSubscription(consumer));
        Ok(CREATED_SUBSCRIPTION_ID)
    }

    async fn cancel_subscription(
        &self,
        subscription_id: u64,
        refund_address: Option<Address>,
    ) -> BlockchainResult<TxHash> {
        record(&self.calls, Call::CancelSubscription(subscription_id, refund_address));
        Ok(tx_hash(1))
    }

    async fn fund_subscription(&self, subscription_id: u64, juels: U256) -> BlockchainResult<TxHash> {
        record(&self.calls, Call::FundSubscription(subscription_id, juels));
        Ok(tx_hash(2))
    }

    async fn add_consumer(&self, subscription_id: u64, consumer: Address) -> BlockchainResult<TxHash> {
        record(&self.calls, Call::AddConsumer(subscription_id, consumer));
        Ok(tx_hash(3))
    }

    async fn remove_consumer(&self, subscription_id: u64, consumer: Address) -> BlockchainResult<TxHash> {
        record(&self.calls, Call::RemoveConsumer(subscription_id, consumer));
        Ok(tx_hash(4))
    }
}

struct FakeSecrets {
    calls: CallLog,
}

#[async_trait]
impl SecretsManager for FakeSecrets {
    async fn encrypt_secrets(&self, secrets: &SecretsBundle) -> BlockchainResult<EncryptedSecrets> {
        record(
            &self.calls,
            Call::EncryptSecrets(secrets.keys().map(str::to_string).collect()),
        );
        Ok(EncryptedSecrets {
            encrypted_secrets: "0xdeadbeef".to_string(),
        })
    }

    async fn encrypt_secrets_urls(&self, urls: &[String]) -> BlockchainResult<String> {
        record(&self.calls, Call::EncryptSecretsUrls(urls.to_vec()));
        Ok("0xcafe".to_string())
    }

    async fn upload_encrypted_secrets(&self, request: UploadRequest<'_>) -> BlockchainResult<UploadReport> {
        record(
            &self.calls,
            Call::UploadSecrets {
                slot_id: request.slot_id,
                minutes: request.minutes_until_expiration,
            },
        );
        Ok(UploadReport {
            version: 1_700_000_000,
            success: true,
            node_count: 4,
            successful_nodes: 4,
        })
    }
}

struct FakeGists {
    calls: CallLog,
    fail_deletion: bool,
}

#[async_trait]
impl GistClient for FakeGists {
    async fn create_gist(&self, content: &str) -> Result<String, ExternalError> {
        record(&self.calls, Call::CreateGist(content.to_string()));
        Ok(GIST_URL.to_string())
    }

    async fn delete_gist(&self, gist_url: &str) -> Result<bool, ExternalError> {
        record(&self.calls, Call::DeleteGist(gist_url.to_string()));
        if self.fail_deletion {
            return Err(ExternalError::Gist("Gist deletion returned status 404 Not Found".to_string()));
        }
        Ok(true)
    }
}

/// Parse `args` and dispatch against `toolkit`, returning the printed output.
pub async fn run_command<T: Toolkit>(toolkit: &T, args: &[&str]) -> FunctionsResult<String> {
    let command = Command::parse(Invocation::new(args.iter().copied()))?;
    let mut out = Vec::new();
    Dispatcher::new(toolkit).dispatch(command, &mut out).await?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// A request received by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).into_owned();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` maps each request to a status and body; every request is recorded.
pub async fn start_programmable_backend<F>(f: F) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>)
where
    F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let log = seen.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(&request);
                        log.lock().unwrap().push(request);

                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            204 => "204 No Content",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            _ => "200 OK",
                        };
                        let response = if status == 204 {
                            format!("HTTP/1.1 {}\r\nConnection: close\r\n\r\n", status_text)
                        } else {
                            format!(
                                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status_text,
                                body.len(),
                                body
                            )
                        };
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}
