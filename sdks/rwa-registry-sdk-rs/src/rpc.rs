//! Lightweight Solana JSON-RPC client
//!
//! Implements only the methods this client actually needs (account fetch,
//! blockhash, transaction submission), avoiding the heavy dependency chain of
//! the full RPC crate. Submission is abstracted behind [`TransactionSender`]
//! so flows can be driven against fakes in tests.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use tracing::debug;

use crate::error::RegistryError;

/// Default public RPC endpoint used when none is configured.
pub const DEFAULT_RPC_ENDPOINT: &str = "https://api.devnet.solana.com";

/// Configuration for [`RpcClient`].
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL
    pub endpoint_url: String,
    /// Per-request timeout applied to every call
    pub request_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_RPC_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// JSON-RPC response wrapper
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Account fields as reported by the RPC node, data already base64-decoded.
#[derive(Debug, Clone)]
pub struct FetchedAccount {
    /// Balance in lamports
    pub lamports: u64,
    /// Raw account data
    pub data: Vec<u8>,
    /// Owning program address
    pub owner: String,
    /// Whether the account holds an executable program
    pub executable: bool,
    /// Allocated byte size
    pub space: u64,
}

/// Wire shape of `getAccountInfo` / `getProgramAccounts` account values.
#[derive(Debug, Deserialize)]
struct AccountInfoJson {
    lamports: u64,
    data: (String, String), // (data, encoding)
    owner: String,
    executable: bool,
    space: Option<u64>,
}

impl AccountInfoJson {
    fn decode(self) -> Result<FetchedAccount, RegistryError> {
        let (payload, encoding) = self.data;
        if encoding != "base64" {
            return Err(RegistryError::MalformedResponse {
                context: "account data".to_string(),
                reason: "unsupported data encoding",
            });
        }
        let data = BASE64
            .decode(payload)
            .map_err(|_| RegistryError::MalformedResponse {
                context: "account data".to_string(),
                reason: "invalid base64 payload",
            })?;
        let space = self.space.unwrap_or(data.len() as u64);
        Ok(FetchedAccount {
            lamports: self.lamports,
            data,
            owner: self.owner,
            executable: self.executable,
            space,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProgramAccountJson {
    pubkey: String,
    account: AccountInfoJson,
}

/// Minimal async RPC client for the node endpoints this crate uses.
pub struct RpcClient {
    endpoint_url: String,
    http: reqwest::Client,
}

impl RpcClient {
    /// Create a client from explicit configuration.
    pub fn new(config: RpcConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            endpoint_url: config.endpoint_url,
            http,
        })
    }

    /// Make a JSON-RPC call.
    async fn call<T>(&self, method: &str, params: Value) -> Result<T, RegistryError>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!(method, %params, "rpc call");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: RpcResponse<T> = self
            .http
            .post(&self.endpoint_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(RegistryError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response.result.ok_or(RegistryError::MalformedResponse {
            context: method.to_string(),
            reason: "no result in rpc response",
        })
    }

    /// Fetch one account. `Ok(None)` when the account does not exist.
    pub async fn get_account(
        &self,
        address: &Pubkey,
    ) -> Result<Option<FetchedAccount>, RegistryError> {
        let params = json!([
            address.to_string(),
            { "encoding": "base64", "commitment": "confirmed" }
        ]);
        let response: Value = self.call("getAccountInfo", params).await?;
        if response["value"].is_null() {
            return Ok(None);
        }
        let info: AccountInfoJson = serde_json::from_value(response["value"].clone())?;
        Ok(Some(info.decode()?))
    }

    /// Fetch every account owned by `program_id`, optionally filtered on a
    /// leading discriminator via `memcmp`.
    pub async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: Option<&[u8; 8]>,
    ) -> Result<Vec<(Pubkey, FetchedAccount)>, RegistryError> {
        let mut config = json!({ "encoding": "base64", "commitment": "confirmed" });
        if let Some(discriminator) = discriminator {
            config["filters"] = json!([{
                "memcmp": {
                    "offset": 0,
                    "bytes": BASE64.encode(discriminator),
                    "encoding": "base64",
                }
            }]);
        }
        let params = json!([program_id.to_string(), config]);
        let response: Vec<ProgramAccountJson> = self.call("getProgramAccounts", params).await?;

        let mut accounts = Vec::with_capacity(response.len());
        for entry in response {
            let pubkey = parse_address(&entry.pubkey)?;
            accounts.push((pubkey, entry.account.decode()?));
        }
        Ok(accounts)
    }

    /// Get the latest blockhash for transaction assembly.
    pub async fn get_latest_blockhash(&self) -> Result<Hash, RegistryError> {
        let response: Value = self
            .call("getLatestBlockhash", json!([{ "commitment": "confirmed" }]))
            .await?;
        let blockhash = response["value"]["blockhash"].as_str().ok_or_else(|| {
            RegistryError::MalformedResponse {
                context: "getLatestBlockhash".to_string(),
                reason: "missing blockhash in response",
            }
        })?;
        Hash::from_str(blockhash).map_err(|_| RegistryError::MalformedResponse {
            context: "getLatestBlockhash".to_string(),
            reason: "unparsable blockhash",
        })
    }

    /// Submit a signed transaction, returning its signature.
    pub async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, RegistryError> {
        let encoded = BASE64.encode(bincode::serialize(transaction)?);
        let params = json!([
            encoded,
            { "encoding": "base64", "preflightCommitment": "confirmed" }
        ]);
        let signature: String = self.call("sendTransaction", params).await?;
        Signature::from_str(&signature).map_err(|_| RegistryError::MalformedResponse {
            context: "sendTransaction".to_string(),
            reason: "unparsable signature",
        })
    }
}

/// Parse a stored base58 address string.
pub fn parse_address(value: &str) -> Result<Pubkey, RegistryError> {
    Pubkey::from_str(value).map_err(|source| RegistryError::InvalidAddress {
        value: value.to_string(),
        source,
    })
}

/// Submission collaborator: accepts instructions, returns the transaction
/// signature on success. Treated as a black box by the flows built on top.
#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// Sign and submit `instructions` as one transaction.
    async fn send_instructions(
        &self,
        instructions: &[Instruction],
    ) -> Result<Signature, RegistryError>;
}

/// Production sender: signs with a local keypair and submits over RPC.
pub struct RpcTransactionSender {
    rpc: RpcClient,
    payer: Keypair,
}

impl RpcTransactionSender {
    /// Build a sender around an RPC client and the fee-paying signer.
    pub fn new(rpc: RpcClient, payer: Keypair) -> Self {
        Self { rpc, payer }
    }

    /// Address of the signing wallet.
    pub fn wallet(&self) -> Pubkey {
        self.payer.pubkey()
    }
}

#[async_trait]
impl TransactionSender for RpcTransactionSender {
    async fn send_instructions(
        &self,
        instructions: &[Instruction],
    ) -> Result<Signature, RegistryError> {
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        );
        self.rpc.send_transaction(&transaction).await
    }
}
