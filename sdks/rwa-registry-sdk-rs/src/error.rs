//! Error types

use solana_sdk::pubkey::ParsePubkeyError;
use thiserror::Error;

/// Errors that may be returned by the registry client.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No wallet session is active
    #[error("no wallet connected")]
    NotAuthenticated,
    /// A wide numeric field does not fit the bounded UI representation
    #[error("field `{field}` is outside the representable range")]
    NumericRange {
        /// Name of the offending field
        field: &'static str,
    },
    /// Account data does not begin with the asset registry discriminator
    #[error("account data does not carry the asset registry discriminator")]
    InvalidDiscriminator,
    /// Instruction data does not match any known registry instruction
    #[error("invalid instruction data")]
    InvalidInstructionData,
    /// Account is missing on chain
    #[error("account {0} not found")]
    AccountNotFound(String),
    /// A stored address string failed to parse
    #[error("invalid address `{value}`")]
    InvalidAddress {
        /// The offending address string
        value: String,
        /// Parse failure reported by the address type
        #[source]
        source: ParsePubkeyError,
    },
    /// A collaborator returned a response missing required fields
    #[error("malformed response for {context}: {reason}")]
    MalformedResponse {
        /// What was being looked up (mint, RPC method, ...)
        context: String,
        /// Which part of the shape was missing or wrong
        reason: &'static str,
    },
    /// JSON-RPC level error returned by an endpoint
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },
    /// Transport-level HTTP failure
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Payload could not be serialized or deserialized as JSON
    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
    /// Account bytes are not a valid borsh encoding of the expected layout
    #[error("invalid account data: {0}")]
    AccountData(#[from] std::io::Error),
    /// Transaction could not be encoded for submission
    #[error("transaction encoding failed: {0}")]
    TransactionEncode(#[from] bincode::Error),
}
