//! RWA Asset Registry – Rust SDK (client-side helpers)
//!
//! This crate provides:
//! - Typed access to the registry program's account layout and readers that
//!   wrap fetched accounts as raw envelopes
//! - A pure normalizer turning raw envelopes into bounded, render-ready
//!   records
//! - Instruction builders with correct account ordering for the registry
//!   program's operations, plus the close-asset submission flow
//! - Token-metadata enrichment against a DAS-style indexing API with bounded
//!   fan-out and per-item error capture
//!
//! Signers, endpoints, and caches are supplied by the caller; collaborator
//! seams ([`rpc::TransactionSender`], [`das::AssetIndex`],
//! [`cache::QueryInvalidator`]) keep every flow testable without a network.

pub mod account;
pub mod cache;
pub mod close;
pub mod das;
pub mod error;
pub mod instruction;
pub mod rpc;
pub mod state;

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::instruction::RegistryInstruction;

/// Thin client for building instructions against the asset registry program.
///
/// The `program_id` must be the deployed registry program id.
pub struct RwaRegistryClient {
    /// Deployed registry program id
    pub program_id: Pubkey,
}

impl RwaRegistryClient {
    /// Build a client for the registry program deployed at `program_id`.
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Build a CloseAsset instruction.
    ///
    /// Accounts (strict order):
    /// - asset (writable)
    /// - wallet (writable, signer)
    pub fn close_asset_ix(&self, params: CloseAssetParams) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(params.asset, false),
                AccountMeta::new(params.wallet, true),
            ],
            data: RegistryInstruction::CloseAsset.pack(),
        }
    }

    /// Convenience wrapper returning a one-instruction Vec for close_asset.
    pub fn close_asset_tx(&self, params: CloseAssetParams) -> Vec<Instruction> {
        vec![self.close_asset_ix(params)]
    }
}

// === Params ===
/// Parameters for the CloseAsset instruction.
pub struct CloseAssetParams {
    /// Registry entry account being closed
    pub asset: Pubkey,
    /// Wallet that owns the entry; signs and receives the reclaimed rent
    pub wallet: Pubkey,
}
