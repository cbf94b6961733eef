//! Raw account envelopes and their UI-safe normalization
//!
//! Account-fetch collaborators report registry entries with unbounded
//! numerics and the discriminator still attached. [`RawAssetAccount::normalize`]
//! reshapes that into the bounded [`AssetRegistryUi`] record the rendering
//! layer consumes: every narrowing is checked, the discriminator is stripped,
//! and the asset-type code becomes a typed [`AssetType`].

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::RegistryError;
use crate::rpc::{FetchedAccount, RpcClient};
use crate::state::{AssetRegistry, AssetType, ASSET_REGISTRY_DISCRIMINATOR};

/// One registry account as fetched, before any bounding of its numerics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAssetAccount {
    /// Account address, base58
    pub address: String,
    /// Owning program address, base58
    pub program_address: String,
    /// Balance in lamports
    pub lamports: u128,
    /// Allocated byte size
    pub space: u128,
    /// Whether the account holds an executable program
    pub executable: bool,
    /// Whether the account exists on chain
    pub exists: bool,
    /// Decoded record payload, discriminator included
    pub data: RawAssetRecord,
}

/// Decoded registry record with its discriminator prefix and wide numerics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAssetRecord {
    /// Leading account discriminator
    pub discriminator: [u8; 8],
    /// Registry-unique numeric id
    pub id: u128,
    /// Authority address, base58
    pub authority: String,
    /// Mint address, base58
    pub mint: String,
    /// Full asset name
    pub asset_name: String,
    /// Ticker symbol
    pub asset_symbol: String,
    /// ISIN code
    pub asset_isin: String,
    /// URI of the legal documentation
    pub legal_doc_uri: String,
    /// Creation time, seconds since the unix epoch
    pub creation_date: i128,
    /// Asset class code
    pub asset_type: u8,
    /// PDA bump
    pub bump: u8,
}

/// Bounded, render-ready registry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRegistryUi {
    /// Account address, base58
    pub address: String,
    /// Owning program address, base58
    pub program_address: String,
    /// Balance in lamports
    pub lamports: u64,
    /// Allocated byte size
    pub space: u64,
    /// Whether the account holds an executable program
    pub executable: bool,
    /// Whether the account exists on chain
    pub exists: bool,
    /// Record payload, discriminator stripped
    pub data: AssetRecordUi,
}

/// Record payload of [`AssetRegistryUi`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecordUi {
    /// Registry-unique numeric id
    pub id: u64,
    /// Authority address, base58
    pub authority: String,
    /// Mint address, base58
    pub mint: String,
    /// Full asset name
    pub asset_name: String,
    /// Ticker symbol
    pub asset_symbol: String,
    /// ISIN code
    pub asset_isin: String,
    /// URI of the legal documentation
    pub legal_doc_uri: String,
    /// Creation time, seconds since the unix epoch
    pub creation_date: i64,
    /// Asset class
    pub asset_type: AssetType,
    /// PDA bump
    pub bump: u8,
}

fn narrow_u64(value: u128, field: &'static str) -> Result<u64, RegistryError> {
    u64::try_from(value).map_err(|_| RegistryError::NumericRange { field })
}

impl RawAssetAccount {
    /// Produce the bounded UI record. Pure and deterministic: same input,
    /// same output, the input is never mutated.
    ///
    /// Narrowed fields (`lamports`, `space`, `id`, `creation_date`) that do
    /// not fit their bounded type yield [`RegistryError::NumericRange`]; a
    /// negative `creation_date` is out of range as well.
    pub fn normalize(&self) -> Result<AssetRegistryUi, RegistryError> {
        let creation_date = u64::try_from(self.data.creation_date)
            .ok()
            .and_then(|secs| i64::try_from(secs).ok())
            .ok_or(RegistryError::NumericRange {
                field: "creation_date",
            })?;

        Ok(AssetRegistryUi {
            address: self.address.clone(),
            program_address: self.program_address.clone(),
            lamports: narrow_u64(self.lamports, "lamports")?,
            space: narrow_u64(self.space, "space")?,
            executable: self.executable,
            exists: self.exists,
            data: AssetRecordUi {
                id: narrow_u64(self.data.id, "id")?,
                authority: self.data.authority.clone(),
                mint: self.data.mint.clone(),
                asset_name: self.data.asset_name.clone(),
                asset_symbol: self.data.asset_symbol.clone(),
                asset_isin: self.data.asset_isin.clone(),
                legal_doc_uri: self.data.legal_doc_uri.clone(),
                creation_date,
                asset_type: AssetType::from_code(self.data.asset_type),
                bump: self.data.bump,
            },
        })
    }
}

/// Reads registry accounts from a node and wraps them as raw envelopes.
pub struct AssetRegistryReader {
    program_id: Pubkey,
    rpc: RpcClient,
}

impl AssetRegistryReader {
    /// Build a reader for the registry program deployed at `program_id`.
    pub fn new(program_id: Pubkey, rpc: RpcClient) -> Self {
        Self { program_id, rpc }
    }

    /// Fetch one registry entry by account address.
    pub async fn fetch_asset(&self, address: &Pubkey) -> Result<RawAssetAccount, RegistryError> {
        let account = self
            .rpc
            .get_account(address)
            .await?
            .ok_or_else(|| RegistryError::AccountNotFound(address.to_string()))?;
        envelope(address, account)
    }

    /// Fetch every registry entry owned by the program, filtered on the
    /// account discriminator so foreign account types never reach decoding.
    pub async fn fetch_all_assets(&self) -> Result<Vec<RawAssetAccount>, RegistryError> {
        let accounts = self
            .rpc
            .get_program_accounts(&self.program_id, Some(&ASSET_REGISTRY_DISCRIMINATOR))
            .await?;
        accounts
            .into_iter()
            .map(|(address, account)| envelope(&address, account))
            .collect()
    }
}

fn envelope(address: &Pubkey, account: FetchedAccount) -> Result<RawAssetAccount, RegistryError> {
    let record = AssetRegistry::unpack(&account.data)?;
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&account.data[..8]);

    Ok(RawAssetAccount {
        address: address.to_string(),
        program_address: account.owner,
        lamports: u128::from(account.lamports),
        space: u128::from(account.space),
        executable: account.executable,
        exists: true,
        data: RawAssetRecord {
            discriminator,
            id: u128::from(record.id),
            authority: record.authority.to_string(),
            mint: record.mint.to_string(),
            asset_name: record.asset_name,
            asset_symbol: record.asset_symbol,
            asset_isin: record.asset_isin,
            legal_doc_uri: record.legal_doc_uri,
            creation_date: i128::from(record.creation_date),
            asset_type: record.asset_type,
            bump: record.bump,
        },
    })
}
