//! On-chain account layout for the asset registry program

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::RegistryError;

/// Anchor account discriminator: `sha256("account:AssetRegistry")[..8]`.
pub const ASSET_REGISTRY_DISCRIMINATOR: [u8; 8] = [60, 94, 213, 134, 205, 170, 175, 68];

/// One registered asset, as stored by the registry program.
///
/// The on-chain account is the 8-byte discriminator followed by the borsh
/// encoding of this struct.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct AssetRegistry {
    /// Registry-unique numeric id
    pub id: u64,
    /// Authority that created and may close the entry
    pub authority: Pubkey,
    /// Mint of the token representing the asset
    pub mint: Pubkey,
    /// Full asset name
    pub asset_name: String,
    /// Ticker symbol
    pub asset_symbol: String,
    /// ISIN code of the underlying instrument
    pub asset_isin: String,
    /// URI of the legal documentation
    pub legal_doc_uri: String,
    /// Creation time, seconds since the unix epoch
    pub creation_date: i64,
    /// Asset class code, see [`AssetType`]
    pub asset_type: u8,
    /// PDA bump for the entry account
    pub bump: u8,
}

impl AssetRegistry {
    /// Unpack an on-chain account, validating the discriminator prefix.
    pub fn unpack(data: &[u8]) -> Result<Self, RegistryError> {
        let payload = data
            .strip_prefix(&ASSET_REGISTRY_DISCRIMINATOR)
            .ok_or(RegistryError::InvalidDiscriminator)?;
        Ok(borsh::from_slice(payload)?)
    }

    /// Pack the record into account bytes, discriminator included.
    pub fn pack(&self) -> Vec<u8> {
        let mut out = ASSET_REGISTRY_DISCRIMINATOR.to_vec();
        out.extend(borsh::to_vec(self).expect("borsh encoding of owned data"));
        out
    }
}

/// Asset class of a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetType {
    /// Code 0
    Equity,
    /// Code 1
    Bond,
    /// Code 2
    Commodity,
    /// Code 3
    Etf,
    /// Any unrecognized code
    Unknown,
}

impl AssetType {
    /// Map an on-chain asset-type code to its class.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => AssetType::Equity,
            1 => AssetType::Bond,
            2 => AssetType::Commodity,
            3 => AssetType::Etf,
            _ => AssetType::Unknown,
        }
    }

    /// Human-readable label, as rendered on asset cards.
    pub fn label(&self) -> &'static str {
        match self {
            AssetType::Equity => "Equity",
            AssetType::Bond => "Bond",
            AssetType::Commodity => "Commodity",
            AssetType::Etf => "ETF",
            AssetType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
