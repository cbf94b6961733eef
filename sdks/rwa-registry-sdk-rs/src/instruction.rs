//! Instruction types

use crate::error::RegistryError;

/// Anchor instruction discriminator: `sha256("global:close_asset")[..8]`.
pub const CLOSE_ASSET_DISCRIMINATOR: [u8; 8] = [39, 124, 90, 146, 16, 82, 77, 253];

/// Instructions of the asset registry program reachable from this client.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryInstruction {
    /// Close a registry entry and reclaim its rent. Carries no arguments.
    CloseAsset,
}

impl RegistryInstruction {
    /// Pack the instruction into its wire encoding: the 8-byte method
    /// discriminator followed by the (here empty) argument block.
    pub fn pack(&self) -> Vec<u8> {
        match self {
            RegistryInstruction::CloseAsset => CLOSE_ASSET_DISCRIMINATOR.to_vec(),
        }
    }

    /// Unpack a byte array into a RegistryInstruction.
    pub fn unpack(input: &[u8]) -> Result<Self, RegistryError> {
        if input == CLOSE_ASSET_DISCRIMINATOR.as_slice() {
            Ok(RegistryInstruction::CloseAsset)
        } else {
            Err(RegistryError::InvalidInstructionData)
        }
    }
}
