//! Close-asset flow
//!
//! Builds the close instruction for a registry entry, submits it through the
//! transaction-sending collaborator, and on success invalidates the cached
//! asset listing so the next read re-fetches. Submission is atomic on the
//! chain side; the flow itself never retries.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::{info, warn};

use crate::account::AssetRegistryUi;
use crate::cache::QueryInvalidator;
use crate::error::RegistryError;
use crate::rpc::{parse_address, TransactionSender};
use crate::{CloseAssetParams, RwaRegistryClient};

/// Cache key under which asset listings are stored.
pub const ASSETS_QUERY_KEY: &str = "assets";

/// Successful close submission.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseAssetOutcome {
    /// Signature of the submitted transaction
    pub signature: Signature,
    /// Block-explorer link for the transaction
    pub explorer_url: String,
}

/// One-shot close-asset flow over the submission and cache collaborators.
pub struct CloseAssetFlow<'a> {
    client: RwaRegistryClient,
    sender: &'a dyn TransactionSender,
    cache: &'a dyn QueryInvalidator,
    cluster: String,
}

impl<'a> CloseAssetFlow<'a> {
    /// Build a flow; explorer links point at the `devnet` cluster unless
    /// overridden with [`CloseAssetFlow::with_cluster`].
    pub fn new(
        client: RwaRegistryClient,
        sender: &'a dyn TransactionSender,
        cache: &'a dyn QueryInvalidator,
    ) -> Self {
        Self {
            client,
            sender,
            cache,
            cluster: "devnet".to_string(),
        }
    }

    /// Explorer cluster label used in the outcome link.
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }

    /// Close one registry entry.
    ///
    /// Requires an active wallet session: without one this returns
    /// [`RegistryError::NotAuthenticated`] before any network traffic.
    /// Not idempotent — resubmission is a fresh transaction attempt against
    /// an account that may already be closed, so callers must not auto-retry.
    pub async fn close_asset(
        &self,
        asset: &AssetRegistryUi,
        wallet: Option<Pubkey>,
    ) -> Result<CloseAssetOutcome, RegistryError> {
        let wallet = wallet.ok_or(RegistryError::NotAuthenticated)?;
        let asset_address = parse_address(&asset.address)?;

        let instruction = self.client.close_asset_ix(CloseAssetParams {
            asset: asset_address,
            wallet,
        });

        match self.sender.send_instructions(&[instruction]).await {
            Ok(signature) => {
                self.cache.invalidate(ASSETS_QUERY_KEY);
                let explorer_url = explorer_tx_url(&signature, &self.cluster);
                info!(
                    %signature,
                    asset = %asset.data.asset_name,
                    %explorer_url,
                    "asset registry entry closed"
                );
                Ok(CloseAssetOutcome {
                    signature,
                    explorer_url,
                })
            }
            Err(error) => {
                warn!(%error, asset = %asset.data.asset_name, "close asset failed");
                Err(error)
            }
        }
    }
}

/// Block-explorer link for a transaction on the given cluster.
pub fn explorer_tx_url(signature: &Signature, cluster: &str) -> String {
    format!("https://solscan.io/tx/{signature}?cluster={cluster}")
}
