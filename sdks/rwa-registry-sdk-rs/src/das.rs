//! Token metadata enrichment over a DAS-style indexing API
//!
//! One `getAsset` lookup per registry record, keyed by mint, fanned out with
//! bounded concurrency. Lookups go through the [`AssetIndex`] seam so the
//! enricher can be driven against fakes in tests.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::account::AssetRegistryUi;
use crate::error::RegistryError;
use crate::rpc::RpcResponse;

/// Default DAS endpoint; the real URL carries an API key as a query param.
pub const DEFAULT_DAS_ENDPOINT: &str = "https://devnet.helius-rpc.com";

/// Configuration for [`DasClient`] and the enricher built on it.
#[derive(Debug, Clone)]
pub struct DasConfig {
    /// Indexing API endpoint URL, API key included
    pub endpoint_url: String,
    /// Per-request timeout applied to every lookup
    pub request_timeout: Duration,
    /// Upper bound on in-flight lookups during batch enrichment
    pub max_concurrency: usize,
}

impl Default for DasConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_DAS_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(30),
            max_concurrency: 8,
        }
    }
}

/// `getAsset` result, reduced to the fields this client consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DasAsset {
    /// Off-chain content block
    pub content: Option<DasContent>,
    /// Token-level facts
    pub token_info: Option<DasTokenInfo>,
}

/// Content block of a DAS asset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DasContent {
    /// Display metadata
    pub metadata: Option<DasMetadata>,
}

/// Display metadata of a DAS asset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DasMetadata {
    /// Ticker symbol
    #[serde(default)]
    pub symbol: String,
    /// Display name
    #[serde(default)]
    pub name: String,
}

/// Token facts of a DAS asset.
#[derive(Debug, Clone, Deserialize)]
pub struct DasTokenInfo {
    /// Decimal precision of the mint
    pub decimals: u8,
    /// Raw supply, unscaled
    pub supply: u64,
    /// Current mint authority, if any
    pub mint_authority: Option<String>,
}

/// Registry record joined with externally-fetched token facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadataUi {
    /// Mint address, base58
    pub mint: String,
    /// Ticker symbol
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Decimal precision of the mint
    pub decimals: u8,
    /// Human-scaled supply: `raw_supply / 10^decimals`
    pub supply: f64,
    /// Current mint authority, if any
    pub authority: Option<String>,
    /// Owning program address, copied from the source registry record
    pub program_id: String,
}

/// Lookup collaborator resolving a mint to its indexed asset facts.
#[async_trait]
pub trait AssetIndex: Send + Sync {
    /// Resolve one mint. Implementations perform no caching and no retries.
    async fn get_asset(&self, mint: &str) -> Result<DasAsset, RegistryError>;
}

#[async_trait]
impl<T: AssetIndex + ?Sized> AssetIndex for &T {
    async fn get_asset(&self, mint: &str) -> Result<DasAsset, RegistryError> {
        (**self).get_asset(mint).await
    }
}

/// HTTP client for a DAS-style `getAsset` endpoint.
pub struct DasClient {
    endpoint_url: String,
    http: reqwest::Client,
}

impl DasClient {
    /// Create a client from explicit configuration.
    pub fn new(config: &DasConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            endpoint_url: config.endpoint_url.clone(),
            http,
        })
    }
}

#[async_trait]
impl AssetIndex for DasClient {
    async fn get_asset(&self, mint: &str) -> Result<DasAsset, RegistryError> {
        debug!(mint, "das getAsset");
        let body = json!({
            "jsonrpc": "2.0",
            "id": "rwa-registry-sdk",
            "method": "getAsset",
            "params": { "id": mint },
        });

        let response: RpcResponse<DasAsset> = self
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
            context: mint.to_string(),
            reason: "no result in getAsset response",
        })
    }
}

/// Joins registry records with token facts from an [`AssetIndex`].
pub struct TokenMetadataEnricher<I> {
    index: I,
    max_concurrency: usize,
}

impl<I: AssetIndex> TokenMetadataEnricher<I> {
    /// Build an enricher with the given in-flight lookup bound.
    pub fn new(index: I, max_concurrency: usize) -> Self {
        Self {
            index,
            // buffered(0) would stall forever
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Enrich each record independently: one lookup per record, at most
    /// `max_concurrency` in flight, results in input order. A failed or
    /// malformed lookup occupies its own slot without touching the rest.
    pub async fn enrich_each(
        &self,
        records: &[AssetRegistryUi],
    ) -> Vec<Result<TokenMetadataUi, RegistryError>> {
        let lookups = records.iter().map(|record| async move {
            let asset = self.index.get_asset(&record.data.mint).await?;
            join_token_metadata(record, asset)
        });
        futures::stream::iter(lookups)
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    /// Strict variant: the first failing record fails the whole batch.
    pub async fn enrich(
        &self,
        records: &[AssetRegistryUi],
    ) -> Result<Vec<TokenMetadataUi>, RegistryError> {
        self.enrich_each(records).await.into_iter().collect()
    }
}

fn join_token_metadata(
    record: &AssetRegistryUi,
    asset: DasAsset,
) -> Result<TokenMetadataUi, RegistryError> {
    let mint = &record.data.mint;
    let metadata = asset
        .content
        .and_then(|content| content.metadata)
        .ok_or_else(|| RegistryError::MalformedResponse {
            context: mint.clone(),
            reason: "missing content.metadata",
        })?;
    let token_info = asset
        .token_info
        .ok_or_else(|| RegistryError::MalformedResponse {
            context: mint.clone(),
            reason: "missing token_info",
        })?;

    let supply = token_info.supply as f64 / 10f64.powi(i32::from(token_info.decimals));

    Ok(TokenMetadataUi {
        mint: mint.clone(),
        symbol: metadata.symbol,
        name: metadata.name,
        decimals: token_info.decimals,
        supply,
        authority: token_info.mint_authority,
        program_id: record.program_address.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AssetRecordUi, AssetRegistryUi};
    use crate::state::AssetType;

    fn ui_record(mint: &str) -> AssetRegistryUi {
        AssetRegistryUi {
            address: "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_string(),
            program_address: "BPFLoaderUpgradeab1e11111111111111111111111".to_string(),
            lamports: 2_039_280,
            space: 292,
            executable: false,
            exists: true,
            data: AssetRecordUi {
                id: 1,
                authority: "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T".to_string(),
                mint: mint.to_string(),
                asset_name: "Sample".to_string(),
                asset_symbol: "SMP".to_string(),
                asset_isin: "US0000000000".to_string(),
                legal_doc_uri: "https://example.com/smp.pdf".to_string(),
                creation_date: 1_700_000_000,
                asset_type: AssetType::Equity,
                bump: 255,
            },
        }
    }

    #[test]
    fn das_asset_parses_the_wire_shape() {
        let payload = r#"{
            "content": { "metadata": { "symbol": "XAUWR", "name": "Gold Warehouse Receipt" } },
            "token_info": { "decimals": 6, "supply": 1000000, "mint_authority": "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T" }
        }"#;
        let asset: DasAsset = serde_json::from_str(payload).unwrap();
        let metadata = asset.content.as_ref().unwrap().metadata.as_ref().unwrap();
        assert_eq!(metadata.symbol, "XAUWR");
        let token_info = asset.token_info.as_ref().unwrap();
        assert_eq!(token_info.decimals, 6);
        assert_eq!(token_info.supply, 1_000_000);
    }

    #[test]
    fn join_scales_supply_by_decimals() {
        let asset = DasAsset {
            content: Some(DasContent {
                metadata: Some(DasMetadata {
                    symbol: "SMP".to_string(),
                    name: "Sample".to_string(),
                }),
            }),
            token_info: Some(DasTokenInfo {
                decimals: 6,
                supply: 1_000_000,
                mint_authority: None,
            }),
        };
        let record = ui_record("So11111111111111111111111111111111111111112");
        let enriched = join_token_metadata(&record, asset).unwrap();
        assert_eq!(enriched.supply, 1.0);
        assert_eq!(enriched.decimals, 6);
        assert_eq!(enriched.program_id, record.program_address);
        assert_eq!(enriched.mint, record.data.mint);
    }

    #[test]
    fn join_flags_missing_metadata_and_token_info() {
        let record = ui_record("So11111111111111111111111111111111111111112");

        let no_metadata = DasAsset {
            content: Some(DasContent { metadata: None }),
            token_info: Some(DasTokenInfo {
                decimals: 0,
                supply: 1,
                mint_authority: None,
            }),
        };
        assert!(matches!(
            join_token_metadata(&record, no_metadata),
            Err(RegistryError::MalformedResponse {
                reason: "missing content.metadata",
                ..
            })
        ));

        let no_token_info = DasAsset {
            content: Some(DasContent {
                metadata: Some(DasMetadata::default()),
            }),
            token_info: None,
        };
        assert!(matches!(
            join_token_metadata(&record, no_token_info),
            Err(RegistryError::MalformedResponse {
                reason: "missing token_info",
                ..
            })
        ));
    }
}
