use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use rwa_registry_sdk::account::{AssetRecordUi, AssetRegistryUi};
use rwa_registry_sdk::das::{
    AssetIndex, DasAsset, DasContent, DasMetadata, DasTokenInfo, TokenMetadataEnricher,
};
use rwa_registry_sdk::error::RegistryError;
use rwa_registry_sdk::state::AssetType;

/// In-memory index: per-mint assets, call accounting, optional per-call delay
/// so concurrency and ordering behavior can be observed.
struct FakeIndex {
    assets: HashMap<String, DasAsset>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl FakeIndex {
    fn new(assets: HashMap<String, DasAsset>) -> Self {
        Self {
            assets,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetIndex for FakeIndex {
    async fn get_asset(&self, mint: &str) -> Result<DasAsset, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.assets
            .get(mint)
            .cloned()
            .ok_or_else(|| RegistryError::Rpc {
                code: -32000,
                message: format!("asset not found: {mint}"),
            })
    }
}

fn das_asset(symbol: &str, name: &str, decimals: u8, supply: u64) -> DasAsset {
    DasAsset {
        content: Some(DasContent {
            metadata: Some(DasMetadata {
                symbol: symbol.to_string(),
                name: name.to_string(),
            }),
        }),
        token_info: Some(DasTokenInfo {
            decimals,
            supply,
            mint_authority: Some("4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T".to_string()),
        }),
    }
}

fn ui_record(id: u64, mint: &str) -> AssetRegistryUi {
    AssetRegistryUi {
        address: format!("asset-{id}"),
        program_address: "BPFLoaderUpgradeab1e11111111111111111111111".to_string(),
        lamports: 2_039_280,
        space: 292,
        executable: false,
        exists: true,
        data: AssetRecordUi {
            id,
            authority: "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T".to_string(),
            mint: mint.to_string(),
            asset_name: format!("Asset {id}"),
            asset_symbol: format!("AST{id}"),
            asset_isin: "US0000000000".to_string(),
            legal_doc_uri: "https://example.com/doc.pdf".to_string(),
            creation_date: 1_700_000_000,
            asset_type: AssetType::Equity,
            bump: 255,
        },
    }
}

#[tokio::test]
async fn empty_batch_makes_no_calls() {
    let index = FakeIndex::new(HashMap::new());
    let enricher = TokenMetadataEnricher::new(&index, 4);

    assert!(enricher.enrich_each(&[]).await.is_empty());
    assert_eq!(enricher.enrich(&[]).await.unwrap(), vec![]);
    assert_eq!(index.calls(), 0);
}

#[tokio::test]
async fn enriches_in_input_order_with_one_call_per_record() {
    let mut assets = HashMap::new();
    assets.insert(
        "mint-a".to_string(),
        das_asset("XAUWR", "Gold Warehouse Receipt", 6, 1_000_000),
    );
    assets.insert(
        "mint-b".to_string(),
        das_asset("TNOTE", "Treasury Note", 9, 5_000_000_000),
    );
    let index = FakeIndex::new(assets).with_delay(Duration::from_millis(5));
    let enricher = TokenMetadataEnricher::new(&index, 8);

    let records = [ui_record(1, "mint-a"), ui_record(2, "mint-b")];
    let enriched = enricher.enrich(&records).await.unwrap();

    assert_eq!(index.calls(), 2);
    assert_eq!(enriched.len(), 2);

    assert_eq!(enriched[0].mint, "mint-a");
    assert_eq!(enriched[0].symbol, "XAUWR");
    assert_eq!(enriched[0].name, "Gold Warehouse Receipt");
    assert_eq!(enriched[0].decimals, 6);
    assert_eq!(enriched[0].supply, 1.0);
    assert_eq!(enriched[0].program_id, records[0].program_address);

    assert_eq!(enriched[1].mint, "mint-b");
    assert_eq!(enriched[1].supply, 5.0);
}

#[tokio::test]
async fn one_bad_mint_fails_the_strict_batch_but_not_its_neighbors() {
    let mut assets = HashMap::new();
    assets.insert("mint-a".to_string(), das_asset("A", "A", 0, 10));
    assets.insert("mint-c".to_string(), das_asset("C", "C", 0, 30));
    let index = FakeIndex::new(assets);
    let enricher = TokenMetadataEnricher::new(&index, 4);

    let records = [
        ui_record(1, "mint-a"),
        ui_record(2, "mint-missing"),
        ui_record(3, "mint-c"),
    ];

    // documented whole-batch failure mode of the strict variant
    assert!(enricher.enrich(&records).await.is_err());

    let each = enricher.enrich_each(&records).await;
    assert_eq!(each.len(), 3);
    assert_eq!(each[0].as_ref().unwrap().symbol, "A");
    assert!(matches!(each[1], Err(RegistryError::Rpc { .. })));
    assert_eq!(each[2].as_ref().unwrap().symbol, "C");
}

#[tokio::test]
async fn malformed_responses_are_isolated_per_item() {
    let mut assets = HashMap::new();
    assets.insert("mint-a".to_string(), das_asset("A", "A", 2, 100));
    assets.insert(
        "mint-b".to_string(),
        DasAsset {
            content: None,
            token_info: None,
        },
    );
    let index = FakeIndex::new(assets);
    let enricher = TokenMetadataEnricher::new(&index, 4);

    let records = [ui_record(1, "mint-a"), ui_record(2, "mint-b")];
    let each = enricher.enrich_each(&records).await;

    assert_eq!(each[0].as_ref().unwrap().supply, 1.0);
    assert!(matches!(
        each[1],
        Err(RegistryError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn fan_out_never_exceeds_the_configured_bound() {
    let mut assets = HashMap::new();
    for i in 0..8 {
        assets.insert(format!("mint-{i}"), das_asset("S", "N", 0, 1));
    }
    let index = FakeIndex::new(assets).with_delay(Duration::from_millis(20));
    let enricher = TokenMetadataEnricher::new(&index, 2);

    let records: Vec<_> = (0..8)
        .map(|i| ui_record(i, &format!("mint-{i}")))
        .collect();
    let enriched = enricher.enrich(&records).await.unwrap();

    assert_eq!(enriched.len(), 8);
    assert_eq!(index.calls(), 8);
    assert!(
        index.max_in_flight() <= 2,
        "lookups in flight exceeded the bound: {}",
        index.max_in_flight()
    );
}
