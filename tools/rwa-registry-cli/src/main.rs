use std::str::FromStr;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use rwa_registry_sdk::account::AssetRegistryReader;
use rwa_registry_sdk::cache::QueryCache;
use rwa_registry_sdk::close::{CloseAssetFlow, ASSETS_QUERY_KEY};
use rwa_registry_sdk::das::{DasClient, DasConfig, TokenMetadataEnricher, DEFAULT_DAS_ENDPOINT};
use rwa_registry_sdk::rpc::{RpcClient, RpcConfig, RpcTransactionSender};
use rwa_registry_sdk::RwaRegistryClient;

fn parse_base58(s: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(s).with_context(|| format!("invalid base58 address: {s}"))
}

#[derive(Clone, Debug)]
enum SignerSourceKind {
    Prompt,
    Stdin,
    File,
    Env,
}

#[derive(Clone, Debug, Args)]
struct SignerArg {
    /// Signer source: prompt|stdin|file:/path|env:VAR
    #[arg(long = "payer", alias = "signer", default_value = "prompt")]
    signer: String,
}

fn keypair_from_source(spec: &str) -> anyhow::Result<Keypair> {
    use std::io::Read as _;
    let (kind, rest) = if let Some(rest) = spec.strip_prefix("file:") {
        (SignerSourceKind::File, Some(rest.to_string()))
    } else if let Some(rest) = spec.strip_prefix("env:") {
        (SignerSourceKind::Env, Some(rest.to_string()))
    } else if spec == "stdin" {
        (SignerSourceKind::Stdin, None)
    } else {
        (SignerSourceKind::Prompt, None)
    };

    let secret: Vec<u8> = match kind {
        SignerSourceKind::Prompt => {
            let s = rpassword::prompt_password("enter signer keypair hex: ")?;
            hex::decode(s.trim())?
        }
        SignerSourceKind::Stdin => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            hex::decode(buf.trim())?
        }
        SignerSourceKind::File => {
            let path = rest.expect("file path");
            let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path))?;
            let s = s.trim();
            // accept both the json-array keypair format and plain hex
            if s.starts_with('[') {
                serde_json::from_str(s).with_context(|| format!("parse keypair json {}", path))?
            } else {
                hex::decode(s)?
            }
        }
        SignerSourceKind::Env => {
            let var = rest.expect("env var");
            let s = std::env::var(&var).with_context(|| format!("env {} not set", var))?;
            hex::decode(s.trim())?
        }
    };
    let kp = Keypair::from_bytes(&secret).context("not a valid 64-byte ed25519 keypair")?;
    Ok(kp)
}

#[derive(Parser, Debug)]
#[command(
    name = "rwa-registry",
    version,
    about = "RWA Asset Registry CLI",
    long_about = "Command-line interface for inspecting, enriching, and closing RWA asset registry entries.\nJSON is always printed to stdout; logs/status to stderr."
)]
struct Cli {
    /// RPC endpoint URL
    #[arg(
        default_value = "https://api.devnet.solana.com",
        env = "SOLANA_RPC",
        global = true,
        long
    )]
    rpc: String,

    /// Registry program id (base58). Required for every on-chain operation
    #[arg(env = "RWA_REGISTRY_PROGRAM_ID", global = true, long)]
    program_id: Option<String>,

    /// Indexing API endpoint URL, API key included (overrides the default)
    #[arg(env = "DAS_URL", global = true, long)]
    das_url: Option<String>,

    /// API key appended to the default indexing endpoint
    #[arg(env = "HELIUS_API_KEY", global = true, long)]
    api_key: Option<String>,

    /// Explorer cluster label used in transaction links
    #[arg(default_value = "devnet", global = true, long)]
    cluster: String,

    /// Request timeout in seconds for RPC and indexing calls
    #[arg(default_value_t = 30, global = true, long)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(subcommand, alias = "a", about = "Asset registry operations (list, show)")]
    Assets(AssetsCmd),

    /// Join registry entries with token metadata from the indexing API
    #[command(alias = "t", about = "List registry entries joined with indexed token metadata")]
    Tokens {
        /// Keep going when individual lookups fail (failed rows are logged and skipped)
        #[arg(long, default_value_t = false)]
        keep_going: bool,

        /// Upper bound on in-flight lookups
        #[arg(long, default_value_t = 8)]
        max_concurrency: usize,
    },

    /// Close a registry entry and reclaim its rent
    #[command(about = "Close a registry entry; the signer must be its authority")]
    Close {
        /// Registry entry account address (base58)
        #[arg(long)]
        asset: String,

        /// Wallet signer source
        #[command(flatten)]
        payer: SignerArg,
    },
}

#[derive(Subcommand, Debug)]
enum AssetsCmd {
    /// List every registry entry owned by the program
    #[command(alias = "ls", about = "List every registry entry owned by the program")]
    List {
        /// Print raw envelopes instead of normalized records
        #[arg(long, default_value_t = false)]
        raw: bool,
    },

    /// Show one registry entry
    #[command(alias = "get", about = "Show one registry entry")]
    Show {
        /// Registry entry account address (base58)
        #[arg(long)]
        address: String,
    },
}

impl Cli {
    fn program_id(&self) -> anyhow::Result<Pubkey> {
        let raw = self
            .program_id
            .as_ref()
            .context("--program-id or RWA_REGISTRY_PROGRAM_ID required")?;
        parse_base58(raw)
    }

    fn rpc_client(&self) -> anyhow::Result<RpcClient> {
        Ok(RpcClient::new(RpcConfig {
            endpoint_url: self.rpc.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
        })?)
    }

    fn das_config(&self) -> anyhow::Result<DasConfig> {
        let endpoint_url = match (&self.das_url, &self.api_key) {
            (Some(url), _) => url.clone(),
            (None, Some(key)) => format!("{DEFAULT_DAS_ENDPOINT}/?api-key={key}"),
            (None, None) => anyhow::bail!("--das-url or HELIUS_API_KEY required"),
        };
        Ok(DasConfig {
            endpoint_url,
            request_timeout: Duration::from_secs(self.timeout_secs),
            ..DasConfig::default()
        })
    }

    fn reader(&self) -> anyhow::Result<AssetRegistryReader> {
        Ok(AssetRegistryReader::new(self.program_id()?, self.rpc_client()?))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match &args.command {
        Commands::Assets(AssetsCmd::List { raw }) => {
            let reader = args.reader()?;
            let envelopes = reader.fetch_all_assets().await?;
            if *raw {
                println!("{}", serde_json::to_string_pretty(&envelopes)?);
            } else {
                let records = envelopes
                    .iter()
                    .map(|envelope| envelope.normalize())
                    .collect::<Result<Vec<_>, _>>()?;
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
        }

        Commands::Assets(AssetsCmd::Show { address }) => {
            let reader = args.reader()?;
            let envelope = reader.fetch_asset(&parse_base58(address)?).await?;
            println!("{}", serde_json::to_string_pretty(&envelope.normalize()?)?);
        }

        Commands::Tokens {
            keep_going,
            max_concurrency,
        } => {
            let reader = args.reader()?;
            let records = reader
                .fetch_all_assets()
                .await?
                .iter()
                .map(|envelope| envelope.normalize())
                .collect::<Result<Vec<_>, _>>()?;

            let mut config = args.das_config()?;
            config.max_concurrency = *max_concurrency;
            let das = DasClient::new(&config)?;
            let enricher = TokenMetadataEnricher::new(das, config.max_concurrency);

            if *keep_going {
                let mut rows = Vec::new();
                for (record, result) in records.iter().zip(enricher.enrich_each(&records).await) {
                    match result {
                        Ok(row) => rows.push(row),
                        Err(error) => {
                            tracing::warn!(mint = %record.data.mint, %error, "lookup skipped")
                        }
                    }
                }
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                let rows = enricher.enrich(&records).await?;
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
        }

        Commands::Close { asset, payer } => {
            let reader = args.reader()?;
            let record = reader.fetch_asset(&parse_base58(asset)?).await?.normalize()?;

            let payer_kp = keypair_from_source(&payer.signer)?;
            let wallet = payer_kp.pubkey();
            let sender = RpcTransactionSender::new(args.rpc_client()?, payer_kp);
            let cache: QueryCache<Vec<rwa_registry_sdk::account::AssetRegistryUi>> =
                QueryCache::new();
            cache.put(ASSETS_QUERY_KEY, vec![record.clone()]);

            let flow = CloseAssetFlow::new(RwaRegistryClient::new(args.program_id()?), &sender, &cache)
                .with_cluster(args.cluster.clone());

            match flow.close_asset(&record, Some(wallet)).await {
                Ok(outcome) => {
                    eprintln!(
                        "Transaction successful: asset {} has been closed.",
                        record.data.asset_name
                    );
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "signature": outcome.signature.to_string(),
                            "explorer_url": outcome.explorer_url,
                            "asset": record.address,
                            "asset_name": record.data.asset_name,
                        }))?
                    );
                }
                Err(error) => {
                    tracing::warn!(%error, "transaction failed");
                    anyhow::bail!("transaction failed: {error}");
                }
            }
        }
    }

    Ok(())
}
