use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use swap_fact_etl::config::Config;
use swap_fact_etl::db;
use swap_fact_etl::db::writer::FactStore;
use swap_fact_etl::enrich::{self, gas::distinct_tx_hashes};
use swap_fact_etl::error::Result;
use swap_fact_etl::export::export_csv;
use swap_fact_etl::lookups::{gas::build_gas_map, labels, price::PriceTable};
use swap_fact_etl::source::fetch_raw_swaps;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!("Starting swap-fact ETL run");

    // --- Database setup ---
    let pool = db::connect(&cfg.db_path).await?;
    let store = FactStore::new(pool.clone());

    // --- Raw swap source (fatal on failure, empty result is a valid outcome) ---
    let (swaps, source_stats) = fetch_raw_swaps(&cfg).await?;
    info!(
        "Fetched {} raw swaps across {} pools ({} API rows)",
        swaps.len(),
        cfg.pool_addresses.len(),
        source_stats.api_total,
    );
    if swaps.is_empty() {
        info!("No swap data found, nothing to enrich");
        return Ok(());
    }
    store.replace_raw_swaps(&swaps).await?;

    // --- Lookup snapshots (each degrades to its defaults, never aborts) ---
    if cfg.rpc_url.is_none() {
        warn!("No RPC configured: gas enrichment and contract marking will use defaults");
    }

    let tx_hashes = distinct_tx_hashes(swaps.iter().map(|s| s.tx_hash.as_str()));
    let gas_map = build_gas_map(&pool, cfg.rpc_url.as_deref(), &tx_hashes).await?;

    let prices = PriceTable::load(&cfg.prices_path);

    let mut label_map = labels::load_labels(&cfg.labels_path);
    labels::persist_labels(&pool, &label_map).await?;
    let senders: Vec<String> = swaps.iter().map(|s| s.sender.clone()).collect();
    labels::mark_contracts(&pool, cfg.rpc_url.as_deref(), &senders, &mut label_map).await?;

    // --- Enrichment (the pure core) ---
    let (facts, stats) = enrich::enrich(&swaps, &gas_map, &prices, &label_map);
    enrich::log_stats(&stats);

    // --- Fact sink: sqlite table + dated CSV (both fatal on write failure) ---
    store.replace_facts(&facts).await?;
    let csv_path = export_csv(&facts, &cfg.export_dir)?;

    info!("ETL run complete: {} facts exported to {}", facts.len(), csv_path.display());
    Ok(())
}
