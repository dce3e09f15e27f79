use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use swap_fact_etl::config::Config;
use swap_fact_etl::db;
use swap_fact_etl::error::Result;
use swap_fact_etl::validator;

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

    match run(cfg).await {
        Ok(all_passed) => {
            if !all_passed {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Validation error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cfg: Config) -> Result<bool> {
    info!("Running swap-fact pipeline validation");
    let pool = db::connect(&cfg.db_path).await?;

    let checks = validator::run_all(&pool, &cfg).await?;
    let passed = checks.iter().filter(|c| c.passed).count();
    let total = checks.len();

    for check in &checks {
        let status = if check.passed { "pass" } else { "FAIL" };
        info!("[VALIDATE] {:<20} {status}", check.name);
    }
    info!("Validation results: {passed}/{total} checks passed");

    if passed < total {
        warn!("Some validations failed, see the warnings above");
    }
    Ok(passed == total)
}
