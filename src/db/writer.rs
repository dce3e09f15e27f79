use tracing::info;

use crate::error::Result;
use crate::types::{EnrichedFact, RawSwap};

/// Persists each run's raw swap snapshot and fact set. Both tables are
/// replaced wholesale: facts are produced fresh every run, never mutated
/// incrementally.
pub struct FactStore {
    pool: sqlx::SqlitePool,
}

impl FactStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn replace_raw_swaps(&self, swaps: &[RawSwap]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM raw_swaps").execute(&mut *tx).await?;
        for swap in swaps {
            sqlx::query(
                r#"
                INSERT INTO raw_swaps (
                    block_time, tx_hash, log_index, pool_address,
                    token0, token1, amount0, amount1, sender
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&swap.block_time)
            .bind(&swap.tx_hash)
            .bind(swap.log_index)
            .bind(&swap.pool_address)
            .bind(&swap.token0)
            .bind(&swap.token1)
            .bind(&swap.amount0)
            .bind(&swap.amount1)
            .bind(&swap.sender)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        info!("Persisted {} raw swaps to DB", swaps.len());
        Ok(())
    }

    pub async fn replace_facts(&self, facts: &[EnrichedFact]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM swap_facts").execute(&mut *tx).await?;
        for fact in facts {
            sqlx::query(
                r#"
                INSERT INTO swap_facts (
                    block_time, tx_hash, log_index, pool_address,
                    token0, token1, amount0, amount1,
                    price0_usd, price1_usd, trader, is_contract,
                    flow_source, hop_index, gas_used
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&fact.block_time)
            .bind(&fact.tx_hash)
            .bind(fact.log_index)
            .bind(&fact.pool_address)
            .bind(&fact.token0)
            .bind(&fact.token1)
            .bind(&fact.amount0)
            .bind(&fact.amount1)
            .bind(fact.price0_usd)
            .bind(fact.price1_usd)
            .bind(&fact.trader)
            .bind(fact.is_contract)
            .bind(&fact.flow_source)
            .bind(fact.hop_index)
            .bind(fact.gas_used as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        info!("Persisted {} swap facts to DB", facts.len());
        Ok(())
    }
}
