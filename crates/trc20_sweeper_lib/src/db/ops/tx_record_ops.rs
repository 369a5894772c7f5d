use super::super::model::TxRecordDao;
use crate::db::model::{TX_STATUS_COMPLETED, TX_STATUS_RECEIVED};
use crate::error::SweeperError;
use crate::error::*;
use crate::err_from;
use rust_decimal::Decimal;
use sqlx::Executor;
use sqlx::Sqlite;
use sqlx::SqlitePool;
use std::str::FromStr;

pub async fn insert_tx_record<'c, E>(
    executor: E,
    tx_record: &TxRecordDao,
) -> Result<TxRecordDao, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, TxRecordDao>(
        r"INSERT INTO tx_record
(rule_id, tx_hash, amount, fee, status, error, created_date)
VALUES ($1, $2, $3, $4, $5, $6, strftime('%Y-%m-%dT%H:%M:%f', 'now')) RETURNING *;
",
    )
    .bind(tx_record.rule_id)
    .bind(&tx_record.tx_hash)
    .bind(&tx_record.amount)
    .bind(&tx_record.fee)
    .bind(&tx_record.status)
    .bind(&tx_record.error)
    .fetch_one(executor)
    .await
}

pub async fn get_all_tx_records(
    conn: &SqlitePool,
    limit: Option<i64>,
) -> Result<Vec<TxRecordDao>, sqlx::Error> {
    let limit = limit.unwrap_or(i64::MAX);
    let rows =
        sqlx::query_as::<_, TxRecordDao>(r"SELECT * FROM tx_record ORDER by id DESC LIMIT $1")
            .bind(limit)
            .fetch_all(conn)
            .await?;
    Ok(rows)
}

pub async fn get_tx_records_by_rule(
    conn: &SqlitePool,
    rule_id: i64,
    limit: Option<i64>,
) -> Result<Vec<TxRecordDao>, sqlx::Error> {
    let limit = limit.unwrap_or(i64::MAX);
    let rows = sqlx::query_as::<_, TxRecordDao>(
        r"SELECT * FROM tx_record WHERE rule_id = $1 ORDER by id DESC LIMIT $2",
    )
    .bind(rule_id)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn get_tx_record_count(conn: &SqlitePool) -> Result<usize, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(r"SELECT COUNT(*) FROM tx_record")
        .fetch_one(conn)
        .await?;
    Ok(count as usize)
}

#[derive(Debug, Clone, Default)]
pub struct DashboardTotals {
    pub total_in: Decimal,
    pub total_out: Decimal,
}

/// Sums record amounts for the dashboard: COMPLETED counts as outbound,
/// RECEIVED as inbound. RECEIVED rows are aggregated although nothing in
/// the sweep path writes them (kept for an inbound-detection feature).
pub async fn get_dashboard_totals(conn: &SqlitePool) -> Result<DashboardTotals, SweeperError> {
    let rows = sqlx::query_as::<_, (String, String)>(r"SELECT amount, status FROM tx_record")
        .fetch_all(conn)
        .await
        .map_err(err_from!())?;

    let mut totals = DashboardTotals::default();
    for (amount, status) in rows {
        let amount = Decimal::from_str(&amount).map_err(err_from!())?;
        if status == TX_STATUS_COMPLETED {
            totals.total_out += amount;
        } else if status == TX_STATUS_RECEIVED {
            totals.total_in += amount;
        }
    }
    Ok(totals)
}
