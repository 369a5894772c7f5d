use super::super::model::TransferRuleDao;
use crate::db::model::RULE_STATUS_ENABLED;
use chrono::{DateTime, Utc};
use sqlx::Executor;
use sqlx::Sqlite;
use sqlx::SqlitePool;

pub async fn insert_transfer_rule<'c, E>(
    executor: E,
    rule: &TransferRuleDao,
) -> Result<TransferRuleDao, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, TransferRuleDao>(
        r"INSERT INTO transfer_rule
(private_key, from_addr, to_addr, network, to_network, min_amount, token_contract, status, lease_till, created_date)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, strftime('%Y-%m-%dT%H:%M:%f', 'now')) RETURNING *;
",
    )
    .bind(&rule.private_key)
    .bind(&rule.from_addr)
    .bind(&rule.to_addr)
    .bind(&rule.network)
    .bind(&rule.to_network)
    .bind(&rule.min_amount)
    .bind(&rule.token_contract)
    .bind(&rule.status)
    .fetch_one(executor)
    .await
}

pub async fn get_all_transfer_rules(
    conn: &SqlitePool,
) -> Result<Vec<TransferRuleDao>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransferRuleDao>(
        r"SELECT * FROM transfer_rule ORDER by created_date DESC, id DESC",
    )
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn get_enabled_transfer_rules(
    conn: &SqlitePool,
) -> Result<Vec<TransferRuleDao>, sqlx::Error> {
    let rows =
        sqlx::query_as::<_, TransferRuleDao>(r"SELECT * FROM transfer_rule WHERE status = $1")
            .bind(RULE_STATUS_ENABLED)
            .fetch_all(conn)
            .await?;
    Ok(rows)
}

pub async fn get_transfer_rule<'c, E>(
    executor: E,
    rule_id: i64,
) -> Result<Option<TransferRuleDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, TransferRuleDao>(r"SELECT * FROM transfer_rule WHERE id = $1")
        .bind(rule_id)
        .fetch_optional(executor)
        .await
}

pub async fn delete_transfer_rule<'c, E>(executor: E, rule_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query(r"DELETE FROM transfer_rule WHERE id = $1")
        .bind(rule_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Claim the rule for one evaluation. Succeeds only when no other
/// evaluation holds an unexpired lease, in one conditional UPDATE so two
/// overlapping ticks cannot both claim the same rule.
pub async fn acquire_rule_lease<'c, E>(
    executor: E,
    rule_id: i64,
    now: DateTime<Utc>,
    lease_till: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query(
        r"UPDATE transfer_rule SET
            lease_till = $2
            WHERE id = $1 AND (lease_till IS NULL OR lease_till <= $3)
        ",
    )
    .bind(rule_id)
    .bind(lease_till)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn release_rule_lease<'c, E>(executor: E, rule_id: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let _res = sqlx::query(
        r"UPDATE transfer_rule SET
            lease_till = NULL
            WHERE id = $1
        ",
    )
    .bind(rule_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_transfer_rule_count(conn: &SqlitePool) -> Result<usize, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(r"SELECT COUNT(*) FROM transfer_rule")
        .fetch_one(conn)
        .await?;
    Ok(count as usize)
}
