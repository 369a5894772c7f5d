use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TX_STATUS_COMPLETED: &str = "COMPLETED";
pub const TX_STATUS_FAILED: &str = "FAILED";
/// Summed as inbound by the dashboard, but no operation writes it yet
pub const TX_STATUS_RECEIVED: &str = "RECEIVED";

/// Placeholder hash for records of evaluations that never reached the chain
pub const FAILED_TX_HASH: &str = "FAILED";

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TxRecordDao {
    pub id: i64,
    pub rule_id: i64,
    pub tx_hash: String,
    pub amount: String,
    pub fee: String,
    pub status: String,
    pub error: Option<String>,
    pub created_date: DateTime<Utc>,
}
