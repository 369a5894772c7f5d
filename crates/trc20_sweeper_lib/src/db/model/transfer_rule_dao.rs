use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RULE_STATUS_ENABLED: &str = "ENABLED";
pub const RULE_STATUS_DISABLED: &str = "DISABLED";

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransferRuleDao {
    pub id: i64,
    /// Signing key for the source address. Stays inside the service:
    /// never serialized to API responses and never logged.
    #[serde(skip_serializing)]
    pub private_key: String,
    pub from_addr: String,
    pub to_addr: String,
    pub network: String,
    pub to_network: String,
    pub min_amount: String,
    pub token_contract: Option<String>,
    pub status: String,
    /// In-flight marker: while set and in the future, no other tick may
    /// evaluate this rule
    pub lease_till: Option<DateTime<Utc>>,
    /// The time when the record is inserted into the database
    /// It is override when inserting new entry to db
    pub created_date: DateTime<Utc>,
}
