use crate::client::TronClient;
use crate::db::model::{TransferRuleDao, TxRecordDao, TX_STATUS_COMPLETED};
use crate::db::ops::insert_tx_record;
use crate::error::*;
use crate::setup::SweeperSetup;
use crate::tron::TronAddress;
use crate::utils::U256SunExt;
use crate::{err_create, err_custom_create, err_from};
use rust_decimal::Decimal;
use secp256k1::SecretKey;
use sqlx::SqlitePool;
use std::str::FromStr;

/// Evaluate one transfer rule against the current on-chain state.
///
/// When the token balance at the rule's source address reaches the
/// configured minimum, the *entire* observed balance is swept to the
/// destination (not just the minimum) and a COMPLETED record is written.
/// Below the minimum nothing happens and nothing is recorded. Every error
/// on the way out of here is turned into a FAILED record by the caller.
pub async fn process_single_rule(
    conn: &SqlitePool,
    client: &impl TronClient,
    setup: &SweeperSetup,
    rule: &TransferRuleDao,
) -> Result<Option<TxRecordDao>, SweeperError> {
    let endpoint = setup.get_endpoint(&rule.network)?;

    let contract = match &rule.token_contract {
        Some(contract) => TronAddress::from_str(contract).map_err(err_from!())?,
        None => setup.default_token_contract,
    };
    let from_addr = TronAddress::from_str(&rule.from_addr).map_err(err_from!())?;

    let balance = client
        .token_balance(endpoint, contract, from_addr)
        .await
        .map_err(err_from!())?;
    let token_balance = balance.from_sun().map_err(err_from!())?;
    let min_amount = Decimal::from_str(&rule.min_amount).map_err(err_from!())?;

    if token_balance < min_amount {
        log::debug!(
            "Rule {}: balance {} {} below minimum {}, nothing to do",
            rule.id,
            token_balance,
            setup.token_symbol,
            min_amount
        );
        return Ok(None);
    }

    let trx_balance = client
        .trx_balance(endpoint, from_addr)
        .await
        .map_err(err_from!())?;
    if trx_balance < setup.gas_reserve_sun {
        return Err(err_create!(TransactionFailedError::new(&format!(
            "Insufficient TRX for gas fee: {} sun available, {} sun reserve required",
            trx_balance, setup.gas_reserve_sun
        ))));
    }

    let to_addr = TronAddress::from_str(&rule.to_addr).map_err(err_from!())?;
    //the key never leaves this scope and parse errors do not echo it
    let secret_key = SecretKey::from_str(&rule.private_key)
        .map_err(|_| err_custom_create!("Failed to parse signing key for rule {}", rule.id))?;

    let tx_id = client
        .transfer_token(endpoint, &secret_key, contract, to_addr, balance)
        .await
        .map_err(err_from!())?;

    let amount = token_balance.normalize().to_string();
    let record = insert_tx_record(
        conn,
        &TxRecordDao {
            id: 0,
            rule_id: rule.id,
            tx_hash: tx_id,
            amount: amount.clone(),
            fee: "0".to_string(),
            status: TX_STATUS_COMPLETED.to_string(),
            error: None,
            created_date: chrono::Utc::now(),
        },
    )
    .await
    .map_err(err_from!())?;

    log::info!(
        "Sweep successful: {} -> {}, amount: {} {}",
        rule.from_addr,
        rule.to_addr,
        amount,
        setup.token_symbol
    );
    Ok(Some(record))
}
