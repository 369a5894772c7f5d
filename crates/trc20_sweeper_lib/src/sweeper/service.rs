use crate::client::TronClient;
use crate::db::model::{TxRecordDao, FAILED_TX_HASH, TX_STATUS_FAILED};
use crate::db::ops::*;
use crate::error::{ErrorBag, SweeperError};
use crate::err_from;
use crate::runtime::SharedState;
use crate::setup::SweeperSetup;
use crate::sweeper::process::process_single_rule;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One pass over all enabled rules. Rules are evaluated strictly in
/// sequence; a failing rule gets its FAILED record and the loop moves on,
/// so one bad rule never starves the rest of the tick.
pub async fn sweep_tick(
    shared_state: Arc<Mutex<SharedState>>,
    conn: &SqlitePool,
    client: &impl TronClient,
    setup: &SweeperSetup,
) -> Result<(), SweeperError> {
    let rules = get_enabled_transfer_rules(conn).await.map_err(err_from!())?;
    log::debug!("Sweep tick - {} enabled rules", rules.len());

    for rule in rules {
        let now = chrono::Utc::now();
        let lease_till = now + chrono::Duration::seconds(setup.lease_duration as i64);
        let acquired = acquire_rule_lease(conn, rule.id, now, lease_till)
            .await
            .map_err(err_from!())?;
        if !acquired {
            log::warn!(
                "Rule {} still leased by a previous evaluation, skipping",
                rule.id
            );
            continue;
        }
        shared_state
            .lock()
            .await
            .set_rule_message(rule.id, "Evaluating".to_string());

        match process_single_rule(conn, client, setup, &rule).await {
            Ok(_) => {
                shared_state.lock().await.delete_rule_info(rule.id);
            }
            Err(err) => {
                log::error!("Sweep failed (rule {}): {}", rule.id, err);
                shared_state
                    .lock()
                    .await
                    .set_rule_error(rule.id, Some(format!("{}", err.inner)));

                let failed_record = TxRecordDao {
                    id: 0,
                    rule_id: rule.id,
                    tx_hash: FAILED_TX_HASH.to_string(),
                    amount: "0".to_string(),
                    fee: "0".to_string(),
                    status: TX_STATUS_FAILED.to_string(),
                    error: Some(format!("{}", err.inner)),
                    created_date: now,
                };
                if let Err(err) = insert_tx_record(conn, &failed_record).await {
                    log::error!("Error writing failure record for rule {}: {}", rule.id, err);
                }
            }
        }

        if let Err(err) = release_rule_lease(conn, rule.id).await {
            log::error!("Error releasing lease for rule {}: {}", rule.id, err);
        }
    }
    Ok(())
}

pub async fn service_loop(
    shared_state: Arc<Mutex<SharedState>>,
    conn: &SqlitePool,
    client: &impl TronClient,
    setup: &SweeperSetup,
) {
    loop {
        log::debug!("Sweeper service loop - start tick");
        shared_state.lock().await.idling = false;

        //a failure of the tick itself (e.g. the rule query) is logged and
        //the tick abandoned, the next one starts fresh
        if let Err(e) = sweep_tick(shared_state.clone(), conn, client, setup).await {
            log::error!("Error in sweep tick: {}", e);
        }

        shared_state.lock().await.idling = true;
        if setup.sweep_once {
            log::info!("Single sweep requested, exiting...");
            break;
        }
        tokio::time::sleep(std::time::Duration::from_secs(setup.sweep_interval)).await;
    }
}
