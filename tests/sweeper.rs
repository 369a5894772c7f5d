use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use trc20_sweeper_lib::client::{ClientError, TronClient};
use trc20_sweeper_lib::config::Config;
use trc20_sweeper_lib::db::create_sqlite_connection;
use trc20_sweeper_lib::db::model::*;
use trc20_sweeper_lib::db::ops::*;
use trc20_sweeper_lib::runtime::SharedState;
use trc20_sweeper_lib::setup::SweeperSetup;
use trc20_sweeper_lib::sweeper::sweep_tick;
use trc20_sweeper_lib::tron::TronAddress;
use web3::types::U256;

// address derived from private key 0x...01
const RULE_KEY: &str = "0000000000000000000000000000000000000000000000000000000000000001";
const RULE_ADDR: &str = "TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC";
// address derived from private key 0x...02
const OTHER_KEY: &str = "0000000000000000000000000000000000000000000000000000000000000002";
const OTHER_ADDR: &str = "TDvSsdrNM5eeXNL3czpa6AxLDHZA9nwe9K";

#[derive(Default)]
struct MockTronClient {
    token_balances: HashMap<String, Result<U256, String>>,
    trx_balances: HashMap<String, u64>,
    submitted: StdMutex<Vec<(String, String, U256)>>,
}

impl MockTronClient {
    fn with_balances(address: &str, token_sun: u64, trx_sun: u64) -> Self {
        let mut client = MockTronClient::default();
        client
            .token_balances
            .insert(address.to_string(), Ok(U256::from(token_sun)));
        client.trx_balances.insert(address.to_string(), trx_sun);
        client
    }

    fn submissions(&self) -> Vec<(String, String, U256)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl TronClient for MockTronClient {
    async fn token_balance(
        &self,
        _endpoint: &str,
        _contract: TronAddress,
        address: TronAddress,
    ) -> Result<U256, ClientError> {
        match self.token_balances.get(&address.to_string()) {
            Some(Ok(balance)) => Ok(*balance),
            Some(Err(message)) => Err(ClientError {
                message: message.clone(),
            }),
            None => Ok(U256::zero()),
        }
    }

    async fn trx_balance(
        &self,
        _endpoint: &str,
        address: TronAddress,
    ) -> Result<u64, ClientError> {
        Ok(*self.trx_balances.get(&address.to_string()).unwrap_or(&0))
    }

    async fn transfer_token(
        &self,
        _endpoint: &str,
        secret_key: &secp256k1::SecretKey,
        _contract: TronAddress,
        to: TronAddress,
        amount: U256,
    ) -> Result<String, ClientError> {
        let from = TronAddress::from_secret(secret_key);
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((from.to_string(), to.to_string(), amount));
        Ok(format!("{:064x}", submitted.len()))
    }
}

fn test_setup() -> SweeperSetup {
    let config = Config::load_from_str(
        r#"
[engine]
sweep-interval = 1
lease-duration = 120

[token]
symbol = "USDT"
contract = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"

[gas]
reserve-sun = 1000000
fee-limit-sun = 30000000

[network.testnet]
endpoint = "http://localhost:18890"
"#,
    )
    .unwrap();
    SweeperSetup::new(&config, true).unwrap()
}

fn empty_shared_state() -> Arc<Mutex<SharedState>> {
    Arc::new(Mutex::new(SharedState {
        current_rule_info: BTreeMap::new(),
        idling: false,
    }))
}

async fn insert_rule(
    conn: &sqlx::SqlitePool,
    private_key: &str,
    from_addr: &str,
    to_addr: &str,
    min_amount: &str,
) -> TransferRuleDao {
    insert_transfer_rule(
        conn,
        &TransferRuleDao {
            id: 0,
            private_key: private_key.to_string(),
            from_addr: from_addr.to_string(),
            to_addr: to_addr.to_string(),
            network: "testnet".to_string(),
            to_network: "testnet".to_string(),
            min_amount: min_amount.to_string(),
            token_contract: None,
            status: RULE_STATUS_ENABLED.to_string(),
            lease_till: None,
            created_date: chrono::Utc::now(),
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn below_threshold_leaves_no_trace() {
    let conn = create_sqlite_connection(None, Some("sweep_below_threshold"), true)
        .await
        .unwrap();
    insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "10").await;
    //5 USDT observed, minimum is 10
    let client = MockTronClient::with_balances(RULE_ADDR, 5_000_000, 2_000_000);

    sweep_tick(empty_shared_state(), &conn, &client, &test_setup())
        .await
        .unwrap();

    assert!(client.submissions().is_empty());
    assert!(get_all_tx_records(&conn, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn sweeps_full_balance_not_minimum() {
    let conn = create_sqlite_connection(None, Some("sweep_full_balance"), true)
        .await
        .unwrap();
    let rule = insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "10").await;
    //15 USDT observed, minimum is 10, plenty of gas
    let client = MockTronClient::with_balances(RULE_ADDR, 15_000_000, 2_000_000);

    sweep_tick(empty_shared_state(), &conn, &client, &test_setup())
        .await
        .unwrap();

    let submissions = client.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].0, RULE_ADDR);
    assert_eq!(submissions[0].1, OTHER_ADDR);
    assert_eq!(submissions[0].2, U256::from(15_000_000_u64));

    let records = get_all_tx_records(&conn, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rule_id, rule.id);
    assert_eq!(records[0].status, TX_STATUS_COMPLETED);
    assert_eq!(records[0].amount, "15");
    assert_eq!(records[0].fee, "0");
    assert!(records[0].error.is_none());
    assert_ne!(records[0].tx_hash, FAILED_TX_HASH);

    //lease is released once the record is written
    let rule = get_transfer_rule(&conn, rule.id).await.unwrap().unwrap();
    assert!(rule.lease_till.is_none());
    assert_eq!(rule.status, RULE_STATUS_ENABLED);
}

#[tokio::test]
async fn balance_equal_to_minimum_triggers_sweep() {
    let conn = create_sqlite_connection(None, Some("sweep_equal_minimum"), true)
        .await
        .unwrap();
    insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "10").await;
    let client = MockTronClient::with_balances(RULE_ADDR, 10_000_000, 2_000_000);

    sweep_tick(empty_shared_state(), &conn, &client, &test_setup())
        .await
        .unwrap();

    assert_eq!(client.submissions().len(), 1);
    let records = get_all_tx_records(&conn, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].amount, "10");
}

#[tokio::test]
async fn insufficient_gas_fails_without_submission() {
    let conn = create_sqlite_connection(None, Some("sweep_no_gas"), true)
        .await
        .unwrap();
    let rule = insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "10").await;
    //20 USDT over the minimum but native balance is below the 1 TRX reserve
    let client = MockTronClient::with_balances(RULE_ADDR, 20_000_000, 500_000);

    sweep_tick(empty_shared_state(), &conn, &client, &test_setup())
        .await
        .unwrap();

    assert!(client.submissions().is_empty());
    let records = get_all_tx_records(&conn, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rule_id, rule.id);
    assert_eq!(records[0].status, TX_STATUS_FAILED);
    assert_eq!(records[0].tx_hash, FAILED_TX_HASH);
    assert_eq!(records[0].amount, "0");
    assert!(records[0].error.as_ref().unwrap().contains("gas fee"));

    //the rule stays enabled, the next tick will try again
    let rule = get_transfer_rule(&conn, rule.id).await.unwrap().unwrap();
    assert_eq!(rule.status, RULE_STATUS_ENABLED);
    assert!(rule.lease_till.is_none());
}

#[tokio::test]
async fn balance_query_error_becomes_failed_record() {
    let conn = create_sqlite_connection(None, Some("sweep_query_error"), true)
        .await
        .unwrap();
    insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "10").await;
    let mut client = MockTronClient::default();
    client.token_balances.insert(
        RULE_ADDR.to_string(),
        Err("connection refused by node".to_string()),
    );

    sweep_tick(empty_shared_state(), &conn, &client, &test_setup())
        .await
        .unwrap();

    assert!(client.submissions().is_empty());
    let records = get_all_tx_records(&conn, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, TX_STATUS_FAILED);
    assert!(records[0]
        .error
        .as_ref()
        .unwrap()
        .contains("connection refused by node"));
}

#[tokio::test]
async fn failing_rule_does_not_block_remaining_rules() {
    let conn = create_sqlite_connection(None, Some("sweep_rule_isolation"), true)
        .await
        .unwrap();
    let broken = insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "10").await;
    let healthy = insert_rule(&conn, OTHER_KEY, OTHER_ADDR, RULE_ADDR, "10").await;

    let mut client = MockTronClient::default();
    client
        .token_balances
        .insert(RULE_ADDR.to_string(), Err("node down".to_string()));
    client
        .token_balances
        .insert(OTHER_ADDR.to_string(), Ok(U256::from(12_000_000_u64)));
    client.trx_balances.insert(OTHER_ADDR.to_string(), 3_000_000);

    sweep_tick(empty_shared_state(), &conn, &client, &test_setup())
        .await
        .unwrap();

    //the healthy rule swept even though the first one failed
    assert_eq!(client.submissions().len(), 1);
    assert_eq!(client.submissions()[0].0, OTHER_ADDR);

    let broken_records = get_tx_records_by_rule(&conn, broken.id, None).await.unwrap();
    assert_eq!(broken_records.len(), 1);
    assert_eq!(broken_records[0].status, TX_STATUS_FAILED);

    let healthy_records = get_tx_records_by_rule(&conn, healthy.id, None).await.unwrap();
    assert_eq!(healthy_records.len(), 1);
    assert_eq!(healthy_records[0].status, TX_STATUS_COMPLETED);
    assert_eq!(healthy_records[0].amount, "12");
}

#[tokio::test]
async fn leased_rule_is_skipped_until_lease_expires() {
    let conn = create_sqlite_connection(None, Some("sweep_lease"), true)
        .await
        .unwrap();
    let rule = insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "10").await;
    let client = MockTronClient::with_balances(RULE_ADDR, 15_000_000, 2_000_000);
    let setup = test_setup();

    //another evaluation holds the lease for two more minutes
    let now = chrono::Utc::now();
    let held = acquire_rule_lease(&conn, rule.id, now, now + chrono::Duration::seconds(120))
        .await
        .unwrap();
    assert!(held);

    //a second claim must lose while the first lease is unexpired
    assert!(
        !acquire_rule_lease(&conn, rule.id, now, now + chrono::Duration::seconds(120))
            .await
            .unwrap()
    );

    sweep_tick(empty_shared_state(), &conn, &client, &setup)
        .await
        .unwrap();
    assert!(client.submissions().is_empty());
    assert!(get_all_tx_records(&conn, None).await.unwrap().is_empty());

    //pretend the holder crashed: claiming "later" than the expiry succeeds
    let after_expiry = now + chrono::Duration::seconds(300);
    assert!(acquire_rule_lease(
        &conn,
        rule.id,
        after_expiry,
        after_expiry + chrono::Duration::seconds(120)
    )
    .await
    .unwrap());
    release_rule_lease(&conn, rule.id).await.unwrap();

    sweep_tick(empty_shared_state(), &conn, &client, &setup)
        .await
        .unwrap();
    assert_eq!(client.submissions().len(), 1);
    assert_eq!(get_all_tx_records(&conn, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_ticks_without_balance_change_keep_sweeping() {
    //each tick decides from current on-chain state only, there is no
    //persistent per-rule machine remembering earlier sweeps
    let conn = create_sqlite_connection(None, Some("sweep_stateless_ticks"), true)
        .await
        .unwrap();
    insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "10").await;
    let client = MockTronClient::with_balances(RULE_ADDR, 15_000_000, 2_000_000);
    let setup = test_setup();

    sweep_tick(empty_shared_state(), &conn, &client, &setup)
        .await
        .unwrap();
    sweep_tick(empty_shared_state(), &conn, &client, &setup)
        .await
        .unwrap();

    assert_eq!(client.submissions().len(), 2);
    assert_eq!(get_all_tx_records(&conn, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn dashboard_sums_completed_as_outbound() {
    let conn = create_sqlite_connection(None, Some("sweep_dashboard"), true)
        .await
        .unwrap();
    let rule = insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "1").await;

    for (amount, status, error) in [
        ("10.5", TX_STATUS_COMPLETED, None),
        ("2", TX_STATUS_COMPLETED, None),
        ("0", TX_STATUS_FAILED, Some("node down".to_string())),
    ] {
        insert_tx_record(
            &conn,
            &TxRecordDao {
                id: 0,
                rule_id: rule.id,
                tx_hash: "ab".repeat(32),
                amount: amount.to_string(),
                fee: "0".to_string(),
                status: status.to_string(),
                error,
                created_date: chrono::Utc::now(),
            },
        )
        .await
        .unwrap();
    }

    let totals = get_dashboard_totals(&conn).await.unwrap();
    assert_eq!(totals.total_out, Decimal::from_str("12.5").unwrap());
    assert_eq!(totals.total_in, Decimal::from(0));
}

#[tokio::test]
async fn dashboard_aggregates_received_although_nothing_writes_it() {
    //known discrepancy: RECEIVED is part of the aggregation contract but
    //no operation in the sweep path produces it. The row below is inserted
    //by hand to pin the aggregation side of the contract.
    let conn = create_sqlite_connection(None, Some("sweep_received_gap"), true)
        .await
        .unwrap();
    let rule = insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "1").await;

    let client = MockTronClient::with_balances(RULE_ADDR, 15_000_000, 2_000_000);
    sweep_tick(empty_shared_state(), &conn, &client, &test_setup())
        .await
        .unwrap();
    //the sweep path never produced a RECEIVED row
    let records = get_all_tx_records(&conn, None).await.unwrap();
    assert!(records.iter().all(|r| r.status != TX_STATUS_RECEIVED));

    insert_tx_record(
        &conn,
        &TxRecordDao {
            id: 0,
            rule_id: rule.id,
            tx_hash: "cd".repeat(32),
            amount: "3".to_string(),
            fee: "0".to_string(),
            status: TX_STATUS_RECEIVED.to_string(),
            error: None,
            created_date: chrono::Utc::now(),
        },
    )
    .await
    .unwrap();

    let totals = get_dashboard_totals(&conn).await.unwrap();
    assert_eq!(totals.total_in, Decimal::from(3));
    assert_eq!(totals.total_out, Decimal::from(15));
}

#[tokio::test]
async fn deleting_rule_keeps_history() {
    let conn = create_sqlite_connection(None, Some("sweep_delete_rule"), true)
        .await
        .unwrap();
    let rule = insert_rule(&conn, RULE_KEY, RULE_ADDR, OTHER_ADDR, "10").await;
    let client = MockTronClient::with_balances(RULE_ADDR, 15_000_000, 2_000_000);

    sweep_tick(empty_shared_state(), &conn, &client, &test_setup())
        .await
        .unwrap();

    assert!(delete_transfer_rule(&conn, rule.id).await.unwrap());
    assert!(get_transfer_rule(&conn, rule.id).await.unwrap().is_none());

    let records = get_tx_records_by_rule(&conn, rule.id, None).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn unknown_network_becomes_failed_record() {
    let conn = create_sqlite_connection(None, Some("sweep_unknown_network"), true)
        .await
        .unwrap();
    let rule = insert_transfer_rule(
        &conn,
        &TransferRuleDao {
            id: 0,
            private_key: RULE_KEY.to_string(),
            from_addr: RULE_ADDR.to_string(),
            to_addr: OTHER_ADDR.to_string(),
            network: "nonexistent".to_string(),
            to_network: "testnet".to_string(),
            min_amount: "10".to_string(),
            token_contract: None,
            status: RULE_STATUS_ENABLED.to_string(),
            lease_till: None,
            created_date: chrono::Utc::now(),
        },
    )
    .await
    .unwrap();
    let client = MockTronClient::with_balances(RULE_ADDR, 15_000_000, 2_000_000);

    sweep_tick(empty_shared_state(), &conn, &client, &test_setup())
        .await
        .unwrap();

    assert!(client.submissions().is_empty());
    let records = get_tx_records_by_rule(&conn, rule.id, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, TX_STATUS_FAILED);
    assert!(records[0].error.as_ref().unwrap().contains("nonexistent"));
}
