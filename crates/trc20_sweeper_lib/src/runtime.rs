use crate::client::HttpTronClient;
use crate::config;
use crate::db::create_sqlite_connection;
use crate::error::SweeperError;
use crate::err_from;
use crate::error::*;
use crate::setup::SweeperSetup;
use crate::sweeper::service_loop;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Per-call timeout for node requests
const CLIENT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct SharedRuleInfo {
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SharedState {
    pub current_rule_info: BTreeMap<i64, SharedRuleInfo>,
    pub idling: bool,
}

impl SharedState {
    pub fn set_rule_message(&mut self, id: i64, message: String) {
        if let Some(info) = self.current_rule_info.get_mut(&id) {
            info.message = message;
        } else {
            self.current_rule_info
                .insert(id, SharedRuleInfo { message, error: None });
        }
    }

    pub fn set_rule_error(&mut self, id: i64, error: Option<String>) {
        if let Some(info) = self.current_rule_info.get_mut(&id) {
            info.error = error;
        } else {
            self.current_rule_info.insert(
                id,
                SharedRuleInfo {
                    message: "".to_string(),
                    error,
                },
            );
        }
    }

    pub fn delete_rule_info(&mut self, id: i64) {
        self.current_rule_info.remove(&id);
    }
}

pub struct SweeperRuntime {
    pub runtime_handle: JoinHandle<()>,
    pub setup: SweeperSetup,
    pub shared_state: Arc<Mutex<SharedState>>,
    pub conn: SqlitePool,
}

pub async fn start_sweeper_engine(
    db_filename: &str,
    config: config::Config,
    conn: Option<SqlitePool>,
    sweep_once: bool,
) -> Result<SweeperRuntime, SweeperError> {
    let setup = SweeperSetup::new(&config, sweep_once)?;
    log::debug!("Starting sweeper engine: {:#?}", setup);

    let conn = if let Some(conn) = conn {
        conn
    } else {
        log::info!("connecting to sqlite file db: {}", db_filename);
        create_sqlite_connection(Some(db_filename), None, true).await?
    };

    let client = HttpTronClient::new(setup.fee_limit_sun, CLIENT_TIMEOUT_SECS)
        .map_err(err_from!())?;

    let shared_state = Arc::new(Mutex::new(SharedState {
        current_rule_info: BTreeMap::new(),
        idling: false,
    }));

    let setup_ = setup.clone();
    let shared_state_clone = shared_state.clone();
    let conn_ = conn.clone();
    let jh = tokio::spawn(async move {
        service_loop(shared_state_clone, &conn_, &client, &setup_).await
    });

    Ok(SweeperRuntime {
        runtime_handle: jh,
        setup,
        shared_state,
        conn,
    })
}
