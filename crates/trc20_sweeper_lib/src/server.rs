use crate::db::model::{TransferRuleDao, RULE_STATUS_ENABLED};
use crate::db::ops::*;
use crate::runtime::SharedState;
use crate::setup::SweeperSetup;
use crate::tron::TronAddress;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{web, HttpRequest, HttpResponse, Scope};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rust_decimal::Decimal;
use secp256k1::SecretKey;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AdminAuth {
    username: String,
    password: String,
}

impl AdminAuth {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    pub fn token(&self) -> String {
        BASE64.encode(format!("{}:{}", self.username, self.password))
    }

    pub fn verify(&self, auth_header: &str) -> bool {
        let token = auth_header.strip_prefix("Basic ").unwrap_or(auth_header);
        token == self.token()
    }
}

pub struct ServerData {
    pub shared_state: Arc<Mutex<SharedState>>,
    pub db_connection: Arc<Mutex<SqlitePool>>,
    pub setup: SweeperSetup,
    pub admin_auth: AdminAuth,
}

macro_rules! return_on_error {
    ( $e:expr ) => {
        match $e {
            Ok(x) => x,
            Err(err) => {
                return HttpResponse::InternalServerError().json(json!({
                    "error": err.to_string()
                }))
            },
        }
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "error": "Unauthorized"
    }))
}

fn is_authorized(data: &Data<Box<ServerData>>, req: &HttpRequest) -> bool {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| data.admin_auth.verify(value))
        .unwrap_or(false)
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(data: Data<Box<ServerData>>, body: web::Json<LoginRequest>) -> HttpResponse {
    if body.username == data.admin_auth.username && body.password == data.admin_auth.password {
        HttpResponse::Ok().json(json!({
            "token": data.admin_auth.token(),
            "message": "Login successful",
        }))
    } else {
        HttpResponse::Unauthorized().json(json!({
            "error": "Authentication failed"
        }))
    }
}

pub async fn dashboard(data: Data<Box<ServerData>>, req: HttpRequest) -> HttpResponse {
    if !is_authorized(&data, &req) {
        return unauthorized();
    }
    let totals = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(get_dashboard_totals(&db_conn).await)
    };
    HttpResponse::Ok().json(json!({
        "totalIn": format!("{:.6}", totals.total_in),
        "totalOut": format!("{:.6}", totals.total_out),
        "netFlow": format!("{:.6}", totals.total_in - totals.total_out),
    }))
}

pub async fn transfers(data: Data<Box<ServerData>>, req: HttpRequest) -> HttpResponse {
    if !is_authorized(&data, &req) {
        return unauthorized();
    }
    let rules = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(get_all_transfer_rules(&db_conn).await)
    };
    //TransferRuleDao skips private_key on serialization
    HttpResponse::Ok().json(rules)
}

#[derive(Deserialize)]
pub struct CreateTransferRequest {
    pub private_key: String,
    pub network: String,
    pub to_address: String,
    pub to_network: String,
    pub min_amount: String,
    #[serde(default)]
    pub token_contract: Option<String>,
}

pub async fn create_transfer(
    data: Data<Box<ServerData>>,
    req: HttpRequest,
    body: web::Json<CreateTransferRequest>,
) -> HttpResponse {
    if !is_authorized(&data, &req) {
        return unauthorized();
    }

    if data.setup.networks.get(&body.network).is_none() {
        return HttpResponse::BadRequest().json(json!({
            "error": format!("Unknown network: {}", body.network)
        }));
    }
    if data.setup.networks.get(&body.to_network).is_none() {
        return HttpResponse::BadRequest().json(json!({
            "error": format!("Unknown network: {}", body.to_network)
        }));
    }
    //do not disclose the private key in the error message
    let secret_key = match SecretKey::from_str(body.private_key.trim()) {
        Ok(secret_key) => secret_key,
        Err(_) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Failed to parse private key"
            }))
        }
    };
    let to_addr = match TronAddress::from_str(body.to_address.trim()) {
        Ok(to_addr) => to_addr,
        Err(err) => {
            return HttpResponse::BadRequest().json(json!({
                "error": format!("Invalid destination address: {}", err.msg)
            }))
        }
    };
    let min_amount = match Decimal::from_str(body.min_amount.trim()) {
        Ok(min_amount) if min_amount > Decimal::from(0) => min_amount,
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": format!("Invalid minimum amount: {}", body.min_amount)
            }))
        }
    };
    let token_contract = match body.token_contract.as_deref().filter(|s| !s.is_empty()) {
        Some(contract) => match TronAddress::from_str(contract.trim()) {
            Ok(contract) => Some(contract.to_string()),
            Err(err) => {
                return HttpResponse::BadRequest().json(json!({
                    "error": format!("Invalid token contract: {}", err.msg)
                }))
            }
        },
        None => None,
    };

    //source address is fixed by the key, the caller never supplies it
    let from_addr = TronAddress::from_secret(&secret_key);

    let rule = TransferRuleDao {
        id: 0,
        private_key: body.private_key.trim().to_string(),
        from_addr: from_addr.to_string(),
        to_addr: to_addr.to_string(),
        network: body.network.clone(),
        to_network: body.to_network.clone(),
        min_amount: min_amount.normalize().to_string(),
        token_contract,
        status: RULE_STATUS_ENABLED.to_string(),
        lease_till: None,
        created_date: chrono::Utc::now(),
    };

    let inserted = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(insert_transfer_rule(&*db_conn, &rule).await)
    };
    log::info!(
        "Transfer rule {} created: {} -> {}",
        inserted.id,
        inserted.from_addr,
        inserted.to_addr
    );
    HttpResponse::Ok().json(json!({
        "id": inserted.id,
    }))
}

pub async fn delete_transfer(data: Data<Box<ServerData>>, req: HttpRequest) -> HttpResponse {
    if !is_authorized(&data, &req) {
        return unauthorized();
    }
    let rule_id = req
        .match_info()
        .get("rule_id")
        .map(|rule_id| i64::from_str(rule_id).ok())
        .unwrap_or(None);
    let rule_id = match rule_id {
        Some(rule_id) => rule_id,
        None => {
            return HttpResponse::BadRequest().json(json!({"error": "failed to parse rule_id"}))
        }
    };

    //history records stay, only the rule goes
    let deleted = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(delete_transfer_rule(&*db_conn, rule_id).await)
    };
    if deleted {
        HttpResponse::Ok().json(json!({
            "success": true,
        }))
    } else {
        HttpResponse::NotFound().json(json!({
            "error": "Rule not found",
        }))
    }
}

pub async fn transactions(data: Data<Box<ServerData>>, req: HttpRequest) -> HttpResponse {
    if !is_authorized(&data, &req) {
        return unauthorized();
    }
    let rule_id = req
        .match_info()
        .get("rule_id")
        .map(|rule_id| i64::from_str(rule_id).ok())
        .unwrap_or(None);
    let rule_id = match rule_id {
        Some(rule_id) => rule_id,
        None => {
            return HttpResponse::BadRequest().json(json!({"error": "failed to parse rule_id"}))
        }
    };

    let records = {
        let db_conn = data.db_connection.lock().await;
        return_on_error!(get_tx_records_by_rule(&db_conn, rule_id, None).await)
    };
    HttpResponse::Ok().json(records)
}

pub async fn config_endpoint(data: Data<Box<ServerData>>, req: HttpRequest) -> HttpResponse {
    if !is_authorized(&data, &req) {
        return unauthorized();
    }
    HttpResponse::Ok().json(json!({
        "config": data.setup,
    }))
}

pub async fn debug_endpoint(data: Data<Box<ServerData>>, req: HttpRequest) -> HttpResponse {
    if !is_authorized(&data, &req) {
        return unauthorized();
    }
    let shared_state = data.shared_state.lock().await.clone();
    HttpResponse::Ok().json(json!({
        "sharedState": shared_state,
    }))
}

pub async fn greet() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "name": "trc20_sweeper",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn runtime_web_scope(
    scope: Scope,
    server_data: Data<Box<ServerData>>,
    debug: bool,
) -> Scope {
    let api_scope = Scope::new("/api");
    let mut api_scope = api_scope
        .app_data(server_data)
        .route("/login", web::post().to(login))
        .route("/dashboard", web::get().to(dashboard))
        .route("/transfers", web::get().to(transfers))
        .route("/transfers", web::post().to(create_transfer))
        .route("/transfers/{rule_id}", web::delete().to(delete_transfer))
        .route("/transactions/{rule_id}", web::get().to(transactions))
        .route("/config", web::get().to(config_endpoint))
        .route("/", web::get().to(greet))
        .route("/version", web::get().to(greet));

    if debug {
        log::info!("Debug endpoint enabled");
        api_scope = api_scope.route("/debug", web::get().to(debug_endpoint));
    }

    // Add version endpoint to /api, /api/ and /api/version
    let scope = scope.route("/api", web::get().to(greet));
    scope.service(api_scope)
}
