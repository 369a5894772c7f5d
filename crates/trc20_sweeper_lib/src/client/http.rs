use super::{ClientError, TronClient};
use crate::contracts::{encode_trc20_balance_of, encode_trc20_transfer};
use crate::tron::TronAddress;
use secp256k1::{Message, Secp256k1, SecretKey};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::time::Duration;
use web3::types::U256;

/// TRON HTTP API client (trongrid-compatible full nodes).
/// Transactions are signed locally: recoverable ECDSA over the SHA-256 of
/// the raw transaction, which is also the transaction id.
pub struct HttpTronClient {
    client: reqwest::Client,
    fee_limit: u64,
}

fn client_err(message: String) -> ClientError {
    ClientError { message }
}

/// Node error messages come back hex-encoded
fn decode_api_message(value: &Value) -> String {
    let raw = value.as_str().unwrap_or_default();
    hex::decode(raw)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| raw.to_string())
}

impl HttpTronClient {
    pub fn new(fee_limit: u64, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| client_err(format!("Error building http client: {err}")))?;
        Ok(HttpTronClient { client, fee_limit })
    }

    async fn post_wallet(
        &self,
        endpoint: &str,
        method: &str,
        body: Value,
    ) -> Result<Value, ClientError> {
        let url = format!("{}/wallet/{}", endpoint.trim_end_matches('/'), method);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|err| client_err(format!("Error calling {url}: {err}")))?
            .text()
            .await
            .map_err(|err| client_err(format!("Error reading response from {url}: {err}")))?;
        serde_json::from_str::<Value>(&response)
            .map_err(|err| client_err(format!("Error parsing json from {url}: {err} {response}")))
    }

    fn sign_transaction(
        secret_key: &SecretKey,
        raw_data_hex: &str,
    ) -> Result<(String, [u8; 32]), ClientError> {
        let raw_data = hex::decode(raw_data_hex)
            .map_err(|err| client_err(format!("Invalid raw transaction hex: {err}")))?;
        let tx_hash: [u8; 32] = Sha256::digest(&raw_data).into();
        let message = Message::from_slice(&tx_hash)
            .map_err(|err| client_err(format!("Error building message to sign: {err}")))?;
        let (recovery_id, signature) = Secp256k1::new()
            .sign_ecdsa_recoverable(&message, secret_key)
            .serialize_compact();
        let mut sig_bytes = signature.to_vec();
        sig_bytes.push(recovery_id.to_i32() as u8);
        Ok((hex::encode(sig_bytes), tx_hash))
    }
}

impl TronClient for HttpTronClient {
    async fn token_balance(
        &self,
        endpoint: &str,
        contract: TronAddress,
        address: TronAddress,
    ) -> Result<U256, ClientError> {
        let call_data = encode_trc20_balance_of(address.to_eth())
            .map_err(|err| client_err(format!("Error encoding balanceOf: {err}")))?;
        let response = self
            .post_wallet(
                endpoint,
                "triggerconstantcontract",
                json!({
                    "owner_address": address.to_hex(),
                    "contract_address": contract.to_hex(),
                    "data": hex::encode(call_data),
                }),
            )
            .await?;

        if response["result"]["result"] != Value::Bool(true) {
            return Err(client_err(format!(
                "Balance call rejected by node: {}",
                decode_api_message(&response["result"]["message"])
            )));
        }
        let constant_result = response["constant_result"][0]
            .as_str()
            .ok_or_else(|| client_err("Missing constant_result in balance response".into()))?;
        let bytes = hex::decode(constant_result)
            .map_err(|err| client_err(format!("Invalid balance response hex: {err}")))?;
        if bytes.len() != 32 {
            return Err(client_err(format!(
                "Invalid balance response: {} bytes. Probably not a valid TRC20 contract {}",
                bytes.len(),
                contract
            )));
        }
        Ok(U256::from_big_endian(&bytes))
    }

    async fn trx_balance(
        &self,
        endpoint: &str,
        address: TronAddress,
    ) -> Result<u64, ClientError> {
        let response = self
            .post_wallet(
                endpoint,
                "getaccount",
                json!({
                    "address": address.to_hex(),
                }),
            )
            .await?;
        //an account that never received funds comes back as an empty object
        Ok(response["balance"].as_u64().unwrap_or(0))
    }

    async fn transfer_token(
        &self,
        endpoint: &str,
        secret_key: &SecretKey,
        contract: TronAddress,
        to: TronAddress,
        amount: U256,
    ) -> Result<String, ClientError> {
        let owner = TronAddress::from_secret(secret_key);
        let call_data = encode_trc20_transfer(to.to_eth(), amount)
            .map_err(|err| client_err(format!("Error encoding transfer: {err}")))?;

        let response = self
            .post_wallet(
                endpoint,
                "triggersmartcontract",
                json!({
                    "owner_address": owner.to_hex(),
                    "contract_address": contract.to_hex(),
                    "data": hex::encode(call_data),
                    "fee_limit": self.fee_limit,
                    "call_value": 0,
                }),
            )
            .await?;
        if response["result"]["result"] != Value::Bool(true) {
            return Err(client_err(format!(
                "Transfer rejected when building transaction: {}",
                decode_api_message(&response["result"]["message"])
            )));
        }

        let mut transaction = response["transaction"].clone();
        let tx_id = transaction["txID"]
            .as_str()
            .ok_or_else(|| client_err("Missing txID in built transaction".into()))?
            .to_string();
        let raw_data_hex = transaction["raw_data_hex"]
            .as_str()
            .ok_or_else(|| client_err("Missing raw_data_hex in built transaction".into()))?;

        let (signature, tx_hash) = Self::sign_transaction(secret_key, raw_data_hex)?;
        if hex::encode(tx_hash) != tx_id {
            return Err(client_err(format!(
                "Node returned txID {tx_id} not matching raw transaction hash"
            )));
        }
        transaction["signature"] = json!([signature]);

        let broadcast = self
            .post_wallet(endpoint, "broadcasttransaction", transaction)
            .await?;
        if broadcast["result"] != Value::Bool(true) {
            return Err(client_err(format!(
                "Broadcast rejected: {} {}",
                broadcast["code"].as_str().unwrap_or_default(),
                decode_api_message(&broadcast["message"])
            )));
        }
        Ok(tx_id)
    }
}
