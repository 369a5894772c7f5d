use crate::tron::TronAddress;
use secp256k1::SecretKey;
use std::future::Future;
use web3::types::U256;

mod http;

pub use http::HttpTronClient;

#[derive(Debug)]
pub struct ClientError {
    pub message: String,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClientError {}

/// Everything the sweep evaluator needs from a TRON node. Production uses
/// HttpTronClient; tests substitute a scripted implementation.
pub trait TronClient {
    /// TRC20 balance of the address, in the token's smallest unit
    fn token_balance(
        &self,
        endpoint: &str,
        contract: TronAddress,
        address: TronAddress,
    ) -> impl Future<Output = Result<U256, ClientError>> + Send;

    /// Native TRX balance of the address, in sun
    fn trx_balance(
        &self,
        endpoint: &str,
        address: TronAddress,
    ) -> impl Future<Output = Result<u64, ClientError>> + Send;

    /// Build, sign and broadcast a TRC20 transfer, returning the transaction id
    fn transfer_token(
        &self,
        endpoint: &str,
        secret_key: &SecretKey,
        contract: TronAddress,
        to: TronAddress,
        amount: U256,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;
}
