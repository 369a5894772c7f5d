use serde::Deserialize;
use std::collections::btree_map::BTreeMap as Map;

use std::path::Path;

use crate::error::*;
use crate::tron::TronAddress;
use crate::{err_custom_create, err_from};
use tokio::fs;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Engine {
    pub sweep_interval: u64,
    pub lease_duration: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub engine: Engine,
    pub token: Token,
    pub gas: Gas,
    pub network: Map<String, Network>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Token {
    pub symbol: String,
    pub contract: TronAddress,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Gas {
    pub reserve_sun: u64,
    pub fee_limit_sun: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Network {
    pub endpoint: String,
}

impl Config {
    pub fn load_from_str(str: &str) -> Result<Self, SweeperError> {
        match toml::from_str(str) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", str, e)),
        }
    }

    pub async fn load<P: AsRef<Path> + std::fmt::Display>(path: P) -> Result<Self, SweeperError> {
        match toml::from_str(&fs::read_to_string(&path).await.map_err(err_from!())?) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", path, e)),
        }
    }
}
