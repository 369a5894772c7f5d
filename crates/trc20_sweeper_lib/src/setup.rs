use crate::config::Config;
use crate::error::SweeperError;
use crate::err_custom_create;
use crate::tron::TronAddress;
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSetup {
    pub name: String,
    pub endpoint: String,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SweeperSetup {
    pub networks: BTreeMap<String, NetworkSetup>,
    pub token_symbol: String,
    pub default_token_contract: TronAddress,
    pub gas_reserve_sun: u64,
    pub fee_limit_sun: u64,
    pub sweep_interval: u64,
    pub lease_duration: u64,
    pub sweep_once: bool,
}

impl SweeperSetup {
    pub fn new(config: &Config, sweep_once: bool) -> Result<Self, SweeperError> {
        let mut networks = BTreeMap::new();
        for (name, network) in &config.network {
            Url::parse(&network.endpoint).map_err(|err| {
                err_custom_create!(
                    "Invalid endpoint for network {}: {} {}",
                    name,
                    network.endpoint,
                    err
                )
            })?;
            networks.insert(
                name.clone(),
                NetworkSetup {
                    name: name.clone(),
                    endpoint: network.endpoint.clone(),
                },
            );
        }

        Ok(SweeperSetup {
            networks,
            token_symbol: config.token.symbol.clone(),
            default_token_contract: config.token.contract,
            gas_reserve_sun: config.gas.reserve_sun,
            fee_limit_sun: config.gas.fee_limit_sun,
            sweep_interval: config.engine.sweep_interval,
            lease_duration: config.engine.lease_duration,
            sweep_once,
        })
    }

    pub fn get_endpoint(&self, network: &str) -> Result<&str, SweeperError> {
        let network_setup = self
            .networks
            .get(network)
            .ok_or_else(|| err_custom_create!("No setup for network: {}", network))?;
        Ok(&network_setup.endpoint)
    }
}
