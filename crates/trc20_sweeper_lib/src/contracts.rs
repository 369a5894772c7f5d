use lazy_static::lazy_static;
use web3::ethabi;
use web3::types::{H160, U256};

// TRC20 contracts keep the ERC20 ABI, so call data is plain ABI encoding
// and the TRON node accepts it verbatim in the "data" field.

lazy_static! {
    pub static ref TRC20_CONTRACT_TEMPLATE: ethabi::Contract =
        ethabi::Contract::load(&include_bytes!("../contracts/itrc20.json")[..]).unwrap();
}

pub fn contract_encode(
    contract: &ethabi::Contract,
    func: &str,
    params: &[ethabi::Token],
) -> Result<Vec<u8>, ethabi::Error> {
    contract
        .function(func)
        .and_then(|function| function.encode_input(params))
}

pub fn encode_trc20_balance_of(address: H160) -> Result<Vec<u8>, ethabi::Error> {
    contract_encode(
        &TRC20_CONTRACT_TEMPLATE,
        "balanceOf",
        &[ethabi::Token::Address(address)],
    )
}

pub fn encode_trc20_transfer(to: H160, amount: U256) -> Result<Vec<u8>, ethabi::Error> {
    contract_encode(
        &TRC20_CONTRACT_TEMPLATE,
        "transfer",
        &[ethabi::Token::Address(to), ethabi::Token::Uint(amount)],
    )
}
