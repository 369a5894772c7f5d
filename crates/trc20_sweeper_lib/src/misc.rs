use crate::error::*;
use crate::err_custom_create;
use crate::tron::TronAddress;
use rand::RngCore;
use secp256k1::SecretKey;
use std::str::FromStr;

pub fn load_private_key(str: &str) -> Result<(SecretKey, TronAddress), SweeperError> {
    //do not disclose the private key in error message
    let secret_key = SecretKey::from_str(str.trim())
        .map_err(|_| err_custom_create!("Failed to parse private key"))?;
    let address = TronAddress::from_secret(&secret_key);
    Ok((secret_key, address))
}

pub fn generate_private_key() -> (SecretKey, TronAddress) {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; 32];
    loop {
        rng.fill_bytes(&mut bytes);
        //from_slice rejects zero and out-of-range scalars, just roll again
        if let Ok(secret_key) = SecretKey::from_slice(&bytes) {
            let address = TronAddress::from_secret(&secret_key);
            return (secret_key, address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_private_key() {
        let (_secret_key, address) = load_private_key(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(address.to_string(), "TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC");

        let err = load_private_key("not-a-key").unwrap_err();
        assert!(!err.to_string().contains("not-a-key"));
    }

    #[test]
    fn test_generate_private_key() {
        let (secret_key, address) = generate_private_key();
        assert_eq!(TronAddress::from_secret(&secret_key), address);
    }
}
