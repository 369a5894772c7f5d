use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use web3::types::U256;

/// Both TRX and the common TRC20 tokens (USDT included) use 6 decimal
/// places, so one conversion base covers native and token amounts alike.
pub const SUN_PER_TRX: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct ConversionError {
    pub msg: String,
}

impl ConversionError {
    pub fn from(msg: String) -> Self {
        Self { msg }
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error during conversion: {}", self.msg)
    }
}

impl Error for ConversionError {}

fn conversion_base() -> Decimal {
    Decimal::new(SUN_PER_TRX as i64, 0)
}

fn u256_to_token(amount: U256) -> Result<Decimal, ConversionError> {
    //max value supported by rust_decimal
    if amount >= U256::from(79228162514264337593543950336_u128) {
        return Err(ConversionError {
            msg: format!(
                "Amount greater than max rust_decimal: {amount}>=79228162514264337593543950336"
            ),
        });
    }
    Ok(Decimal::from(amount.as_u128()) / conversion_base())
}

fn token_to_u256(dec_amount: Decimal) -> Result<U256, ConversionError> {
    let dec_mul = dec_amount
        .checked_mul(conversion_base())
        .ok_or(ConversionError {
            msg: "Overflow during conversion".to_string(),
        })?
        .normalize();

    if dec_mul.fract() != Decimal::from(0) {
        return Err(ConversionError::from(format!(
            "Number cannot have a fractional part {dec_mul}"
        )));
    }
    let val = dec_mul.to_u128().ok_or_else(|| {
        ConversionError::from(format!("Number cannot be converted to u128 {dec_mul}"))
    })?;
    Ok(U256::from(val))
}

pub trait U256SunExt {
    /// Smallest-unit amount to display units (divide by 10^6)
    fn from_sun(&self) -> Result<Decimal, ConversionError>;
}

impl U256SunExt for U256 {
    fn from_sun(&self) -> Result<Decimal, ConversionError> {
        u256_to_token(*self)
    }
}

pub trait DecimalSunExt {
    /// Display units to smallest-unit amount (multiply by 10^6)
    fn to_sun(&self) -> Result<U256, ConversionError>;
}

impl DecimalSunExt for Decimal {
    fn to_sun(&self) -> Result<U256, ConversionError> {
        token_to_u256(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_from_sun() {
        assert_eq!(U256::from(0).from_sun().unwrap(), Decimal::from(0));
        assert_eq!(
            U256::from(1).from_sun().unwrap(),
            Decimal::from_str("0.000001").unwrap()
        );
        assert_eq!(
            U256::from(15_000_000_u64).from_sun().unwrap(),
            Decimal::from(15)
        );
        assert_eq!(
            U256::from(12_345_678_u64).from_sun().unwrap(),
            Decimal::from_str("12.345678").unwrap()
        );

        let too_big = U256::from(79228162514264337593543950336_u128);
        assert!(too_big.from_sun().is_err());
    }

    #[test]
    fn test_to_sun() {
        assert_eq!(
            Decimal::from_str("10.5").unwrap().to_sun().unwrap(),
            U256::from(10_500_000_u64)
        );
        assert_eq!(
            Decimal::from(1).to_sun().unwrap(),
            U256::from(SUN_PER_TRX)
        );
        let res = Decimal::from_str("0.0000001").unwrap().to_sun();
        assert!(res.err().unwrap().msg.contains("fractional"));
    }

    #[test]
    fn test_round_trip() {
        let dec = Decimal::from_str("123456.654321").unwrap();
        assert_eq!(dec.to_sun().unwrap().from_sun().unwrap().normalize(), dec);
    }
}
