use super::{CustomError, TransactionFailedError};
use crate::client::ClientError;
use crate::utils::ConversionError;
use std::fmt::Display;
use std::num::ParseIntError;

/// Enum containing all possible errors used in the library
#[derive(Debug)]
pub enum ErrorBag {
    ParseError(ParseIntError),
    IoError(std::io::Error),
    CustomError(CustomError),
    TransactionFailedError(TransactionFailedError),
    SQLxError(sqlx::Error),
    SQLxMigrateError(sqlx::migrate::MigrateError),
    EthAbiError(web3::ethabi::Error),
    ReqwestError(reqwest::Error),
    JsonError(serde_json::Error),
    ConversionError(ConversionError),
    FromHexError(hex::FromHexError),
    DecimalError(rust_decimal::Error),
    SecpError(secp256k1::Error),
    ClientError(ClientError),
}

impl Display for ErrorBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorBag::ParseError(parse_int_error) => write!(f, "{parse_int_error}"),
            ErrorBag::IoError(io_error) => write!(f, "{io_error}"),
            ErrorBag::CustomError(custom_error) => write!(f, "{custom_error}"),
            ErrorBag::TransactionFailedError(transaction_failed_error) => {
                write!(f, "{transaction_failed_error}")
            }
            ErrorBag::SQLxError(sqlx_error) => write!(f, "{sqlx_error:?}"),
            ErrorBag::SQLxMigrateError(sqlx_migrate_error) => write!(f, "{sqlx_migrate_error:?}"),
            ErrorBag::EthAbiError(eth_abi_error) => write!(f, "{eth_abi_error:?}"),
            ErrorBag::ReqwestError(reqwest_error) => write!(f, "{reqwest_error}"),
            ErrorBag::JsonError(json_error) => write!(f, "{json_error}"),
            ErrorBag::ConversionError(conversion_error) => write!(f, "{conversion_error:?}"),
            ErrorBag::FromHexError(from_hex_error) => write!(f, "{from_hex_error:?}"),
            ErrorBag::DecimalError(decimal_error) => write!(f, "{decimal_error}"),
            ErrorBag::SecpError(secp_error) => write!(f, "{secp_error}"),
            ErrorBag::ClientError(client_error) => write!(f, "{client_error}"),
        }
    }
}

impl std::error::Error for ErrorBag {}

impl From<ParseIntError> for ErrorBag {
    fn from(err: ParseIntError) -> Self {
        ErrorBag::ParseError(err)
    }
}

impl From<std::io::Error> for ErrorBag {
    fn from(err: std::io::Error) -> Self {
        ErrorBag::IoError(err)
    }
}

impl From<CustomError> for ErrorBag {
    fn from(err: CustomError) -> Self {
        ErrorBag::CustomError(err)
    }
}

impl From<TransactionFailedError> for ErrorBag {
    fn from(err: TransactionFailedError) -> Self {
        ErrorBag::TransactionFailedError(err)
    }
}

impl From<sqlx::Error> for ErrorBag {
    fn from(err: sqlx::Error) -> Self {
        ErrorBag::SQLxError(err)
    }
}

impl From<sqlx::migrate::MigrateError> for ErrorBag {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        ErrorBag::SQLxMigrateError(err)
    }
}

impl From<web3::ethabi::Error> for ErrorBag {
    fn from(err: web3::ethabi::Error) -> Self {
        ErrorBag::EthAbiError(err)
    }
}

impl From<reqwest::Error> for ErrorBag {
    fn from(err: reqwest::Error) -> Self {
        ErrorBag::ReqwestError(err)
    }
}

impl From<serde_json::Error> for ErrorBag {
    fn from(err: serde_json::Error) -> Self {
        ErrorBag::JsonError(err)
    }
}

impl From<ConversionError> for ErrorBag {
    fn from(err: ConversionError) -> Self {
        ErrorBag::ConversionError(err)
    }
}

impl From<hex::FromHexError> for ErrorBag {
    fn from(err: hex::FromHexError) -> Self {
        ErrorBag::FromHexError(err)
    }
}

impl From<rust_decimal::Error> for ErrorBag {
    fn from(err: rust_decimal::Error) -> Self {
        ErrorBag::DecimalError(err)
    }
}

impl From<secp256k1::Error> for ErrorBag {
    fn from(err: secp256k1::Error) -> Self {
        ErrorBag::SecpError(err)
    }
}

impl From<ClientError> for ErrorBag {
    fn from(err: ClientError) -> Self {
        ErrorBag::ClientError(err)
    }
}
