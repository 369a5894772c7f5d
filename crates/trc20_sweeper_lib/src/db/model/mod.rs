mod transfer_rule_dao;
mod tx_record_dao;

pub use transfer_rule_dao::{TransferRuleDao, RULE_STATUS_DISABLED, RULE_STATUS_ENABLED};
pub use tx_record_dao::{
    TxRecordDao, FAILED_TX_HASH, TX_STATUS_COMPLETED, TX_STATUS_FAILED, TX_STATUS_RECEIVED,
};
