mod transfer_rule_ops;
mod tx_record_ops;

pub use transfer_rule_ops::*;
pub use tx_record_ops::*;
