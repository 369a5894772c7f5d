mod process;
mod service;

pub use process::process_single_rule;
pub use service::{service_loop, sweep_tick};
