pub mod error;
pub mod history;
pub mod reconstruct;
pub mod select;
pub mod tx_record;
pub mod types;
