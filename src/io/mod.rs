//! I/O module
//!
//! CSV handling for the demo driver.
//!
//! # Components
//!
//! - `csv_format` - Script record conversion and account-state output

pub mod csv_format;

pub use csv_format::{convert_operation, write_accounts_csv, Operation, OperationRecord};
