pub mod analysis;
pub mod error;
pub mod filter;
pub mod har;
pub mod record;

pub use error::{Error, ErrorKind, Result};
pub use record::{Latency, TransactionRecord, records_from_har};
