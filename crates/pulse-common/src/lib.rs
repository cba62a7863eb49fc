//! Common utilities and types for the Pulse analytics engine

pub mod config;
pub mod error;
pub mod logging;
pub mod records;
pub mod sheets;

// Re-export commonly used types
pub use config::{AppConfig, SheetsConfig};
pub use error::{PulseError, Result};
pub use logging::{init_default_logging, init_dev_logging, init_logging, LoggingConfig};
pub use records::{
    ClientRecord, LeadRecord, SessionRecord, TrainerRecord, TransactionRecord,
};
pub use sheets::{SheetsClient, ValuesResponse};
