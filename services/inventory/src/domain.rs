// Domain layer modules
pub mod alert_message;
pub mod inventory_record;

// Re-exports
pub use alert_message::{AlertMessage, ALERT_SUBJECT};
pub use inventory_record::{parse_count, parse_stock_level, CountParseError, InventoryRecord};
