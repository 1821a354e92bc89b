// アプリケーション層モジュール
pub mod alert_topic;
pub mod check_stock_handler;
pub mod load_inventory_handler;

// 再エクスポート
pub use alert_topic::{AlertTopic, TopicResolutionError};
pub use check_stock_handler::{CheckStockError, CheckStockHandler, CheckStockResult};
pub use load_inventory_handler::{
    LoadInventoryError, LoadInventoryHandler, LoadInventoryResult, ObjectLocation,
};
