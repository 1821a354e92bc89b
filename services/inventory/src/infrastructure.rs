// Infrastructure layer modules
pub mod config;
pub mod inventory_repository;
pub mod logging;
pub mod s3_ops;
pub mod sns_ops;

// Re-exports
pub use config::{ConfigError, InventoryConfig};
pub use inventory_repository::{DynamoInventoryRepository, InventoryRepository, RepositoryError};
pub use logging::{init_logging, log_received_event};
pub use s3_ops::{AwsS3Ops, S3Ops, S3OpsError};
pub use sns_ops::{AwsSnsOps, PublishResult, SnsOps, SnsOpsError};
