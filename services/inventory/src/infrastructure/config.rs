/// 在庫Lambda設定
///
/// テーブル名とアラートトピックを環境変数から読み込む。
/// いずれも未設定の場合は固定のデフォルト値を使用する。
use thiserror::Error;

/// Inventoryテーブル名のデフォルト値
pub const DEFAULT_INVENTORY_TABLE: &str = "Inventory";

/// アラートトピック名のデフォルト値
pub const DEFAULT_ALERT_TOPIC_NAME: &str = "NoStock";

const INVENTORY_TABLE_VAR: &str = "INVENTORY_TABLE";
const ALERT_TOPIC_NAME_VAR: &str = "ALERT_TOPIC_NAME";
const ALERT_TOPIC_ARN_VAR: &str = "ALERT_TOPIC_ARN";

/// 設定のエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("環境変数が空です: {0}")]
    EmptyValue(String),
}

/// 在庫Lambda設定
///
/// 以下の環境変数から読み込む:
/// - INVENTORY_TABLE: 在庫テーブル名（デフォルト: Inventory）
/// - ALERT_TOPIC_NAME: アラート送信先SNSトピック名（デフォルト: NoStock）
/// - ALERT_TOPIC_ARN: アラート送信先SNSトピックARN（任意、設定時はトピック検索を省略）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// 在庫テーブル名
    inventory_table: String,
    /// アラートトピック名
    alert_topic_name: String,
    /// アラートトピックARN（明示指定時のみ）
    alert_topic_arn: Option<String>,
}

impl InventoryConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # エラー
    /// 環境変数が空文字で設定されている場合はエラーを返す
    pub fn from_env() -> Result<Self, ConfigError> {
        let inventory_table =
            read_var(INVENTORY_TABLE_VAR)?.unwrap_or_else(|| DEFAULT_INVENTORY_TABLE.to_string());
        let alert_topic_name = read_var(ALERT_TOPIC_NAME_VAR)?
            .unwrap_or_else(|| DEFAULT_ALERT_TOPIC_NAME.to_string());
        let alert_topic_arn = read_var(ALERT_TOPIC_ARN_VAR)?;

        Ok(Self {
            inventory_table,
            alert_topic_name,
            alert_topic_arn,
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(
        inventory_table: impl Into<String>,
        alert_topic_name: impl Into<String>,
        alert_topic_arn: Option<String>,
    ) -> Self {
        Self {
            inventory_table: inventory_table.into(),
            alert_topic_name: alert_topic_name.into(),
            alert_topic_arn,
        }
    }

    /// 在庫テーブル名を取得
    pub fn inventory_table(&self) -> &str {
        &self.inventory_table
    }

    /// アラートトピック名を取得
    pub fn alert_topic_name(&self) -> &str {
        &self.alert_topic_name
    }

    /// アラートトピックARNを取得（明示指定時のみ）
    pub fn alert_topic_arn(&self) -> Option<&str> {
        self.alert_topic_arn.as_deref()
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INVENTORY_TABLE, DEFAULT_ALERT_TOPIC_NAME, None)
    }
}

/// 環境変数を読み込む（未設定はNone、空文字はエラー）
fn read_var(name: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(name.to_string())),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // 安全性: #[serial]で環境変数を扱うテストを直列化している
    unsafe fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    unsafe fn cleanup() {
        unsafe {
            std::env::remove_var(INVENTORY_TABLE_VAR);
            std::env::remove_var(ALERT_TOPIC_NAME_VAR);
            std::env::remove_var(ALERT_TOPIC_ARN_VAR);
        }
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::EmptyValue("INVENTORY_TABLE".to_string());
        assert_eq!(error.to_string(), "環境変数が空です: INVENTORY_TABLE");
    }

    #[test]
    fn test_default_config() {
        let config = InventoryConfig::default();
        assert_eq!(config.inventory_table(), "Inventory");
        assert_eq!(config.alert_topic_name(), "NoStock");
        assert_eq!(config.alert_topic_arn(), None);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        unsafe { cleanup() };

        let config = InventoryConfig::from_env().unwrap();
        assert_eq!(config, InventoryConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        unsafe {
            cleanup();
            set_env(INVENTORY_TABLE_VAR, "InventoryStaging");
            set_env(ALERT_TOPIC_NAME_VAR, "NoStockStaging");
            set_env(
                ALERT_TOPIC_ARN_VAR,
                "arn:aws:sns:us-west-2:123456789012:NoStockStaging",
            );
        }

        let config = InventoryConfig::from_env().unwrap();
        assert_eq!(config.inventory_table(), "InventoryStaging");
        assert_eq!(config.alert_topic_name(), "NoStockStaging");
        assert_eq!(
            config.alert_topic_arn(),
            Some("arn:aws:sns:us-west-2:123456789012:NoStockStaging")
        );

        unsafe { cleanup() };
    }

    #[test]
    #[serial]
    fn test_from_env_empty_value() {
        unsafe {
            cleanup();
            set_env(INVENTORY_TABLE_VAR, "  ");
        }

        let result = InventoryConfig::from_env();
        assert_eq!(
            result,
            Err(ConfigError::EmptyValue("INVENTORY_TABLE".to_string()))
        );

        unsafe { cleanup() };
    }
}
