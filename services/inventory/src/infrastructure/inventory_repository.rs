/// DynamoDBのInventoryテーブルに在庫レコードを保存するリポジトリ
///
/// 書き込みは(Store, Item)をキーとした無条件のput（upsert）で、
/// 楽観ロックは行わない。
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::InventoryRecord;

/// 店舗属性名（パーティションキー）
pub const STORE_ATTRIBUTE: &str = "Store";
/// 商品属性名（ソートキー）
pub const ITEM_ATTRIBUTE: &str = "Item";
/// 在庫数属性名
pub const COUNT_ATTRIBUTE: &str = "Count";

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),
}

/// 在庫レコード永続化用トレイト
///
/// 実際のDynamoDBとテスト用モックを差し替えられるようにする。
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// 在庫レコードをupsertする
    ///
    /// 同じ(store, item)のレコードが存在する場合は上書きする。
    ///
    /// # 戻り値
    /// * 成功時は`Ok(())`
    /// * 失敗時は`Err(RepositoryError)`
    async fn put(&self, record: &InventoryRecord) -> Result<(), RepositoryError>;
}

/// InventoryRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoInventoryRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// 在庫テーブル名
    table_name: String,
}

impl DynamoInventoryRepository {
    /// 新しいDynamoInventoryRepositoryを作成
    ///
    /// # 引数
    /// * `client` - DynamoDBクライアント
    /// * `table_name` - 在庫テーブルの名前
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// 在庫レコードをDynamoDBアイテムに変換
    fn to_item(record: &InventoryRecord) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (
                STORE_ATTRIBUTE.to_string(),
                AttributeValue::S(record.store.clone()),
            ),
            (
                ITEM_ATTRIBUTE.to_string(),
                AttributeValue::S(record.item.clone()),
            ),
            (
                COUNT_ATTRIBUTE.to_string(),
                AttributeValue::N(record.count.to_string()),
            ),
        ])
    }
}

#[async_trait]
impl InventoryRepository for DynamoInventoryRepository {
    async fn put(&self, record: &InventoryRecord) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(record)))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    // RepositoryError表示メッセージのテスト
    #[test]
    fn test_repository_error_write_error_display() {
        let error = RepositoryError::WriteError("ProvisionedThroughputExceeded".to_string());
        assert_eq!(
            error.to_string(),
            "Write error: ProvisionedThroughputExceeded"
        );
    }

    // アイテム変換のテスト
    #[test]
    fn test_to_item_attributes() {
        let record = InventoryRecord::new("Berlin", "Echo Dot", 12);
        let item = DynamoInventoryRepository::to_item(&record);

        assert_eq!(item.len(), 3);
        assert_eq!(
            item.get("Store"),
            Some(&AttributeValue::S("Berlin".to_string()))
        );
        assert_eq!(
            item.get("Item"),
            Some(&AttributeValue::S("Echo Dot".to_string()))
        );
        assert_eq!(item.get("Count"), Some(&AttributeValue::N("12".to_string())));
    }

    #[test]
    fn test_to_item_zero_count() {
        let record = InventoryRecord::new("Berlin", "Echo Dot", 0);
        let item = DynamoInventoryRepository::to_item(&record);

        assert_eq!(item.get("Count"), Some(&AttributeValue::N("0".to_string())));
    }

    /// ユニットテスト用のモックInventoryRepository
    #[derive(Debug, Clone, Default)]
    pub struct MockInventoryRepository {
        /// 保存されたレコード: (store, item) -> count
        records: Arc<Mutex<HashMap<(String, String), u64>>>,
        /// put呼び出し回数
        put_calls: Arc<Mutex<usize>>,
        /// 書き込みを失敗させる商品
        failing_items: Arc<Mutex<Vec<String>>>,
    }

    impl MockInventoryRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// 指定した商品の書き込みを常に失敗させる
        pub fn fail_item(&self, item: &str) {
            self.failing_items.lock().unwrap().push(item.to_string());
        }

        pub fn get_count(&self, store: &str, item: &str) -> Option<u64> {
            self.records
                .lock()
                .unwrap()
                .get(&(store.to_string(), item.to_string()))
                .copied()
        }

        pub fn record_count(&self) -> usize {
            self.records.lock().unwrap().len()
        }

        pub fn put_calls(&self) -> usize {
            *self.put_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl InventoryRepository for MockInventoryRepository {
        async fn put(&self, record: &InventoryRecord) -> Result<(), RepositoryError> {
            *self.put_calls.lock().unwrap() += 1;

            if self.failing_items.lock().unwrap().contains(&record.item) {
                return Err(RepositoryError::WriteError(
                    "DynamoDB unavailable".to_string(),
                ));
            }

            self.records
                .lock()
                .unwrap()
                .insert((record.store.clone(), record.item.clone()), record.count);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_repo_put_overwrites_same_key() {
        let repo = MockInventoryRepository::new();

        repo.put(&InventoryRecord::new("A", "Widget", 5)).await.unwrap();
        repo.put(&InventoryRecord::new("A", "Widget", 2)).await.unwrap();

        assert_eq!(repo.record_count(), 1);
        assert_eq!(repo.get_count("A", "Widget"), Some(2));
    }

    #[tokio::test]
    async fn test_mock_repo_put_error() {
        let repo = MockInventoryRepository::new();
        repo.fail_item("Gadget");

        let result = repo.put(&InventoryRecord::new("B", "Gadget", 0)).await;

        assert_eq!(
            result,
            Err(RepositoryError::WriteError("DynamoDB unavailable".to_string()))
        );
        assert_eq!(repo.record_count(), 0);
        assert_eq!(repo.put_calls(), 1);
    }
}
