// 在庫チェックハンドラー
//
// InventoryテーブルのDynamoDB Streamsレコードを受け取り、
// NewImageの在庫数が0のレコードについて在庫切れアラートをSNSに発行する。
// NewImageのないレコード（削除など）はスキップする。

use aws_lambda_events::event::dynamodb::{Event, EventRecord};
use serde_dynamo::{AttributeValue, Item};
use thiserror::Error;
use tracing::{debug, error, info};

use super::alert_topic::{AlertTopic, TopicResolutionError};
use crate::domain::{parse_stock_level, AlertMessage, CountParseError};
use crate::infrastructure::inventory_repository::{
    COUNT_ATTRIBUTE, ITEM_ATTRIBUTE, STORE_ATTRIBUTE,
};
use crate::infrastructure::{SnsOps, SnsOpsError};

/// 在庫チェックハンドラーのエラー型
///
/// いずれのエラーもバッチの残りの処理を中断する。
#[derive(Debug, Error)]
pub enum CheckStockError {
    /// NewImageの属性が欠落、または型が想定と異なる
    #[error("NewImageの形式が不正です: {0}")]
    Decode(String),

    /// 在庫数の変換エラー
    #[error(transparent)]
    Parse(#[from] CountParseError),

    /// アラートトピックの解決に失敗
    #[error(transparent)]
    Resolution(#[from] TopicResolutionError),

    /// アラートの発行に失敗
    #[error("アラートの発行に失敗: {0}")]
    Publish(#[source] SnsOpsError),
}

/// 1レコードの処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockCheckAction {
    /// 在庫切れアラートを発行した
    Alerted {
        /// SNSのメッセージID
        message_id: String,
    },
    /// 在庫数が0以外（負数を含む）
    InStock,
    /// NewImageがないためスキップした
    Skipped,
}

/// 在庫チェック結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckStockResult {
    /// 受信したレコード数
    pub record_count: usize,
    /// 発行したアラート数
    pub alert_count: usize,
    /// 発行したアラートのSNSメッセージID（発行順）
    pub message_ids: Vec<String>,
    /// 在庫ありのレコード数
    pub in_stock_count: usize,
    /// スキップしたレコード数
    pub skip_count: usize,
}

impl CheckStockResult {
    /// Lambdaの戻り値として返す確認メッセージ
    pub fn message(&self) -> String {
        format!("Successfully processed {} records.", self.record_count)
    }
}

/// 在庫チェックハンドラー
pub struct CheckStockHandler<S>
where
    S: SnsOps,
{
    /// SNS操作
    sns: S,
    /// アラート送信先
    topic: AlertTopic,
}

impl<S> CheckStockHandler<S>
where
    S: SnsOps,
{
    /// 新しいCheckStockHandlerを作成
    pub fn new(sns: S, topic: AlertTopic) -> Self {
        Self { sns, topic }
    }

    /// DynamoDB Streamsイベントを受信順に処理
    ///
    /// # 戻り値
    /// * `Ok(CheckStockResult)` - 処理結果
    /// * `Err(CheckStockError)` - 最初に失敗したレコードのエラー（以降は未処理）
    pub async fn handle(&self, event: &Event) -> Result<CheckStockResult, CheckStockError> {
        let mut result = CheckStockResult {
            record_count: event.records.len(),
            ..CheckStockResult::default()
        };

        info!(record_count = result.record_count, "在庫チェック開始");

        for (index, record) in event.records.iter().enumerate() {
            let action = self.process_record(record).await.map_err(|err| {
                error!(
                    index = index,
                    event_id = %record.event_id,
                    error = %err,
                    "レコード処理に失敗、バッチを中断"
                );
                err
            })?;

            match action {
                StockCheckAction::Alerted { message_id } => {
                    result.alert_count += 1;
                    result.message_ids.push(message_id);
                }
                StockCheckAction::InStock => result.in_stock_count += 1,
                StockCheckAction::Skipped => {
                    debug!(index = index, event_name = %record.event_name, "NewImageなし、スキップ");
                    result.skip_count += 1;
                }
            }
        }

        info!(
            record_count = result.record_count,
            alert_count = result.alert_count,
            in_stock_count = result.in_stock_count,
            skip_count = result.skip_count,
            "在庫チェック完了"
        );

        Ok(result)
    }

    /// 単一レコードを処理
    async fn process_record(&self, record: &EventRecord) -> Result<StockCheckAction, CheckStockError> {
        let new_image = &record.change.new_image;
        if new_image.is_empty() {
            return Ok(StockCheckAction::Skipped);
        }

        let count = Self::extract_count(new_image)?;
        if count != 0 {
            return Ok(StockCheckAction::InStock);
        }

        let store = Self::extract_string(new_image, STORE_ATTRIBUTE)?;
        let item = Self::extract_string(new_image, ITEM_ATTRIBUTE)?;
        let alert = AlertMessage::out_of_stock(store, item);

        let topic_arn = self.topic.resolve(&self.sns).await?;
        let published = self
            .sns
            .publish(topic_arn, &alert.body, &alert.subject)
            .await
            .map_err(CheckStockError::Publish)?;

        info!(
            store = %store,
            item = %item,
            message = %alert.body,
            topic_arn = %published.topic_arn,
            message_id = %published.message_id,
            "在庫切れを検出、アラートを発行"
        );

        Ok(StockCheckAction::Alerted {
            message_id: published.message_id,
        })
    }

    /// NewImageから在庫数を抽出
    fn extract_count(image: &Item) -> Result<i128, CheckStockError> {
        match image.get(COUNT_ATTRIBUTE) {
            Some(AttributeValue::N(n)) => Ok(parse_stock_level(n)?),
            Some(_) => Err(CheckStockError::Decode(format!(
                "{}が数値型ではありません",
                COUNT_ATTRIBUTE
            ))),
            None => Err(CheckStockError::Decode(format!(
                "{}フィールドがありません",
                COUNT_ATTRIBUTE
            ))),
        }
    }

    /// NewImageから文字列属性を抽出
    fn extract_string<'a>(image: &'a Item, name: &str) -> Result<&'a str, CheckStockError> {
        match image.get(name) {
            Some(AttributeValue::S(s)) => Ok(s.as_str()),
            Some(_) => Err(CheckStockError::Decode(format!(
                "{}がString型ではありません",
                name
            ))),
            None => Err(CheckStockError::Decode(format!(
                "{}フィールドがありません",
                name
            ))),
        }
    }
}
