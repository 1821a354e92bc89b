//! 在庫ファイル取り込みハンドラー
//!
//! S3にアップロードされたCSV形式の在庫ファイルを取得し、
//! 1行ごとにInventoryテーブルへupsertする。
//! 1行の失敗（在庫数の変換エラー、書き込みエラー）は記録して次の行へ進む。

use aws_lambda_events::event::s3::S3Event;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{CountParseError, InventoryRecord};
use crate::infrastructure::{InventoryRepository, RepositoryError, S3Ops, S3OpsError};

/// 在庫ファイルに必須の列
const REQUIRED_COLUMNS: [&str; 3] = ["store", "item", "count"];

/// 取り込みハンドラーのエラー型（呼び出し全体を失敗させる）
#[derive(Debug, Error)]
pub enum LoadInventoryError {
    /// S3イベントの形式が想定と異なる
    #[error("S3イベントの形式が不正です: {0}")]
    Decode(String),

    /// 在庫ファイルの取得に失敗
    #[error("在庫ファイルの取得に失敗 (bucket: {bucket}, key: {key}): {source}")]
    Transfer {
        bucket: String,
        key: String,
        #[source]
        source: S3OpsError,
    },

    /// CSVヘッダー行の読み込みに失敗
    #[error("CSVヘッダーの読み込みに失敗: {0}")]
    Header(String),
}

/// 1行分の取り込みエラー（記録してスキップする）
#[derive(Debug, Error)]
pub enum RowError {
    /// 行の読み込み・列の欠落
    #[error("行の読み込みに失敗: {0}")]
    Decode(String),

    /// 在庫数の変換エラー
    #[error(transparent)]
    Parse(#[from] CountParseError),

    /// Inventoryテーブルへの書き込みエラー
    #[error("在庫レコードの書き込みに失敗: {0}")]
    Write(#[from] RepositoryError),
}

/// 取り込み対象のS3オブジェクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    /// バケット名
    pub bucket: String,
    /// デコード済みのオブジェクトキー
    pub key: String,
}

impl ObjectLocation {
    /// S3イベントの先頭レコードから取り込み対象を取得
    ///
    /// 2件目以降のレコードは無視する。
    pub fn from_event(event: &S3Event) -> Result<Self, LoadInventoryError> {
        let record = event
            .records
            .first()
            .ok_or_else(|| LoadInventoryError::Decode("Recordsが空です".to_string()))?;

        if event.records.len() > 1 {
            warn!(
                record_count = event.records.len(),
                "複数のレコードを受信、先頭のみ処理します"
            );
        }

        let bucket = record
            .s3
            .bucket
            .name
            .clone()
            .ok_or_else(|| LoadInventoryError::Decode("s3.bucket.nameがありません".to_string()))?;

        let raw_key = record
            .s3
            .object
            .key
            .as_deref()
            .ok_or_else(|| LoadInventoryError::Decode("s3.object.keyがありません".to_string()))?;

        Ok(Self {
            bucket,
            key: decode_object_key(raw_key)?,
        })
    }
}

/// S3イベント通知のオブジェクトキーをデコードする
///
/// `+`を空白に置換してからパーセントデコードする。
pub fn decode_object_key(raw_key: &str) -> Result<String, LoadInventoryError> {
    urlencoding::decode(&raw_key.replace('+', " "))
        .map(|key| key.into_owned())
        .map_err(|e| {
            LoadInventoryError::Decode(format!("オブジェクトキーのデコードに失敗 ({}): {}", raw_key, e))
        })
}

/// 在庫ファイルの1行
#[derive(Debug, Deserialize)]
struct InventoryRow {
    store: String,
    item: String,
    count: String,
}

/// 取り込み結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadInventoryResult {
    /// 読み込んだ行数（失敗した行を含む）
    pub row_count: usize,
    /// 書き込みに成功した行数
    pub success_count: usize,
    /// 失敗した行数
    pub failure_count: usize,
}

impl LoadInventoryResult {
    /// Lambdaの戻り値として返す確認メッセージ
    pub fn message(&self) -> String {
        format!("{} records processed successfully", self.row_count)
    }
}

/// 在庫ファイル取り込みハンドラー
pub struct LoadInventoryHandler<S, R>
where
    S: S3Ops,
    R: InventoryRepository,
{
    /// S3操作
    s3: S,
    /// 在庫リポジトリ
    repository: R,
}

impl<S, R> LoadInventoryHandler<S, R>
where
    S: S3Ops,
    R: InventoryRepository,
{
    /// 新しいLoadInventoryHandlerを作成
    pub fn new(s3: S, repository: R) -> Self {
        Self { s3, repository }
    }

    /// S3イベントを処理
    ///
    /// # 処理フロー
    /// 1. 先頭レコードからバケット名とキーを取得（キーはデコード）
    /// 2. オブジェクト全体を取得
    /// 3. CSVとして1行ずつ読み込み、Inventoryテーブルへupsert
    ///
    /// # 戻り値
    /// * `Ok(LoadInventoryResult)` - 行単位の処理結果
    /// * `Err(LoadInventoryError)` - イベント不正または取得失敗
    pub async fn handle(&self, event: &S3Event) -> Result<LoadInventoryResult, LoadInventoryError> {
        let location = ObjectLocation::from_event(event)?;

        info!(
            bucket = %location.bucket,
            key = %location.key,
            "在庫ファイル取り込み開始"
        );

        let body = self
            .s3
            .get_object(&location.bucket, &location.key)
            .await
            .map_err(|source| LoadInventoryError::Transfer {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                source,
            })?;

        let result = self.load_rows(&body).await?;

        info!(
            bucket = %location.bucket,
            key = %location.key,
            row_count = result.row_count,
            success_count = result.success_count,
            failure_count = result.failure_count,
            "在庫ファイル取り込み完了"
        );

        Ok(result)
    }

    /// CSV本体を1行ずつ取り込む
    async fn load_rows(&self, body: &[u8]) -> Result<LoadInventoryResult, LoadInventoryError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            // ヘッダーより列の多い行も受け付ける（余分な列は無視）
            .flexible(true)
            .from_reader(body);

        let headers = reader
            .headers()
            .map_err(|e| LoadInventoryError::Header(e.to_string()))?;
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            warn!(missing_columns = ?missing, "必須列がありません");
        }

        let mut result = LoadInventoryResult::default();

        for (index, row) in reader.deserialize::<InventoryRow>().enumerate() {
            // ヘッダーを除いた1始まりの行番号
            let row_number = index + 1;
            result.row_count += 1;

            match self.load_row(row).await {
                Ok(record) => {
                    debug!(
                        row = row_number,
                        store = %record.store,
                        item = %record.item,
                        count = record.count,
                        "在庫レコードを書き込み"
                    );
                    result.success_count += 1;
                }
                Err(err) => {
                    error!(row = row_number, error = %err, "行の取り込みに失敗");
                    result.failure_count += 1;
                }
            }
        }

        Ok(result)
    }

    /// 1行を在庫レコードに変換して書き込む
    async fn load_row(
        &self,
        row: Result<InventoryRow, csv::Error>,
    ) -> Result<InventoryRecord, RowError> {
        let row = row.map_err(|e| RowError::Decode(e.to_string()))?;
        let record = InventoryRecord::parse(row.store, row.item, &row.count)?;
        self.repository.put(&record).await?;
        Ok(record)
    }
}
