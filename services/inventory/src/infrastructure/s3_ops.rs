//! S3操作モジュール
//!
//! Load-Inventory Lambdaで使用するS3オブジェクト取得機能を提供する。
//! オブジェクト本体はストリーミングせず、すべてメモリ上に読み込む。

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client as S3Client;
use thiserror::Error;
use tracing::{info, warn};

/// S3操作のエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum S3OpsError {
    /// AWS SDK エラー（オブジェクトなし、アクセス拒否、通信失敗など）
    #[error("AWS S3 APIエラー: {0}")]
    AwsSdkError(String),
    /// オブジェクト本体の読み込みエラー
    #[error("オブジェクト本体の読み込みに失敗: {0}")]
    ReadBodyError(String),
}

/// S3操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait S3Ops: Send + Sync {
    /// オブジェクト全体を取得する
    ///
    /// # 引数
    /// * `bucket` - バケット名
    /// * `key` - デコード済みのオブジェクトキー
    ///
    /// # 戻り値
    /// * `Ok(Vec<u8>)` - オブジェクト本体
    /// * `Err(S3OpsError)` - エラー
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, S3OpsError>;
}

/// 実際のAWS S3 SDKを使用したS3操作実装
pub struct AwsS3Ops {
    client: S3Client,
}

impl AwsS3Ops {
    /// 新しいAwsS3Opsを作成
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl S3Ops for AwsS3Ops {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, S3OpsError> {
        info!(bucket = %bucket, key = %key, "S3オブジェクト取得開始");

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                warn!(
                    bucket = %bucket,
                    key = %key,
                    error = %DisplayErrorContext(&err),
                    "S3 GetObjectエラー"
                );
                S3OpsError::AwsSdkError(DisplayErrorContext(&err).to_string())
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| S3OpsError::ReadBodyError(err.to_string()))?
            .into_bytes();

        info!(
            bucket = %bucket,
            key = %key,
            size_bytes = body.len(),
            "S3オブジェクト取得成功"
        );

        Ok(body.to_vec())
    }
}
