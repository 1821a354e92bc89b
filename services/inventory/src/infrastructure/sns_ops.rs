//! SNS操作モジュール
//!
//! Check-Stock Lambdaで使用するSNS機能を提供する。
//! - アラートトピックを探すためのトピック一覧取得
//! - 在庫切れメッセージのトピックへの発行

use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client as SnsClient;
use thiserror::Error;
use tracing::{debug, info, warn};

/// SNS操作のエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnsOpsError {
    /// AWS SDK エラー
    #[error("AWS SNS APIエラー: {0}")]
    AwsSdkError(String),
}

/// SNSメッセージ発行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    /// メッセージID
    pub message_id: String,
    /// 発行先トピックARN
    pub topic_arn: String,
}

impl PublishResult {
    /// 発行結果を作成
    pub fn new(topic_arn: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            topic_arn: topic_arn.into(),
        }
    }
}

/// SNS操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait SnsOps: Send + Sync {
    /// アカウント内の全トピックARNを取得する
    ///
    /// NextTokenによるページングをすべて辿る。
    async fn list_topic_arns(&self) -> Result<Vec<String>, SnsOpsError>;

    /// メッセージをSNSトピックに発行する
    ///
    /// # 引数
    /// * `topic_arn` - SNSトピックARN
    /// * `message` - 発行するメッセージ（プレーンテキスト）
    /// * `subject` - メッセージの件名
    ///
    /// # 戻り値
    /// * `Ok(PublishResult)` - 発行結果
    /// * `Err(SnsOpsError)` - エラー
    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: &str,
    ) -> Result<PublishResult, SnsOpsError>;
}

/// 実際のAWS SNS SDKを使用したSNS操作実装
pub struct AwsSnsOps {
    client: SnsClient,
}

impl AwsSnsOps {
    /// 新しいAwsSnsOpsを作成
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnsOps for AwsSnsOps {
    async fn list_topic_arns(&self) -> Result<Vec<String>, SnsOpsError> {
        let mut topic_arns = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_topics()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| {
                    warn!(error = %DisplayErrorContext(&err), "SNS ListTopicsエラー");
                    SnsOpsError::AwsSdkError(DisplayErrorContext(&err).to_string())
                })?;

            topic_arns.extend(
                response
                    .topics()
                    .iter()
                    .filter_map(|topic| topic.topic_arn().map(str::to_string)),
            );

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(topic_count = topic_arns.len(), "SNSトピック一覧取得完了");

        Ok(topic_arns)
    }

    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: &str,
    ) -> Result<PublishResult, SnsOpsError> {
        info!(
            topic_arn = %topic_arn,
            message_length = message.len(),
            "SNSメッセージ発行開始"
        );

        // MessageStructureは指定しない（本文はそのまま配信される）
        let result = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .subject(subject)
            .send()
            .await;

        match result {
            Ok(response) => {
                let message_id = response.message_id().unwrap_or("unknown").to_string();

                info!(
                    topic_arn = %topic_arn,
                    message_id = %message_id,
                    "SNS Publish成功"
                );

                Ok(PublishResult::new(topic_arn, message_id))
            }
            Err(err) => {
                warn!(
                    topic_arn = %topic_arn,
                    error = %DisplayErrorContext(&err),
                    "SNS Publishエラー"
                );
                Err(SnsOpsError::AwsSdkError(
                    DisplayErrorContext(&err).to_string(),
                ))
            }
        }
    }
}
