//! アラート送信先トピック
//!
//! ARNが設定で与えられていればそのまま使用する。
//! 与えられていない場合は初回の在庫切れ検出時にトピック一覧から名前で検索し、
//! 見つかったARNをプロセスの存続期間中キャッシュする。

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::infrastructure::{InventoryConfig, SnsOps, SnsOpsError};

/// トピック解決のエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopicResolutionError {
    /// 名前が一致するトピックが存在しない
    #[error("アラートトピックが見つかりません: {0}")]
    NotFound(String),
    /// トピック一覧の取得に失敗
    #[error("トピック一覧の取得に失敗: {0}")]
    ListFailed(#[from] SnsOpsError),
}

/// アラート送信先トピック
#[derive(Debug)]
pub struct AlertTopic {
    /// トピック名（ARN末尾との比較に使用）
    name: String,
    /// 解決済みのトピックARN
    arn: OnceCell<String>,
}

impl AlertTopic {
    /// トピック名で検索するAlertTopicを作成
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arn: OnceCell::new(),
        }
    }

    /// ARNが既知のAlertTopicを作成（検索しない）
    pub fn with_arn(name: impl Into<String>, arn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arn: OnceCell::new_with(Some(arn.into())),
        }
    }

    /// 設定からAlertTopicを作成
    pub fn from_config(config: &InventoryConfig) -> Self {
        match config.alert_topic_arn() {
            Some(arn) => Self::with_arn(config.alert_topic_name(), arn),
            None => Self::by_name(config.alert_topic_name()),
        }
    }

    /// トピック名を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// トピックARNを解決する
    ///
    /// 解決に成功したARNはキャッシュされ、以降の呼び出しではSNSを参照しない。
    /// 失敗した場合はキャッシュせず、次回の呼び出しで再検索する。
    pub async fn resolve<S>(&self, sns: &S) -> Result<&str, TopicResolutionError>
    where
        S: SnsOps + ?Sized,
    {
        let arn = self
            .arn
            .get_or_try_init(|| async {
                let topic_arns = sns.list_topic_arns().await?;
                let arn = find_topic_arn(&topic_arns, &self.name)
                    .cloned()
                    .ok_or_else(|| TopicResolutionError::NotFound(self.name.clone()))?;

                info!(topic_name = %self.name, topic_arn = %arn, "アラートトピックを解決");
                Ok::<_, TopicResolutionError>(arn)
            })
            .await?;

        Ok(arn.as_str())
    }
}

/// ARN末尾が`:{name}`と一致する最初のトピックを返す（大文字小文字は区別しない）
pub fn find_topic_arn<'a>(topic_arns: &'a [String], name: &str) -> Option<&'a String> {
    let suffix = format!(":{}", name.to_lowercase());
    topic_arns
        .iter()
        .find(|arn| arn.to_lowercase().ends_with(&suffix))
}
