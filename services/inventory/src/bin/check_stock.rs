/// Check-Stock Lambda関数
///
/// InventoryテーブルのDynamoDB Streamsをトリガーに、
/// 在庫数が0になった商品の在庫切れアラートをSNSに発行する。
use aws_lambda_events::event::dynamodb::Event;
use inventory::application::{AlertTopic, CheckStockHandler};
use inventory::infrastructure::{init_logging, log_received_event, AwsSnsOps, InventoryConfig};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    let config = InventoryConfig::from_env().inspect_err(|err| {
        error!(error = %err, "設定読み込み失敗");
    })?;

    // SNSクライアントと解決済みトピックARNはプロセスの存続期間中共有する
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let handler = CheckStockHandler::new(
        AwsSnsOps::new(aws_sdk_sns::Client::new(&aws_config)),
        AlertTopic::from_config(&config),
    );

    info!(
        alert_topic_name = config.alert_topic_name(),
        alert_topic_arn = ?config.alert_topic_arn(),
        "Check-Stock Lambda初期化完了"
    );

    lambda_runtime::run(service_fn(|event| handle(&handler, event))).await?;
    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// 失敗したレコード以降は処理せず、Errを返してinvocationを失敗させる。
async fn handle(
    handler: &CheckStockHandler<AwsSnsOps>,
    event: LambdaEvent<Event>,
) -> Result<String, Error> {
    let (payload, context) = event.into_parts();
    log_received_event(&payload);

    match handler.handle(&payload).await {
        Ok(result) => Ok(result.message()),
        Err(err) => {
            error!(
                request_id = %context.request_id,
                error = %err,
                "在庫チェックに失敗"
            );
            Err(err.into())
        }
    }
}
