/// Load-Inventory Lambda関数
///
/// S3への在庫ファイル（CSV）アップロードをトリガーに、
/// 各行をDynamoDBのInventoryテーブルへupsertする。
use aws_lambda_events::event::s3::S3Event;
use inventory::application::LoadInventoryHandler;
use inventory::infrastructure::{
    init_logging, log_received_event, AwsS3Ops, DynamoInventoryRepository, InventoryConfig,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::{error, info};

type Handler = LoadInventoryHandler<AwsS3Ops, DynamoInventoryRepository>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    let config = InventoryConfig::from_env().inspect_err(|err| {
        error!(error = %err, "設定読み込み失敗");
    })?;

    // AWSクライアントはプロセス起動時に1度だけ作成し、全invocationで共有する
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let handler = LoadInventoryHandler::new(
        AwsS3Ops::new(aws_sdk_s3::Client::new(&aws_config)),
        DynamoInventoryRepository::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            config.inventory_table().to_string(),
        ),
    );

    info!(
        inventory_table = config.inventory_table(),
        "Load-Inventory Lambda初期化完了"
    );

    lambda_runtime::run(service_fn(|event| handle(&handler, event))).await?;
    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// # 処理フロー
/// 1. 受信イベントをログ出力
/// 2. LoadInventoryHandlerで在庫ファイルを取り込み
/// 3. 読み込んだ行数を含む確認メッセージを返却
async fn handle(handler: &Handler, event: LambdaEvent<S3Event>) -> Result<String, Error> {
    let (payload, context) = event.into_parts();
    log_received_event(&payload);

    match handler.handle(&payload).await {
        Ok(result) => Ok(result.message()),
        Err(err) => {
            error!(
                request_id = %context.request_id,
                error = %err,
                "在庫ファイルの取り込みに失敗"
            );
            Err(err.into())
        }
    }
}
