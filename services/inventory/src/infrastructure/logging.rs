/// ログ基盤モジュール
///
/// Lambda環境向けの構造化ログ設定を提供する。
/// CloudWatch Logsで検索しやすいよう、JSON形式で1イベント1行を出力する。
use std::sync::Once;

use serde::Serialize;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// ログサブスクライバー初期化用の同期プリミティブ
static INIT: Once = Once::new();

/// `RUST_LOG`未設定時のログレベル
const DEFAULT_LOG_LEVEL: &str = "info";

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// 環境変数`RUST_LOG`でフィルタリングし、未設定時は`info`とする。
/// 複数回呼び出しても最初の呼び出しのみ初期化を実行する。
///
/// # 使用例
/// ```ignore
/// use inventory::infrastructure::init_logging;
///
/// init_logging();
/// tracing::info!("Lambda function started");
/// ```
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer(std::io::stdout))
            .init();
    });
}

/// JSON形式のログレイヤー（Lambda/CloudWatch向け）
///
/// イベントのフィールドはトップレベルに展開する。
fn json_layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .flatten_event(true)
        .with_current_span(false)
        .with_writer(make_writer)
}

/// 受信したLambdaイベントをdebugレベルでJSON出力する
///
/// シリアライズに失敗してもハンドラーの処理は継続する。
pub fn log_received_event<T: Serialize>(event: &T) {
    match serde_json::to_string(event) {
        Ok(json) => tracing::debug!(event = %json, "イベントを受信"),
        Err(err) => tracing::warn!(error = %err, "受信イベントのシリアライズに失敗"),
    }
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// ログ出力を記録するテスト用ライター
    #[derive(Clone, Default)]
    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl BufferWriter {
        /// 出力された1行1イベントのJSONを取得
        fn json_lines(&self) -> Vec<Value> {
            let output = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
            output
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    /// JSONレイヤーを通してクロージャ内のログを記録する
    fn capture_json_logs(f: impl FnOnce()) -> Vec<Value> {
        let buffer = BufferWriter::default();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("debug"))
            .with(json_layer(buffer.clone()));

        tracing::subscriber::with_default(subscriber, f);

        buffer.json_lines()
    }

    #[test]
    fn test_init_test_logging_idempotent() {
        init_test_logging();
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_json_layer_flattens_fields() {
        let lines = capture_json_logs(|| {
            tracing::error!(row = 3, error = "count", "行の取り込みに失敗");
        });

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["level"], "ERROR");
        assert_eq!(line["message"], "行の取り込みに失敗");
        assert_eq!(line["row"], 3);
        assert_eq!(line["error"], "count");
        assert!(line["target"].as_str().unwrap().starts_with("inventory"));
        assert!(line["filename"].as_str().unwrap().ends_with("logging.rs"));
        assert!(line["line_number"].is_number());
    }

    #[test]
    fn test_json_layer_respects_filter() {
        let buffer = BufferWriter::default();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(DEFAULT_LOG_LEVEL))
            .with(json_layer(buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("出力されない");
            tracing::info!("出力される");
        });

        let lines = buffer.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "出力される");
    }

    #[test]
    fn test_log_received_event_outputs_payload() {
        let payload = json!({
            "Records": [{ "s3": { "object": { "key": "inventory.csv" } } }]
        });

        let lines = capture_json_logs(|| log_received_event(&payload));

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "DEBUG");
        assert_eq!(lines[0]["message"], "イベントを受信");
        let logged: Value = serde_json::from_str(lines[0]["event"].as_str().unwrap()).unwrap();
        assert_eq!(logged, payload);
    }
}
