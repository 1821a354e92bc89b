//! 在庫切れアラートメッセージ
//!
//! 在庫数が0になったレコードに対してSNSへ発行するメッセージ。

/// アラートの件名（固定）
pub const ALERT_SUBJECT: &str = "Inventory Alert!";

/// 在庫切れアラート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    /// 件名
    pub subject: String,
    /// 本文（プレーンテキスト）
    pub body: String,
}

impl AlertMessage {
    /// 店舗と商品から在庫切れアラートを作成
    pub fn out_of_stock(store: &str, item: &str) -> Self {
        Self {
            subject: ALERT_SUBJECT.to_string(),
            body: format!("{} is out of stock of {}", store, item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_message() {
        let alert = AlertMessage::out_of_stock("A", "Widget");
        assert_eq!(alert.subject, "Inventory Alert!");
        assert_eq!(alert.body, "A is out of stock of Widget");
    }
}
