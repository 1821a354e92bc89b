//! 在庫レコード
//!
//! Inventoryテーブルの1アイテム（店舗 × 商品の在庫数）を表現する。
//! (store, item) の組がレコードの識別子となる。

use thiserror::Error;

/// 在庫数の変換エラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("在庫数を整数に変換できません: {value:?}")]
pub struct CountParseError {
    /// 変換に失敗した元の文字列
    pub value: String,
}

/// 在庫数文字列を非負整数に変換する
///
/// 前後の空白は無視する。負数・小数・数値以外はエラー。
pub fn parse_count(value: &str) -> Result<u64, CountParseError> {
    value.trim().parse::<u64>().map_err(|_| CountParseError {
        value: value.to_string(),
    })
}

/// ストリームの在庫数を符号付き整数に変換する
///
/// Inventoryテーブルには他の書き込み元から負数が入ることもあるため、
/// 在庫チェックでは負数も有効な値として扱う。数値以外はエラー。
pub fn parse_stock_level(value: &str) -> Result<i128, CountParseError> {
    value.trim().parse::<i128>().map_err(|_| CountParseError {
        value: value.to_string(),
    })
}

/// 在庫レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    /// 店舗識別子
    pub store: String,
    /// 商品識別子
    pub item: String,
    /// 在庫数
    pub count: u64,
}

impl InventoryRecord {
    /// 新しいInventoryRecordを作成
    pub fn new(store: impl Into<String>, item: impl Into<String>, count: u64) -> Self {
        Self {
            store: store.into(),
            item: item.into(),
            count,
        }
    }

    /// 文字列の在庫数からInventoryRecordを作成
    ///
    /// CSVの行など、在庫数が文字列で与えられる場合に使用する。
    pub fn parse(
        store: impl Into<String>,
        item: impl Into<String>,
        count: &str,
    ) -> Result<Self, CountParseError> {
        Ok(Self::new(store, item, parse_count(count)?))
    }
}
