//! カタログレスポンスのパース
//!
//! エントリは1件ずつ独立に解釈し、不正なエントリはカタログ全体を
//! 失敗させずにスキップする。

use serde_json::Value;

/// カタログ中の1モデル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// モデルID
    pub id: String,
    /// 表示名（未指定ならID）
    pub name: String,
    /// コンテキスト長（未指定なら0）
    pub context_length: i64,
    /// 画像入力対応
    pub accepts_images: bool,
    /// 無料で利用可能（監視対象）
    pub is_free: bool,
}

/// パース結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCatalog {
    /// 解釈できたエントリ
    pub entries: Vec<CatalogEntry>,
    /// IDがなくスキップしたエントリ数
    pub skipped: usize,
}

impl ParsedCatalog {
    /// 監視対象（無料モデル）のみを返す
    pub fn monitorable(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_free)
    }
}

/// カタログJSONをパース
///
/// `{"data": [...]}` 形式と配列そのものの両方を受け付ける。
pub fn parse_catalog(catalog: &Value) -> ParsedCatalog {
    let items: &[Value] = match catalog {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    let mut parsed = ParsedCatalog::default();
    for item in items {
        match parse_entry(item) {
            Some(entry) => parsed.entries.push(entry),
            None => parsed.skipped += 1,
        }
    }
    parsed
}

fn parse_entry(item: &Value) -> Option<CatalogEntry> {
    let id = item.get("id")?.as_str()?.trim();
    if id.is_empty() {
        return None;
    }

    let name = item
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(id)
        .to_string();

    let context_length = item
        .get("context_length")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    Some(CatalogEntry {
        id: id.to_string(),
        name,
        context_length,
        accepts_images: accepts_images(item),
        is_free: is_free(id, item),
    })
}

/// 無料判定: 入力・出力の両方の単価が0、またはIDが`:free`で終わる
pub fn is_free(id: &str, item: &Value) -> bool {
    if id.ends_with(":free") {
        return true;
    }
    let Some(pricing) = item.get("pricing") else {
        return false;
    };
    is_zero_price(pricing.get("prompt")) && is_zero_price(pricing.get("completion"))
}

fn is_zero_price(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.trim().parse::<f64>().map(|p| p == 0.0).unwrap_or(false),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// 画像入力対応判定
pub fn accepts_images(item: &Value) -> bool {
    let Some(arch) = item.get("architecture") else {
        return false;
    };

    let in_modalities = arch
        .get("input_modalities")
        .and_then(Value::as_array)
        .is_some_and(|mods| mods.iter().any(|m| m.as_str() == Some("image")));

    let in_modality = arch
        .get("modality")
        .and_then(Value::as_str)
        .is_some_and(|m| m.contains("image"));

    in_modalities || in_modality
}
