//! # 值与字面量编解码模块概览
//!
//! 本模块提供映射层统一的**值表示**（`Value`）、**列类型标签**（`ColumnType`）
//! 以及值与 SQLite 字面量文本之间的编解码函数，供模式编译、结构对齐、
//! 语句构造与结果物化各阶段复用。
//!
//! ## 主要组成
//! - `ColumnType`：列的逻辑类型标签（`Integer`/`Real`/`Text`/`Json`）。
//!   `Json` 的物理 SQL 类型同样是 `TEXT`，标签只影响解码行为。
//! - `Value`：值的统一承载（`Null`/`Integer(i64)`/`Real(f64)`/
//!   `Text(String)`/`Composite(serde_json::Value)`）。
//!   复合值（列表、嵌套映射）落盘时先用 serde_json 序列化成文本，
//!   再按字符串规则加引号。
//! - `encode` / `decode`：SQL 字面量编解码。
//!   * 字符串整体加单引号，内部单引号翻倍；
//!   * `Null` 编码为字面量 `NULL`，与空字符串 `''` 始终可区分；
//!   * `decode` 的 `fix_string` 只在重新解读 PRAGMA 返回的
//!     **列默认值字面量**时为 true，普通行数据由存储直接给出未加引号的文本。
//!
//! ## 备注
//! - `Json` 列解析失败视为数据损坏（`Error::MalformedComposite`），不可恢复。

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::db_error::{Error, Result};

/// 列的逻辑类型标签
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// 64bit有符号整形
    Integer,
    /// 浮点类型
    Real,
    /// UTF-8编码的字符串
    Text,
    /// 物理上是 TEXT，内容为 JSON 序列化文本
    Json,
}

impl ColumnType {
    /// DDL 里使用的物理 SQL 类型文本
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text | ColumnType::Json => "TEXT",
        }
    }
}

/// 实现格式化打印
impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "Integer"),
            ColumnType::Real => write!(f, "Real"),
            ColumnType::Text => write!(f, "Text"),
            ColumnType::Json => write!(f, "Json"),
        }
    }
}

/// 值的统一承载
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// 列表或映射形态的复合值，持久化为序列化文本
    Composite(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Composite(j) => Some(j),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Composite(v)
    }
}

/// 把字符串包装成 SQL 字面量：内部单引号翻倍，整体加单引号
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// quote 的逆操作：剥掉一层引号，还原翻倍的单引号
pub fn unquote(s: &str) -> String {
    let s = s.strip_prefix('\'').unwrap_or(s);
    let s = s.strip_suffix('\'').unwrap_or(s);
    s.replace("''", "'")
}

/// 值 -> SQL 字面量文本
/// - 数值直接转字符串，无本地化格式
/// - 复合值先序列化成 JSON 文本再按字符串规则加引号
pub fn encode(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => quote(s),
        Value::Composite(j) => quote(&j.to_string()),
    }
}

/// 原始值 -> 按列类型标签解读后的值
/// - `fix_string` 仅用于重新解读模式自省返回的默认值字面量：
///   字符串剥一层引号，数值从字面量文本解析回数值
/// - `Json` 列把文本解析为复合结构，解析失败即数据损坏
/// - `Real` 列允许存储交回整数，解码时拓宽为浮点
pub fn decode(raw: Value, column_type: ColumnType, fix_string: bool) -> Result<Value> {
    match (column_type, raw) {
        (_, Value::Null) => Ok(Value::Null),
        (ColumnType::Json, Value::Text(text)) => {
            let text = if fix_string { unquote(&text) } else { text };
            let parsed = serde_json::from_str(&text)
                .map_err(|e| Error::MalformedComposite(format!("{text}: {e}")))?;
            Ok(Value::Composite(parsed))
        }
        (ColumnType::Text, Value::Text(text)) if fix_string => Ok(Value::Text(unquote(&text))),
        (ColumnType::Integer, Value::Text(text)) if fix_string => text
            .parse()
            .map(Value::Integer)
            .map_err(|e| Error::InvalidColumns(format!("bad integer literal `{text}`: {e}"))),
        (ColumnType::Real, Value::Text(text)) if fix_string => text
            .parse()
            .map(Value::Real)
            .map_err(|e| Error::InvalidColumns(format!("bad real literal `{text}`: {e}"))),
        (ColumnType::Real, Value::Integer(i)) => Ok(Value::Real(i as f64)),
        (_, raw) => Ok(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::Null), "NULL");
        assert_eq!(encode(&Value::Integer(42)), "42");
        assert_eq!(encode(&Value::Real(0.5)), "0.5");
        assert_eq!(encode(&Value::Text("plain".into())), "'plain'");
    }

    #[test]
    fn test_quote_doubles_embedded_quotes() {
        assert_eq!(encode(&Value::Text("Test 'test'".into())), "'Test ''test'''");
        assert_eq!(unquote("'Test ''test'''"), "Test 'test'");
    }

    #[test]
    fn test_empty_string_stays_distinct_from_null() {
        assert_eq!(encode(&Value::Text(String::new())), "''");
        assert_ne!(encode(&Value::Text(String::new())), encode(&Value::Null));
        let decoded = decode(Value::Text("''".into()), ColumnType::Text, true).unwrap();
        assert_eq!(decoded, Value::Text(String::new()));
    }

    /// decode(encode(v)) 对所有支持的值种类保持恒等
    #[test]
    fn test_round_trip() -> crate::db_error::Result<()> {
        let cases = vec![
            (Value::Integer(-7), ColumnType::Integer),
            (Value::Real(2.25), ColumnType::Real),
            (Value::Text("it's 'quoted'".into()), ColumnType::Text),
            (
                Value::Composite(json!({"readonly": true, "edits": 3, "inner": [1, null, "x'y"]})),
                ColumnType::Json,
            ),
            (Value::Composite(json!(["one", "two"])), ColumnType::Json),
            (Value::Null, ColumnType::Text),
        ];
        for (value, column_type) in cases {
            let literal = encode(&value);
            let raw = if literal == "NULL" {
                Value::Null
            } else {
                Value::Text(literal)
            };
            assert_eq!(decode(raw, column_type, true)?, value);
        }
        Ok(())
    }

    #[test]
    fn test_decode_plain_row_text_without_fix() {
        // 普通行数据由存储给出未加引号的文本，原样通过
        let decoded = decode(Value::Text("Test 'test'".into()), ColumnType::Text, false).unwrap();
        assert_eq!(decoded, Value::Text("Test 'test'".into()));
    }

    #[test]
    fn test_decode_json_column_from_row_text() {
        let decoded =
            decode(Value::Text(r#"{"edits":3}"#.into()), ColumnType::Json, false).unwrap();
        assert_eq!(decoded, Value::Composite(json!({"edits": 3})));
    }

    #[test]
    fn test_malformed_composite_is_fatal() {
        let err = decode(Value::Text("not json".into()), ColumnType::Json, false).unwrap_err();
        assert!(matches!(err, Error::MalformedComposite(_)));
    }

    #[test]
    fn test_numeric_default_literal_parses_back() {
        assert_eq!(
            decode(Value::Text("3".into()), ColumnType::Integer, true).unwrap(),
            Value::Integer(3)
        );
        assert_eq!(
            decode(Value::Text("0.5".into()), ColumnType::Real, true).unwrap(),
            Value::Real(0.5)
        );
    }

    #[test]
    fn test_integer_widens_for_real_column() {
        assert_eq!(
            decode(Value::Integer(3), ColumnType::Real, false).unwrap(),
            Value::Real(3.0)
        );
    }
}
