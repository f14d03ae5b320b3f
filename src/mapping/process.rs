use itertools::Itertools;

use crate::db_error::{Error, Result};
use crate::types::{encode, ColumnType, Record, Schema, Value};

/// 等值谓词的扁平 AND 连接，update/delete 用它定位行。
/// 永远不嵌套分组。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdentityPredicate {
    clauses: Vec<(String, Value)>,
}

impl IdentityPredicate {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// 渲染为 WHERE 片段。
    /// 空谓词意味着记录没有任何映射上的字段，属于调用方错误。
    pub fn to_sql(&self) -> Result<String> {
        if self.clauses.is_empty() {
            return Err(Error::InvalidQueryUsage(
                "identity predicate over a record with no mapped fields".to_string(),
            ));
        }
        Ok(self
            .clauses
            .iter()
            .map(|(name, value)| format!("[{name}] = {}", encode(value)))
            .join(" AND "))
    }
}

/// 记录处理结果：按列排列的数据 + 行定位谓词
#[derive(Clone, Debug, PartialEq)]
pub struct Processed {
    pub columns: Vec<String>,
    pub values: Vec<Value>,
    pub identity: IdentityPredicate,
}

/// 把字段填充好的记录转换为按列排列的数据。
/// 名字不在模式里、或运行期值类型与列类型不匹配的字段静默跳过
/// （容忍映射策略，Null 视为未填充）。
/// 定位谓词：填充了非空主键时只按主键；否则对全部收录字段做 AND 等值。
pub fn process(schema: &Schema, record: &Record) -> Processed {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    let mut clauses = Vec::new();
    let mut pk_clause = None;
    for (name, value) in record.iter() {
        let def = match schema.get(name) {
            Some(def) => def,
            None => continue,
        };
        if !kind_matches(value, def.column_type) {
            continue;
        }
        columns.push(name.to_string());
        values.push(value.clone());
        if def.primary_key {
            pk_clause = Some((name.to_string(), value.clone()));
        } else {
            clauses.push((name.to_string(), value.clone()));
        }
    }
    let identity = match pk_clause {
        // 主键在场时其余等值子句全部让位
        Some(clause) => IdentityPredicate {
            clauses: vec![clause],
        },
        None => IdentityPredicate { clauses },
    };
    Processed {
        columns,
        values,
        identity,
    }
}

/// 运行期值种类与声明列类型的匹配检查
fn kind_matches(value: &Value, column_type: ColumnType) -> bool {
    matches!(
        (value, column_type),
        (Value::Integer(_), ColumnType::Integer)
            | (Value::Real(_), ColumnType::Real)
            | (Value::Text(_), ColumnType::Text)
            | (Value::Composite(_), ColumnType::Json)
    )
}
