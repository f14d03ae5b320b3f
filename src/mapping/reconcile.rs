use crate::db_error::Result;
use crate::store::LiveColumn;
use crate::types::{decode, ColumnDef, Schema, Value};

/// 让现有表列向目标模式收敛的单个操作
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaOp {
    /// 按编译器产出的完整定义文本加列
    Add(ColumnDef),
    /// 按列名删列
    Drop(String),
}

impl SchemaOp {
    /// 对应的 ALTER TABLE 语句
    pub fn sql(&self, table: &str) -> String {
        match self {
            SchemaOp::Add(def) => format!("ALTER TABLE [{table}] ADD COLUMN {}", def.sql()),
            SchemaOp::Drop(name) => format!("ALTER TABLE [{table}] DROP COLUMN [{name}]"),
        }
    }
}

/// 计算收敛操作序列：先算全部删除，再算全部新增，
/// 这样同名异型的列先删掉再重建。
/// 不是通用迁移工具：不保数据、不重排、不原地改约束。
pub fn plan(schema: &Schema, live: &[LiveColumn]) -> Result<Vec<SchemaOp>> {
    let mut ops = Vec::new();
    let mut dropped: Vec<&str> = Vec::new();
    for column in live {
        if incompatible(schema, column)? {
            ops.push(SchemaOp::Drop(column.name.clone()));
            dropped.push(column.name.as_str());
        }
    }
    // 新增以删除后的存活列为准，被删掉的同名列会被重建
    for def in schema.columns() {
        let survives = live
            .iter()
            .any(|c| c.name == def.name && !dropped.contains(&c.name.as_str()));
        if !survives {
            ops.push(SchemaOp::Add(def.clone()));
        }
    }
    Ok(ops)
}

/// 一列现状与目标定义不兼容的条件（任一命中即删）：
/// 名字不在目标模式里、物理类型文本不同、非空标记不同、
/// 解码后的默认值不同、主键标记不同
fn incompatible(schema: &Schema, column: &LiveColumn) -> Result<bool> {
    let def = match schema.get(&column.name) {
        Some(def) => def,
        None => return Ok(true),
    };
    if column.sql_type != def.column_type.sql_type() {
        return Ok(true);
    }
    if column.not_null != def.not_null {
        return Ok(true);
    }
    if column.primary_key != def.primary_key {
        return Ok(true);
    }
    let live_default = match &column.default {
        Some(text) => decode(Value::Text(text.clone()), def.column_type, true)?,
        None => Value::Null,
    };
    let target_default = def.default.clone().unwrap_or(Value::Null);
    Ok(live_default != target_default)
}
