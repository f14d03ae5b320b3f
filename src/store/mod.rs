mod sqlite;

pub use sqlite::SqliteStore;

use crate::db_error::Result;
use crate::types::Value;

/// Store trait
/// 底层存储的窄接口：核心只通过它消费 SQL 引擎
pub trait Store {
    // 执行任意 SQL 文本，返回零或多行原始位置值
    // DDL/DML/查询都走这一条路
    fn execute(&self, sql: &str) -> Result<Vec<Vec<Value>>>;

    // 判断物理表是否存在
    fn table_exists(&self, name: &str) -> Result<bool>;

    // 自省一张表的列现状
    fn introspect_columns(&self, name: &str) -> Result<Vec<LiveColumn>>;
}

/// 自省返回的一列现状
#[derive(Clone, Debug, PartialEq)]
pub struct LiveColumn {
    /// 列序号
    pub ordinal: i64,
    /// 列名
    pub name: String,
    /// 物理 SQL 类型文本
    pub sql_type: String,
    /// 非空标记
    pub not_null: bool,
    /// 默认值字面量文本，没有默认值时为 None
    pub default: Option<String>,
    /// 主键标记
    pub primary_key: bool,
}
