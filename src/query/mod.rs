//! # 查询构造器模块概览
//!
//! 链式的 SELECT/WHERE/ORDER BY 构造器，建模为一个小状态机：
//! `Query -> WhereClause -> Operand -> Comparator -> Groupable`，
//! 每个状态类型只暴露从该状态出发合法的操作，
//! 非法的调用序列（例如在 `Groupable` 上再开 WHERE）在编译期就不成立，
//! 而不是留到运行期打一条 INVALID 诊断。
//!
//! 内部状态是主干 SQL 文本加一个待定子句缓冲：
//! - `group()` 把缓冲整体加括号后并入主干；
//! - `distinct` / `order_by` / `to_list` 隐式地把缓冲不加括号并入；
//! - `order_by` 把当前查询整体包成带递增别名的子查询再排序，
//!   从而不需要在子句之间做优先级推理。
//!
//! 谓词一次性消费成字面量 SQL 文本，不跨查询复用。

use std::marker::PhantomData;

use crate::db_error::Result;
use crate::store::Store;
use crate::types::{decode, encode, Model, Record, Schema, Value};

/// 积累中的查询状态：主干 SQL + 待定子句缓冲 + 子查询别名计数
struct QueryBuf {
    sql: String,
    group: String,
    table_no: usize,
}

impl QueryBuf {
    fn append(&mut self, fragment: &str) {
        self.sql.push(' ');
        self.sql.push_str(fragment);
    }

    fn append_to_group(&mut self, fragment: &str) {
        self.group.push(' ');
        self.group.push_str(fragment);
    }

    /// 把待定缓冲不加括号并入主干
    fn flush(&mut self) {
        if !self.group.is_empty() {
            let pending = self.group.trim().to_string();
            self.append(&pending);
            self.group.clear();
        }
    }

    /// 当前查询文本，含未并入的缓冲
    fn rendered(&self) -> String {
        if self.group.is_empty() {
            self.sql.clone()
        } else {
            format!("{} {}", self.sql, self.group.trim())
        }
    }
}

/// SELECT 基态
pub struct Query<'a, T: Model> {
    store: &'a dyn Store,
    schema: &'a Schema,
    buf: QueryBuf,
    _model: PhantomData<T>,
}

impl<'a, T: Model> Query<'a, T> {
    pub(crate) fn new(store: &'a dyn Store, schema: &'a Schema, table: &str) -> Self {
        Query {
            store,
            schema,
            buf: QueryBuf {
                sql: format!("SELECT * FROM [{table}] AS [t0]"),
                group: String::new(),
                table_no: 0,
            },
            _model: PhantomData,
        }
    }

    /// 当前查询文本
    pub fn sql(&self) -> String {
        self.buf.rendered()
    }

    /// 把 SELECT 原地改写为 SELECT DISTINCT
    pub fn distinct(mut self) -> Self {
        self.buf.flush();
        if let Some(rest) = self.buf.sql.strip_prefix("SELECT ") {
            if !rest.starts_with("DISTINCT") {
                self.buf.sql = format!("SELECT DISTINCT {rest}");
            }
        }
        self
    }

    /// 进入 WHERE 子句
    pub fn where_(mut self) -> WhereClause<'a, T> {
        self.buf.append("WHERE");
        WhereClause { query: self }
    }

    /// 把当前查询整体包成子查询再 ORDER BY，
    /// 别名计数递增，排序列按新别名限定
    pub fn order_by(mut self, column: &str, descending: bool) -> Self {
        self.buf.flush();
        self.buf.table_no += 1;
        let n = self.buf.table_no;
        let direction = if descending { "DESC" } else { "ASC" };
        self.buf.sql = format!(
            "SELECT * FROM (\n\t{}\n) AS [t{n}] ORDER BY [t{n}].[{column}] {direction}",
            self.buf.sql
        );
        self
    }

    /// 唯一会执行的终结操作：发出 SQL，
    /// 每一行按模式列序与位置配对、逐值解码后物化为记录
    pub fn to_list(mut self) -> Result<Vec<T>> {
        self.buf.flush();
        let rows = self.store.execute(&self.buf.sql)?;
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = Record::new();
            for (def, raw) in self.schema.columns().iter().zip(row) {
                record.set(&def.name, decode(raw, def.column_type, false)?);
            }
            result.push(T::from_record(&record)?);
        }
        Ok(result)
    }
}

/// WHERE 之后、左操作数之前的状态
pub struct WhereClause<'a, T: Model> {
    query: Query<'a, T>,
}

impl<'a, T: Model> WhereClause<'a, T> {
    pub fn sql(&self) -> String {
        self.query.sql()
    }

    /// 左操作数：按当前表别名限定的列引用
    pub fn column(mut self, name: &str) -> Operand<'a, T> {
        let n = self.query.buf.table_no;
        self.query.buf.append_to_group(&format!("[t{n}].[{name}]"));
        Operand { query: self.query }
    }

    /// 左操作数：编码后的字面量
    pub fn value(mut self, value: impl Into<Value>) -> Operand<'a, T> {
        let literal = encode(&value.into());
        self.query.buf.append_to_group(&literal);
        Operand { query: self.query }
    }
}

/// 左操作数就位，等待比较运算符
pub struct Operand<'a, T: Model> {
    query: Query<'a, T>,
}

impl<'a, T: Model> Operand<'a, T> {
    fn op(mut self, op: &str) -> Comparator<'a, T> {
        self.query.buf.append_to_group(op);
        Comparator { query: self.query }
    }

    pub fn equals(self) -> Comparator<'a, T> {
        self.op("=")
    }

    pub fn less_than(self) -> Comparator<'a, T> {
        self.op("<")
    }

    pub fn less_than_equal(self) -> Comparator<'a, T> {
        self.op("<=")
    }

    pub fn greater_than(self) -> Comparator<'a, T> {
        self.op(">")
    }

    pub fn greater_than_equal(self) -> Comparator<'a, T> {
        self.op(">=")
    }
}

/// 比较运算符就位，等待右操作数
pub struct Comparator<'a, T: Model> {
    query: Query<'a, T>,
}

impl<'a, T: Model> Comparator<'a, T> {
    /// 右操作数列引用不做别名限定
    pub fn column(mut self, name: &str) -> Groupable<'a, T> {
        self.query.buf.append_to_group(name);
        Groupable { query: self.query }
    }

    pub fn value(mut self, value: impl Into<Value>) -> Groupable<'a, T> {
        let literal = encode(&value.into());
        self.query.buf.append_to_group(&literal);
        Groupable { query: self.query }
    }
}

/// 一个完整谓词之后的状态：可以分组、续接布尔连接词，
/// 或直接走任意终结操作。不暴露 `where_()`。
pub struct Groupable<'a, T: Model> {
    query: Query<'a, T>,
}

impl<'a, T: Model> Groupable<'a, T> {
    pub fn sql(&self) -> String {
        self.query.sql()
    }

    /// 把积累的谓词缓冲整体加括号并入主干
    pub fn group(mut self) -> Self {
        let pending = self.query.buf.group.trim().to_string();
        if !pending.is_empty() {
            self.query.buf.append(&format!("({pending})"));
            self.query.buf.group.clear();
        }
        self
    }

    /// 续接 AND，回到 WHERE 态挂下一个谓词
    pub fn and(mut self) -> WhereClause<'a, T> {
        self.query.buf.append_to_group("AND");
        WhereClause { query: self.query }
    }

    /// 续接 OR
    pub fn or(mut self) -> WhereClause<'a, T> {
        self.query.buf.append_to_group("OR");
        WhereClause { query: self.query }
    }

    pub fn distinct(self) -> Query<'a, T> {
        self.query.distinct()
    }

    pub fn order_by(self, column: &str, descending: bool) -> Query<'a, T> {
        self.query.order_by(column, descending)
    }

    pub fn to_list(self) -> Result<Vec<T>> {
        self.query.to_list()
    }
}
