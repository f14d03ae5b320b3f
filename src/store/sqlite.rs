use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::debug;

use crate::db_error::{Error, Result};
use crate::store::{LiveColumn, Store};
use crate::types::{quote, Value};

/// rusqlite 连接的包装。
/// 单线程同步阻塞模型：每次调用发出语句并等待存储应答，
/// 本层不做任何加锁、重试或超时，失败原样向上传播。
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// 打开（必要时创建）文件数据库
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| Error::StoreExecution {
            statement: format!("open {}", path.as_ref().display()),
            message: e.to_string(),
        })?;
        Ok(SqliteStore { conn })
    }

    /// 打开内存数据库，连接关闭即消失
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::StoreExecution {
            statement: "open :memory:".to_string(),
            message: e.to_string(),
        })?;
        Ok(SqliteStore { conn })
    }

    fn store_err(statement: &str, err: rusqlite::Error) -> Error {
        Error::StoreExecution {
            statement: statement.to_string(),
            message: err.to_string(),
        }
    }
}

impl Store for SqliteStore {
    fn execute(&self, sql: &str) -> Result<Vec<Vec<Value>>> {
        debug!(%sql, "execute");
        let mut stmt = self.conn.prepare(sql).map_err(|e| Self::store_err(sql, e))?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([]).map_err(|e| Self::store_err(sql, e))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(|e| Self::store_err(sql, e))? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = match row.get_ref(i).map_err(|e| Self::store_err(sql, e))? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(n) => Value::Integer(n),
                    ValueRef::Real(r) => Value::Real(r),
                    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).to_string()),
                    ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).to_string()),
                };
                values.push(value);
            }
            result.push(values);
        }
        Ok(result)
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        let sql = format!("SELECT name FROM sqlite_master WHERE name = {}", quote(name));
        Ok(!self.execute(&sql)?.is_empty())
    }

    fn introspect_columns(&self, name: &str) -> Result<Vec<LiveColumn>> {
        // PRAGMA table_info 行布局: cid, name, type, notnull, dflt_value, pk
        let rows = self.execute(&format!("PRAGMA table_info([{name}])"))?;
        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() < 6 {
                continue;
            }
            columns.push(LiveColumn {
                ordinal: row[0].as_integer().unwrap_or(0),
                name: row[1].as_text().unwrap_or_default().to_string(),
                sql_type: row[2].as_text().unwrap_or_default().to_string(),
                not_null: matches!(row[3], Value::Integer(n) if n != 0),
                default: row[4].as_text().map(|s| s.to_string()),
                primary_key: matches!(row[5], Value::Integer(n) if n != 0),
            });
        }
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_returns_positional_rows() -> Result<()> {
        let store = SqliteStore::open_in_memory()?;
        store.execute("CREATE TABLE t (a INTEGER, b TEXT)")?;
        store.execute("INSERT INTO t (a, b) VALUES (1, 'one')")?;
        store.execute("INSERT INTO t (a, b) VALUES (2, 'two')")?;
        let rows = store.execute("SELECT * FROM t")?;
        assert_eq!(
            rows,
            vec![
                vec![Value::Integer(1), Value::Text("one".into())],
                vec![Value::Integer(2), Value::Text("two".into())],
            ]
        );
        Ok(())
    }

    #[test]
    fn test_failed_statement_carries_sql_text() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.execute("SELECT * FROM missing").unwrap_err();
        match err {
            Error::StoreExecution { statement, .. } => {
                assert_eq!(statement, "SELECT * FROM missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_table_exists() -> Result<()> {
        let store = SqliteStore::open_in_memory()?;
        assert!(!store.table_exists("t")?);
        store.execute("CREATE TABLE t (a INTEGER)")?;
        assert!(store.table_exists("t")?);
        Ok(())
    }

    #[test]
    fn test_introspect_columns() -> Result<()> {
        let store = SqliteStore::open_in_memory()?;
        store.execute(
            "CREATE TABLE t (id INTEGER PRIMARY KEY NOT NULL, name TEXT NOT NULL DEFAULT 'x', note TEXT)",
        )?;
        let columns = store.introspect_columns("t")?;
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "id");
        assert!(columns[0].primary_key);
        assert!(columns[0].not_null);
        assert_eq!(columns[1].sql_type, "TEXT");
        assert_eq!(columns[1].default, Some("'x'".to_string()));
        assert!(!columns[2].not_null);
        assert_eq!(columns[2].default, None);
        Ok(())
    }
}
