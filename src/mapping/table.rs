use std::marker::PhantomData;

use itertools::Itertools;

use crate::db_error::{Error, Result};
use crate::mapping::process::process;
use crate::mapping::reconcile::plan;
use crate::query::Query;
use crate::store::Store;
use crate::types::{encode, Model, Schema};

/// 一张映射表的门面：绑定存储连接、表名和编译好的模式。
/// 构造时创建或对齐物理表，句柄存活期间模式不再变化；
/// 没有隐式清理，物理资源归底层连接所有。
pub struct Table<'a, T: Model> {
    store: &'a dyn Store,
    name: String,
    schema: Schema,
    _model: PhantomData<T>,
}

impl<'a, T: Model> Table<'a, T> {
    /// 打开（必要时创建）映射表，并把现有表结构对齐到当前声明
    pub fn open(store: &'a dyn Store, name: &str) -> Result<Self> {
        Self::open_inner(store, name, true)
    }

    /// 绑定已有表但跳过结构对齐，调用方自己保证结构没变
    pub fn open_unchecked(store: &'a dyn Store, name: &str) -> Result<Self> {
        Self::open_inner(store, name, false)
    }

    fn open_inner(store: &'a dyn Store, name: &str, reconcile: bool) -> Result<Self> {
        let schema = Schema::compile(&T::declaration())?;
        if !store.table_exists(name)? {
            let defs = schema.columns().iter().map(|c| c.sql()).join(", ");
            store.execute(&format!("CREATE TABLE [{name}] ({defs})"))?;
        } else if reconcile {
            let live = store.introspect_columns(name)?;
            for op in plan(&schema, &live)? {
                store
                    .execute(&op.sql(name))
                    .map_err(|e| Error::SchemaReconciliation(e.to_string()))?;
            }
        }
        Ok(Table {
            store,
            name: name.to_string(),
            schema,
            _model: PhantomData,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// 插入一条记录；主键未填充时由存储自行分配
    pub fn insert(&self, object: &T) -> Result<()> {
        let processed = process(&self.schema, &object.to_record());
        let sql = if processed.columns.is_empty() {
            // 没有任何映射上的字段，整行走列默认值
            format!("INSERT INTO [{}] DEFAULT VALUES", self.name)
        } else {
            let columns = processed.columns.iter().map(|c| format!("[{c}]")).join(", ");
            let values = processed.values.iter().map(encode).join(", ");
            format!(
                "INSERT INTO [{}] ({columns}) VALUES ({values})",
                self.name
            )
        };
        self.store.execute(&sql)?;
        Ok(())
    }

    /// 按定位谓词更新行，收录的字段全部写回
    pub fn update(&self, object: &T) -> Result<()> {
        let processed = process(&self.schema, &object.to_record());
        if processed.columns.is_empty() {
            return Err(Error::InvalidQueryUsage(
                "update over a record with no mapped fields".to_string(),
            ));
        }
        let assignments = processed
            .columns
            .iter()
            .zip(&processed.values)
            .map(|(c, v)| format!("[{c}] = {}", encode(v)))
            .join(", ");
        let matcher = processed.identity.to_sql()?;
        self.store.execute(&format!(
            "UPDATE [{}] SET {assignments} WHERE {matcher}",
            self.name
        ))?;
        Ok(())
    }

    /// 给了记录就按定位谓词删，没给就删全表数据
    pub fn delete(&self, object: Option<&T>) -> Result<()> {
        let sql = match object {
            Some(object) => {
                let processed = process(&self.schema, &object.to_record());
                format!("DELETE FROM [{}] WHERE {}", self.name, processed.identity.to_sql()?)
            }
            None => format!("DELETE FROM [{}]", self.name),
        };
        self.store.execute(&sql)?;
        Ok(())
    }

    /// 清空数据但保留表
    pub fn clear(&self) -> Result<()> {
        self.delete(None)
    }

    /// 无过滤查询返回零行即为空
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self
            .store
            .execute(&format!("SELECT * FROM [{}]", self.name))?
            .is_empty())
    }

    /// 开一个绑定到本表的查询构造器，表别名从 [t0] 起
    pub fn select(&self) -> Query<'_, T> {
        Query::new(self.store, &self.schema, &self.name)
    }
}
