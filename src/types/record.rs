use serde::{Deserialize, Serialize};

use crate::db_error::Result;
use crate::types::schema::FieldDecl;
use crate::types::value::Value;

/// 一行解码后的数据：列名到值的有序映射。
/// 代替源系统里动态属性对象的角色，迭代顺序即插入顺序。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// 设置一个字段，同名覆盖
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 映射记录类型的注册接口。
/// 字段声明在编译期给出一次，运行期不再内省对象。
pub trait Model: Sized {
    /// 该记录类型的字段声明，顺序即列顺序
    fn declaration() -> Vec<FieldDecl>;

    /// 对象 -> 记录，未填充的字段用 Null 表示
    fn to_record(&self) -> Record;

    /// 记录 -> 对象
    fn from_record(record: &Record) -> Result<Self>;
}
