use serde::{Deserialize, Serialize};

use crate::db_error::{Error, Result};
use crate::types::value::{encode, ColumnType, Value};

/// 字段声明时的名义类型。
/// `Boolean` 与 `Bytes` 可以声明但没有物理列映射，编译时报错。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Integer,
    Float,
    Text,
    /// 映射形态的复合字段，落盘为 TEXT + JSON 语义
    Map,
    /// 列表形态的复合字段，落盘为 TEXT + JSON 语义
    List,
    Boolean,
    Bytes,
}

impl FieldType {
    /// 名义类型到物理列类型的映射
    fn column_type(self) -> Option<ColumnType> {
        match self {
            FieldType::Integer => Some(ColumnType::Integer),
            FieldType::Float => Some(ColumnType::Real),
            FieldType::Text => Some(ColumnType::Text),
            FieldType::Map | FieldType::List => Some(ColumnType::Json),
            FieldType::Boolean | FieldType::Bytes => None,
        }
    }
}

/// 一个字段的声明式描述，代替对活对象的运行期反射。
/// 每个映射记录类型通过 `Model::declaration` 注册一次。
/// - primary_key: 主键标记
/// - nullable: 可空标记，对主键无效
/// - default: 字段声明的默认值
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub field_type: FieldType,
    pub primary_key: bool,
    pub nullable: bool,
    pub default: Option<Value>,
}

impl FieldDecl {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        FieldDecl {
            name: name.to_string(),
            field_type,
            primary_key: false,
            nullable: false,
            default: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// 编译后的列定义，从字段声明推导，算出后不再变化
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub not_null: bool,
    pub default: Option<Value>,
}

impl ColumnDef {
    /// 建表/加列使用的完整列定义文本
    pub fn sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.column_type.sql_type());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&encode(default));
        }
        sql
    }
}

/// 表模式：列定义的有序集合。
/// 顺序即声明顺序，结果行按位置与该顺序配对物化。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// 把一组字段声明编译为表模式
    /// - 主键标记 => primary_key 且强制非空
    /// - 可空标记 => not_null = false
    /// - 无物理映射的声明类型 => UnsupportedColumnType
    /// - 重名列或多个主键 => InvalidColumns
    pub fn compile(declaration: &[FieldDecl]) -> Result<Schema> {
        let mut columns: Vec<ColumnDef> = Vec::with_capacity(declaration.len());
        for decl in declaration {
            let column_type = decl
                .field_type
                .column_type()
                .ok_or_else(|| Error::UnsupportedColumnType(decl.name.clone()))?;
            if columns.iter().any(|c| c.name == decl.name) {
                return Err(Error::InvalidColumns(format!(
                    "duplicate column: {}",
                    decl.name
                )));
            }
            if decl.primary_key && columns.iter().any(|c| c.primary_key) {
                return Err(Error::InvalidColumns(format!(
                    "more than one primary key: {}",
                    decl.name
                )));
            }
            columns.push(ColumnDef {
                name: decl.name.clone(),
                column_type,
                primary_key: decl.primary_key,
                // 主键强制非空，可空标记对主键无效
                not_null: decl.primary_key || !decl.nullable,
                default: decl.default.clone(),
            });
        }
        Ok(Schema { columns })
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message_declaration() -> Vec<FieldDecl> {
        vec![
            FieldDecl::new("id", FieldType::Integer).primary_key(),
            FieldDecl::new("message", FieldType::Text).default_value("Enter a message!"),
            FieldDecl::new("attributes", FieldType::Map).default_value(json!({})),
            FieldDecl::new("creator", FieldType::Text).nullable(),
            FieldDecl::new("viewers", FieldType::List).default_value(json!([])),
        ]
    }

    #[test]
    fn test_compile_keeps_declaration_order() -> crate::db_error::Result<()> {
        let schema = Schema::compile(&message_declaration())?;
        let names: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "message", "attributes", "creator", "viewers"]);
        Ok(())
    }

    /// 同一份声明两次编译出完全相同的模式
    #[test]
    fn test_compile_is_deterministic() -> crate::db_error::Result<()> {
        let first = Schema::compile(&message_declaration())?;
        let second = Schema::compile(&message_declaration())?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_primary_key_forces_not_null() -> crate::db_error::Result<()> {
        let schema = Schema::compile(&[
            FieldDecl::new("id", FieldType::Integer).primary_key().nullable()
        ])?;
        let id = schema.get("id").unwrap();
        assert!(id.primary_key);
        assert!(id.not_null);
        Ok(())
    }

    #[test]
    fn test_nullable_marker_clears_not_null() -> crate::db_error::Result<()> {
        let schema = Schema::compile(&message_declaration())?;
        assert!(!schema.get("creator").unwrap().not_null);
        assert!(schema.get("message").unwrap().not_null);
        Ok(())
    }

    #[test]
    fn test_composite_fields_map_to_json_over_text() -> crate::db_error::Result<()> {
        let schema = Schema::compile(&message_declaration())?;
        let attributes = schema.get("attributes").unwrap();
        assert_eq!(attributes.column_type, ColumnType::Json);
        assert_eq!(attributes.column_type.sql_type(), "TEXT");
        Ok(())
    }

    #[test]
    fn test_unsupported_type_names_the_field() {
        let err = Schema::compile(&[FieldDecl::new("raw", FieldType::Bytes)]).unwrap_err();
        assert_eq!(err, Error::UnsupportedColumnType("raw".to_string()));
        let err = Schema::compile(&[FieldDecl::new("flag", FieldType::Boolean)]).unwrap_err();
        assert_eq!(err, Error::UnsupportedColumnType("flag".to_string()));
    }

    #[test]
    fn test_two_primary_keys_rejected() {
        let err = Schema::compile(&[
            FieldDecl::new("a", FieldType::Integer).primary_key(),
            FieldDecl::new("b", FieldType::Integer).primary_key(),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidColumns(_)));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Schema::compile(&[
            FieldDecl::new("a", FieldType::Integer),
            FieldDecl::new("a", FieldType::Text),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidColumns(_)));
    }

    #[test]
    fn test_column_definition_text() -> crate::db_error::Result<()> {
        let schema = Schema::compile(&message_declaration())?;
        assert_eq!(schema.get("id").unwrap().sql(), "id INTEGER PRIMARY KEY NOT NULL");
        assert_eq!(
            schema.get("message").unwrap().sql(),
            "message TEXT NOT NULL DEFAULT 'Enter a message!'"
        );
        assert_eq!(schema.get("creator").unwrap().sql(), "creator TEXT");
        assert_eq!(
            schema.get("viewers").unwrap().sql(),
            "viewers TEXT NOT NULL DEFAULT '[]'"
        );
        Ok(())
    }
}
