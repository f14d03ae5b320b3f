use serde::{Deserialize, Serialize};

/// 自定义错误信息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// 字段的声明类型无法映射为物理列类型，携带字段名
    UnsupportedColumnType(String),
    /// 非法的列声明：重复主键、重名列
    InvalidColumns(String),
    /// 表结构对齐时 ADD/DROP COLUMN 语句执行失败
    SchemaReconciliation(String),
    /// 预期保存 JSON 内容的 TEXT 列解析失败，属于数据损坏
    MalformedComposite(String),
    /// 查询构造器在不支持的状态上被调用，属于调用方错误
    InvalidQueryUsage(String),
    /// 底层存储拒绝执行语句，原样携带出错的语句文本
    StoreExecution { statement: String, message: String },
    /// 文件IO错误
    IO(String),
    /// 配置错误
    ConfigError(String),
}

/// 自定义错误类型
pub type Result<T> = std::result::Result<T, Error>;

/// 实现标准库std::error::Error特征
impl std::error::Error for Error {}

/// 实现格式输出
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::UnsupportedColumnType(field) => {
                write!(f, "unsupported column type for field: {field}")
            }
            Error::InvalidColumns(msg) => write!(f, "invalid columns: {msg}"),
            Error::SchemaReconciliation(msg) => write!(f, "schema reconciliation failed: {msg}"),
            Error::MalformedComposite(msg) => write!(f, "malformed composite value: {msg}"),
            Error::InvalidQueryUsage(msg) => write!(f, "invalid query usage: {msg}"),
            Error::StoreExecution { statement, message } => {
                write!(f, "store rejected statement `{statement}`: {message}")
            }
            Error::IO(msg) => write!(f, "io error: {msg}"),
            Error::ConfigError(msg) => write!(f, "error: config error:{msg}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_statement() {
        let err = Error::StoreExecution {
            statement: "SELECT * FROM missing".to_string(),
            message: "no such table: missing".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("SELECT * FROM missing"));
        assert!(text.contains("no such table"));
    }
}
