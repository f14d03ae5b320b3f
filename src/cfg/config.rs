use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::db_error::Result;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConfigWrapper {
    pub config: Config,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    // 数据库文件路径
    pub database_path: PathBuf,

    // 日志过滤表达式，交给 tracing-subscriber 的 EnvFilter
    pub log_filter: String,
}

pub struct ConfigBuilder {
    pub inner: Config,
}

#[allow(dead_code)]
impl ConfigBuilder {
    fn database_path(mut self, path: PathBuf) -> Self {
        self.inner.database_path = path;
        self
    }

    fn log_filter(mut self, filter: &str) -> Self {
        self.inner.log_filter = filter.to_string();
        self
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    pub fn build(self) -> Result<Config> {
        self.validate()?;
        Ok(self.inner)
    }
}

impl Config {
    pub fn builder<P: Into<PathBuf>>(database_path: P) -> ConfigBuilder {
        ConfigBuilder {
            inner: Config {
                database_path: database_path.into(),
                ..Default::default()
            },
        }
    }

    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
        // 1、读取配置文件
        let content = std::fs::read_to_string(path)?;
        // 2、解析配置文件
        let wrapper: ConfigWrapper = toml::from_str(&content)?;
        // 3、返回实际的配置
        Ok(wrapper.config)
    }
}
