mod config;

use crate::db_error::Result;
use std::path::Path;
pub use config::{Config, ConfigWrapper};

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    Config::load_config(path)
}
