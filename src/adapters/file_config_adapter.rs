//! INI file configuration adapter.
//!
//! Any key may be overridden from the environment as
//! `STOCKFOLIO_<SECTION>_<KEY>` (upper-cased), so secrets such as the
//! provider API key need not live in the file.

use crate::domain::error::StockfolioError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

const ENV_PREFIX: &str = "STOCKFOLIO";

pub struct FileConfigAdapter {
    config: Ini,
    env_overrides: bool,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockfolioError> {
        let mut config = Ini::new();
        config
            .load(path.as_ref())
            .map_err(|reason| StockfolioError::ConfigParse {
                file: path.as_ref().display().to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            env_overrides: true,
        })
    }

    /// Parse INI text. Environment overrides are off so results depend only
    /// on `content`.
    pub fn from_string(content: &str) -> Result<Self, StockfolioError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| StockfolioError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self {
            config,
            env_overrides: false,
        })
    }

    pub fn env_key(section: &str, key: &str) -> String {
        format!(
            "{ENV_PREFIX}_{}_{}",
            section.to_uppercase(),
            key.to_uppercase()
        )
    }

    fn lookup(&self, section: &str, key: &str) -> Option<String> {
        if self.env_overrides {
            if let Ok(value) = std::env::var(Self::env_key(section, key)) {
                return Some(value);
            }
        }
        self.config.get(section, key)
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.lookup(section, key).filter(|v| !v.trim().is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.lookup(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
