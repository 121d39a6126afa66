//! Configuration access port trait.

use crate::domain::error::StockfolioError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Like `get_string`, but a missing key is an error.
    fn require_string(&self, section: &str, key: &str) -> Result<String, StockfolioError> {
        self.get_string(section, key)
            .ok_or_else(|| StockfolioError::ConfigMissing {
                section: section.into(),
                key: key.into(),
            })
    }
}
