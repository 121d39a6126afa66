//! Reference data port for index constituents.

use crate::domain::constituent::Constituent;
use crate::domain::error::StockfolioError;

pub trait ConstituentsPort: Send + Sync {
    /// Insert or replace every row, in one transaction. Returns rows written.
    fn upsert_constituents(&self, rows: &[Constituent]) -> Result<usize, StockfolioError>;

    fn get_constituent(&self, symbol: &str) -> Result<Option<Constituent>, StockfolioError>;

    fn count_constituents(&self) -> Result<usize, StockfolioError>;
}
