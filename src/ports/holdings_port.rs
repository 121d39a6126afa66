//! Holdings store port trait.

use crate::domain::error::StockfolioError;
use crate::domain::holding::{Holding, HoldingId, HoldingUpdate, NewHolding};
use rust_decimal::Decimal;

/// Persistence for holdings. The store owns ids and all persisted state.
pub trait HoldingsPort: Send + Sync {
    /// One page of holdings (ascending id) and the total number stored.
    fn list(&self, offset: usize, limit: usize) -> Result<(Vec<Holding>, usize), StockfolioError>;

    /// Every holding, ascending id.
    fn all(&self) -> Result<Vec<Holding>, StockfolioError>;

    fn get(&self, id: HoldingId) -> Result<Option<Holding>, StockfolioError>;

    fn create(&self, holding: &NewHolding) -> Result<Holding, StockfolioError>;

    /// Apply a partial update. `Ok(None)` when the id does not exist.
    fn update(
        &self,
        id: HoldingId,
        update: &HoldingUpdate,
    ) -> Result<Option<Holding>, StockfolioError>;

    /// `Ok(false)` when the id does not exist.
    fn delete(&self, id: HoldingId) -> Result<bool, StockfolioError>;

    /// Overwrite `current_price` for each id, last write wins. Returns the
    /// number of rows touched.
    fn set_current_prices(
        &self,
        prices: &[(HoldingId, Decimal)],
    ) -> Result<usize, StockfolioError>;
}
