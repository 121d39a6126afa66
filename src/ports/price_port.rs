//! Market price provider port trait.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::error::StockfolioError;

/// Source of the latest daily close for a ticker.
///
/// `Ok(None)` means the provider has no data for the symbol. `Err` is a
/// transport or provider failure; callers decide whether that is fatal.
#[async_trait]
pub trait PricePort: Send + Sync {
    async fn latest_close(&self, symbol: &str) -> Result<Option<Decimal>, StockfolioError>;

    /// Identifier used in logs.
    fn name(&self) -> &'static str;
}
