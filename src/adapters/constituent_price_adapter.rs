//! Offline price source backed by the constituents table.
//!
//! Prices are whatever the last CSV import recorded, so valuations are only
//! as fresh as that import. Useful without an API key and in tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::error::StockfolioError;
use crate::ports::constituents_port::ConstituentsPort;
use crate::ports::price_port::PricePort;

pub struct ConstituentPriceAdapter {
    constituents: Arc<dyn ConstituentsPort>,
}

impl ConstituentPriceAdapter {
    pub fn new(constituents: Arc<dyn ConstituentsPort>) -> Self {
        Self { constituents }
    }
}

#[async_trait]
impl PricePort for ConstituentPriceAdapter {
    async fn latest_close(&self, symbol: &str) -> Result<Option<Decimal>, StockfolioError> {
        Ok(self
            .constituents
            .get_constituent(&symbol.to_uppercase())?
            .map(|c| c.price))
    }

    fn name(&self) -> &'static str {
        "constituents"
    }
}
