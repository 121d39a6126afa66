#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stockfolio::domain::error::StockfolioError;
use stockfolio::domain::holding::NewHolding;
use stockfolio::domain::price_fanout::FanoutConfig;
use stockfolio::domain::service::ServiceSettings;
use stockfolio::ports::price_port::PricePort;

/// Price provider with canned answers. Symbols not configured have no data.
#[derive(Default)]
pub struct MockPricePort {
    pub prices: HashMap<String, Decimal>,
    pub errors: HashMap<String, String>,
    pub slow: HashSet<String>,
    pub delay: Duration,
    pub calls: Mutex<Vec<String>>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    /// `symbol` answers only after `delay`.
    pub fn with_slow(mut self, symbol: &str, delay: Duration) -> Self {
        self.slow.insert(symbol.to_string());
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PricePort for MockPricePort {
    async fn latest_close(&self, symbol: &str) -> Result<Option<Decimal>, StockfolioError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        if self.slow.contains(symbol) {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockfolioError::PriceProvider {
                reason: reason.clone(),
            });
        }
        Ok(self.prices.get(symbol).copied())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn new_holding(symbol: &str, quantity: i64, purchase_price: Decimal) -> NewHolding {
    NewHolding {
        symbol: symbol.to_string(),
        quantity,
        purchase_price,
        purchase_date: date(2024, 1, 15),
    }
}

/// Settings with a short lookup timeout so slow-provider tests stay fast.
pub fn test_settings() -> ServiceSettings {
    ServiceSettings {
        fanout: FanoutConfig {
            max_concurrency: 4,
            timeout: Duration::from_millis(200),
        },
        ..ServiceSettings::default()
    }
}

#[cfg(feature = "sqlite")]
pub fn memory_store() -> Arc<stockfolio::adapters::sqlite_adapter::SqliteAdapter> {
    let store = stockfolio::adapters::sqlite_adapter::SqliteAdapter::in_memory().unwrap();
    store.initialize_schema().unwrap();
    Arc::new(store)
}

#[cfg(feature = "sqlite")]
pub fn service_with(
    prices: MockPricePort,
) -> (
    stockfolio::domain::service::HoldingService,
    Arc<stockfolio::adapters::sqlite_adapter::SqliteAdapter>,
    Arc<MockPricePort>,
) {
    let store = memory_store();
    let prices = Arc::new(prices);
    let service = stockfolio::domain::service::HoldingService::new(
        store.clone(),
        prices.clone(),
        test_settings(),
    );
    (service, store, prices)
}
