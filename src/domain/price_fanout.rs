//! Concurrent price resolution for a set of symbols.
//!
//! Each distinct symbol is looked up once, at most `max_concurrency` lookups
//! run at a time, and every lookup has its own timeout. Errors, timeouts and
//! "no data" all collapse to a missing price for that symbol only.

use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use crate::ports::price_port::PricePort;

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutConfig {
    pub max_concurrency: usize,
    pub timeout: Duration,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        FanoutConfig {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// Outcome of a fan-out: every requested symbol maps to its price or `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    prices: HashMap<String, Option<Decimal>>,
}

impl PriceTable {
    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied().flatten()
    }

    /// Number of distinct symbols looked up.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.prices.values().filter(|p| p.is_some()).count()
    }
}

impl Extend<(String, Option<Decimal>)> for PriceTable {
    fn extend<T: IntoIterator<Item = (String, Option<Decimal>)>>(&mut self, iter: T) {
        self.prices.extend(iter);
    }
}

impl FromIterator<(String, Option<Decimal>)> for PriceTable {
    fn from_iter<T: IntoIterator<Item = (String, Option<Decimal>)>>(iter: T) -> Self {
        PriceTable {
            prices: iter.into_iter().collect(),
        }
    }
}

pub async fn resolve_prices<'a, I>(
    port: &dyn PricePort,
    symbols: I,
    config: FanoutConfig,
) -> PriceTable
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let unique: Vec<String> = symbols
        .into_iter()
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect();

    debug!(
        provider = port.name(),
        symbols = unique.len(),
        max_concurrency = config.max_concurrency,
        "resolving prices"
    );

    stream::iter(unique)
        .map(move |symbol| async move {
            let price = lookup_one(port, &symbol, config.timeout).await;
            (symbol, price)
        })
        .buffered(config.max_concurrency.max(1))
        .collect::<PriceTable>()
        .await
}

async fn lookup_one(port: &dyn PricePort, symbol: &str, timeout: Duration) -> Option<Decimal> {
    match tokio::time::timeout(timeout, port.latest_close(symbol)).await {
        Ok(Ok(Some(price))) => Some(price),
        Ok(Ok(None)) => {
            debug!(provider = port.name(), symbol, "no price data");
            None
        }
        Ok(Err(e)) => {
            warn!(provider = port.name(), symbol, error = %e, "price lookup failed");
            None
        }
        Err(_) => {
            warn!(
                provider = port.name(),
                symbol,
                timeout_ms = timeout.as_millis() as u64,
                "price lookup timed out"
            );
            None
        }
    }
}
