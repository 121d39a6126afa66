//! Holding operations: store and price provider wired together.
//!
//! Every API and CLI entry point goes through [`HoldingService`], which owns
//! validation, the list access check and the valuation pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::StockfolioError;
use super::holding::{Holding, HoldingId, HoldingUpdate, NewHolding};
use super::price_fanout::{FanoutConfig, resolve_prices};
use super::valuation::{PortfolioValuation, compute_valuation};
use crate::ports::holdings_port::HoldingsPort;
use crate::ports::price_port::PricePort;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 1000;

/// Privilege of the caller. Only superusers may list all holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    Superuser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    pub fanout: FanoutConfig,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            fanout: FanoutConfig::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsPage {
    pub data: Vec<Holding>,
    pub count: usize,
}

pub struct HoldingService {
    holdings: Arc<dyn HoldingsPort>,
    prices: Arc<dyn PricePort>,
    settings: ServiceSettings,
}

impl HoldingService {
    pub fn new(
        holdings: Arc<dyn HoldingsPort>,
        prices: Arc<dyn PricePort>,
        settings: ServiceSettings,
    ) -> Self {
        HoldingService {
            holdings,
            prices,
            settings,
        }
    }

    pub fn list(
        &self,
        role: Role,
        skip: Option<usize>,
        limit: Option<usize>,
    ) -> Result<HoldingsPage, StockfolioError> {
        if role != Role::Superuser {
            return Err(StockfolioError::Forbidden {
                reason: "Insufficient permissions".into(),
            });
        }
        let limit = limit
            .unwrap_or(self.settings.default_page_size)
            .clamp(1, self.settings.max_page_size.max(1));
        let (data, count) = self.holdings.list(skip.unwrap_or(0), limit)?;
        Ok(HoldingsPage { data, count })
    }

    pub fn get(&self, id: HoldingId) -> Result<Holding, StockfolioError> {
        self.holdings
            .get(id)?
            .ok_or_else(|| StockfolioError::holding_not_found(id))
    }

    pub async fn create(&self, new: NewHolding) -> Result<Holding, StockfolioError> {
        let new = new.validated()?;
        self.ensure_symbol_resolves(&new.symbol).await?;
        let created = self.holdings.create(&new)?;
        info!(id = created.id, symbol = %created.symbol, "holding created");
        Ok(created)
    }

    /// Partial update. A changed symbol is re-validated against the provider
    /// the same way creation is.
    pub async fn update(
        &self,
        id: HoldingId,
        update: HoldingUpdate,
    ) -> Result<Holding, StockfolioError> {
        let existing = self.get(id)?;
        let update = update.validated()?;

        if let Some(symbol) = update.symbol.as_deref() {
            if symbol != existing.symbol {
                self.ensure_symbol_resolves(symbol).await?;
            }
        }
        if update.is_empty() {
            return Ok(existing);
        }

        let updated = self
            .holdings
            .update(id, &update)?
            .ok_or_else(|| StockfolioError::holding_not_found(id))?;
        info!(id, "holding updated");
        Ok(updated)
    }

    pub fn delete(&self, id: HoldingId) -> Result<(), StockfolioError> {
        if !self.holdings.delete(id)? {
            return Err(StockfolioError::holding_not_found(id));
        }
        info!(id, "holding deleted");
        Ok(())
    }

    /// Value every stored holding at live prices. Lookup failures degrade
    /// individual holdings; only store errors fail the call.
    pub async fn valuation(&self, as_of: NaiveDate) -> Result<PortfolioValuation, StockfolioError> {
        let holdings = self.holdings.all()?;
        let table = resolve_prices(
            self.prices.as_ref(),
            holdings.iter().map(|h| h.symbol.as_str()),
            self.settings.fanout,
        )
        .await;

        let valuation = compute_valuation(&holdings, as_of, |symbol| table.get(symbol));
        if valuation.unpriced_count > 0 {
            warn!(
                unpriced = valuation.unpriced_count,
                priced = valuation.priced_count,
                "valuation has holdings without a price"
            );
        }
        info!(
            %as_of,
            total_value = %valuation.total_value,
            holdings = valuation.holdings.len(),
            "valuation computed"
        );
        Ok(valuation)
    }

    /// Compute a valuation and store each resolved price as the holding's
    /// `current_price`. Unpriced holdings keep their stored value.
    pub async fn refresh_and_save(
        &self,
        as_of: NaiveDate,
    ) -> Result<PortfolioValuation, StockfolioError> {
        let valuation = self.valuation(as_of).await?;
        let written = self
            .holdings
            .set_current_prices(&valuation.resolved_prices())?;
        info!(written, "current prices saved");
        Ok(valuation)
    }

    async fn ensure_symbol_resolves(&self, symbol: &str) -> Result<(), StockfolioError> {
        let timeout = self.settings.fanout.timeout;
        let lookup = tokio::time::timeout(timeout, self.prices.latest_close(symbol))
            .await
            .map_err(|_| StockfolioError::PriceProvider {
                reason: format!(
                    "lookup for {symbol} timed out after {}ms",
                    timeout.as_millis()
                ),
            })??;

        match lookup {
            Some(_) => Ok(()),
            None => Err(StockfolioError::invalid(format!(
                "unknown symbol {symbol}: no price data available"
            ))),
        }
    }
}
