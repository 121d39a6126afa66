//! Portfolio valuation engine.
//!
//! Pure aggregation: the caller supplies the holdings and a price lookup,
//! nothing here reads or writes a store. A symbol with no price degrades only
//! its own holding's snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::holding::{Holding, HoldingId};

/// One holding as seen by a valuation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingSnapshot {
    pub id: HoldingId,
    pub symbol: String,
    pub quantity: i64,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    pub current_price: Option<Decimal>,
    pub market_value: Option<Decimal>,
    /// Market value minus cost basis, when the current price is known.
    pub unrealized_gain: Option<Decimal>,
}

impl HoldingSnapshot {
    /// A value outside the `Decimal` range leaves `market_value` empty.
    fn new(holding: &Holding, current_price: Option<Decimal>) -> Self {
        let quantity = Decimal::from(holding.quantity);
        let market_value = current_price.and_then(|price| quantity.checked_mul(price));
        let unrealized_gain = market_value.and_then(|value| {
            quantity
                .checked_mul(holding.purchase_price)
                .and_then(|cost| value.checked_sub(cost))
        });
        HoldingSnapshot {
            id: holding.id,
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            purchase_price: holding.purchase_price,
            purchase_date: holding.purchase_date,
            current_price,
            market_value,
            unrealized_gain,
        }
    }

    fn drop_value(&mut self) {
        self.market_value = None;
        self.unrealized_gain = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub as_of: NaiveDate,
    pub total_value: Decimal,
    pub priced_count: usize,
    pub unpriced_count: usize,
    pub holdings: Vec<HoldingSnapshot>,
}

impl PortfolioValuation {
    /// `(id, price)` pairs for every holding that resolved a price.
    pub fn resolved_prices(&self) -> Vec<(HoldingId, Decimal)> {
        self.holdings
            .iter()
            .filter_map(|s| s.current_price.map(|price| (s.id, price)))
            .collect()
    }
}

/// Value `holdings` using `lookup` for each symbol, in input order.
pub fn compute_valuation<F>(
    holdings: &[Holding],
    as_of: NaiveDate,
    mut lookup: F,
) -> PortfolioValuation
where
    F: FnMut(&str) -> Option<Decimal>,
{
    let mut total_value = Decimal::ZERO;
    let mut priced_count = 0;
    let mut snapshots = Vec::with_capacity(holdings.len());

    for holding in holdings {
        let mut snapshot = HoldingSnapshot::new(holding, lookup(&holding.symbol));
        if snapshot.current_price.is_some() && snapshot.market_value.is_none() {
            warn!(id = holding.id, symbol = %holding.symbol, "market value overflows, holding left unpriced");
        }
        if let Some(value) = snapshot.market_value {
            match total_value.checked_add(value) {
                Some(total) => {
                    total_value = total;
                    priced_count += 1;
                }
                None => {
                    warn!(id = holding.id, symbol = %holding.symbol, "portfolio total overflows, holding left unpriced");
                    snapshot.drop_value();
                }
            }
        }
        snapshots.push(snapshot);
    }

    PortfolioValuation {
        as_of,
        total_value,
        priced_count,
        unpriced_count: snapshots.len() - priced_count,
        holdings: snapshots,
    }
}
