//! S&P 500 constituent reference rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    /// Last price recorded in the dataset, in USD.
    pub price: Decimal,
    pub price_earnings: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub earnings_share: Option<f64>,
    pub week_low_52: Option<f64>,
    pub week_high_52: Option<f64>,
    pub market_cap: Option<i64>,
    pub ebitda: Option<i64>,
    pub price_sales: Option<f64>,
    pub price_book: Option<f64>,
    pub sec_filings: Option<String>,
}

impl Constituent {
    pub fn new(symbol: &str, name: &str, sector: &str, price: Decimal) -> Self {
        Constituent {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector: sector.to_string(),
            price,
            price_earnings: None,
            dividend_yield: None,
            earnings_share: None,
            week_low_52: None,
            week_high_52: None,
            market_cap: None,
            ebitda: None,
            price_sales: None,
            price_book: None,
            sec_filings: None,
        }
    }
}
