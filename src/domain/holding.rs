//! Holding records and the partial-update merge.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::StockfolioError;

pub type HoldingId = i64;

/// A recorded position in one ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: HoldingId,
    pub symbol: String,
    pub quantity: i64,
    pub purchase_price: Decimal,
    pub current_price: Option<Decimal>,
    pub purchase_date: NaiveDate,
}

/// Fields accepted when creating a holding. The store assigns the id and
/// `current_price` starts empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHolding {
    pub symbol: String,
    pub quantity: i64,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
}

/// Partial update: only the fields that are `Some` replace stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingUpdate {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub purchase_price: Option<Decimal>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
}

impl HoldingUpdate {
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.quantity.is_none()
            && self.purchase_price.is_none()
            && self.purchase_date.is_none()
    }

    /// Merge this update onto `holding`, returning a new record.
    pub fn apply(&self, holding: &Holding) -> Holding {
        Holding {
            id: holding.id,
            symbol: self
                .symbol
                .clone()
                .unwrap_or_else(|| holding.symbol.clone()),
            quantity: self.quantity.unwrap_or(holding.quantity),
            purchase_price: self.purchase_price.unwrap_or(holding.purchase_price),
            current_price: holding.current_price,
            purchase_date: self.purchase_date.unwrap_or(holding.purchase_date),
        }
    }

    /// Validate and normalise the supplied fields. Symbol resolution against
    /// the price provider is the service's job.
    pub fn validated(mut self) -> Result<Self, StockfolioError> {
        if let Some(symbol) = self.symbol.take() {
            self.symbol = Some(normalize_symbol(&symbol)?);
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(price) = self.purchase_price {
            validate_purchase_price(price)?;
        }
        Ok(self)
    }
}

impl NewHolding {
    /// Validate and normalise every field except symbol resolution.
    pub fn validated(self) -> Result<Self, StockfolioError> {
        validate_quantity(self.quantity)?;
        validate_purchase_price(self.purchase_price)?;
        Ok(NewHolding {
            symbol: normalize_symbol(&self.symbol)?,
            ..self
        })
    }
}

/// Trim and upper-case a ticker. Empty tickers are rejected.
pub fn normalize_symbol(symbol: &str) -> Result<String, StockfolioError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(StockfolioError::invalid("symbol must not be empty"));
    }
    Ok(trimmed.to_uppercase())
}

pub fn validate_quantity(quantity: i64) -> Result<(), StockfolioError> {
    if quantity <= 0 {
        return Err(StockfolioError::invalid(format!(
            "quantity must be a positive integer, got {quantity}"
        )));
    }
    Ok(())
}

pub fn validate_purchase_price(price: Decimal) -> Result<(), StockfolioError> {
    if price < Decimal::ZERO {
        return Err(StockfolioError::invalid(format!(
            "purchase_price must be non-negative, got {price}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_holding() -> Holding {
        Holding {
            id: 7,
            symbol: "AAPL".into(),
            quantity: 10,
            purchase_price: dec!(150.25),
            current_price: Some(dec!(180.10)),
            purchase_date: NaiveDate::from_ymd_opt(2024, 4, 18).unwrap(),
        }
    }

    #[test]
    fn apply_changes_only_supplied_fields() {
        let holding = sample_holding();
        let update = HoldingUpdate {
            symbol: Some("MSFT".into()),
            ..Default::default()
        };

        let merged = update.apply(&holding);

        assert_eq!(merged.symbol, "MSFT");
        assert_eq!(merged.id, holding.id);
        assert_eq!(merged.quantity, holding.quantity);
        assert_eq!(merged.purchase_price, holding.purchase_price);
        assert_eq!(merged.current_price, holding.current_price);
        assert_eq!(merged.purchase_date, holding.purchase_date);
    }

    #[test]
    fn apply_does_not_touch_original() {
        let holding = sample_holding();
        let before = holding.clone();
        let update = HoldingUpdate {
            quantity: Some(99),
            purchase_price: Some(dec!(1)),
            ..Default::default()
        };

        let merged = update.apply(&holding);

        assert_eq!(holding, before);
        assert_eq!(merged.quantity, 99);
        assert_eq!(merged.purchase_price, dec!(1));
    }

    #[test]
    fn empty_update_is_identity() {
        let holding = sample_holding();
        let update = HoldingUpdate::default();
        assert!(update.is_empty());
        assert_eq!(update.apply(&holding), holding);
    }

    #[test]
    fn normalize_symbol_trims_and_uppercases() {
        assert_eq!(normalize_symbol("  msft ").unwrap(), "MSFT");
    }

    #[test]
    fn normalize_symbol_rejects_blank() {
        assert!(matches!(
            normalize_symbol("   "),
            Err(StockfolioError::InvalidInput { .. })
        ));
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn purchase_price_may_be_zero_but_not_negative() {
        assert!(validate_purchase_price(dec!(0)).is_ok());
        assert!(validate_purchase_price(dec!(-0.01)).is_err());
    }

    #[test]
    fn new_holding_validated_normalizes_symbol() {
        let new = NewHolding {
            symbol: "aapl".into(),
            quantity: 3,
            purchase_price: dec!(10),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        assert_eq!(new.validated().unwrap().symbol, "AAPL");
    }

    #[test]
    fn update_validated_rejects_zero_quantity() {
        let update = HoldingUpdate {
            quantity: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            update.validated(),
            Err(StockfolioError::InvalidInput { .. })
        ));
    }

    #[test]
    fn update_deserializes_with_missing_fields() {
        let update: HoldingUpdate = serde_json::from_str(r#"{"quantity": 4}"#).unwrap();
        assert_eq!(update.quantity, Some(4));
        assert!(update.symbol.is_none());
        assert!(update.purchase_price.is_none());
        assert!(update.purchase_date.is_none());
    }
}
