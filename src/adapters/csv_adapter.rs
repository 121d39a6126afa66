//! Constituents CSV reader.
//!
//! Expects the column layout of the public S&P 500
//! `constituents-financials.csv` dataset. Empty cells become `None`.

use crate::domain::constituent::Constituent;
use crate::domain::error::StockfolioError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct ConstituentRecord {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Sector")]
    sector: String,
    #[serde(rename = "Price")]
    price: String,
    #[serde(rename = "Price/Earnings", default)]
    price_earnings: Option<f64>,
    #[serde(rename = "Dividend Yield", default)]
    dividend_yield: Option<f64>,
    #[serde(rename = "Earnings/Share", default)]
    earnings_share: Option<f64>,
    #[serde(rename = "52 Week Low", default)]
    week_low_52: Option<f64>,
    #[serde(rename = "52 Week High", default)]
    week_high_52: Option<f64>,
    #[serde(rename = "Market Cap", default)]
    market_cap: Option<i64>,
    #[serde(rename = "EBITDA", default)]
    ebitda: Option<i64>,
    #[serde(rename = "Price/Sales", default)]
    price_sales: Option<f64>,
    #[serde(rename = "Price/Book", default)]
    price_book: Option<f64>,
    #[serde(rename = "SEC Filings", default)]
    sec_filings: Option<String>,
}

impl ConstituentRecord {
    fn into_constituent(self, line: u64) -> Result<Constituent, StockfolioError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(StockfolioError::Csv {
                reason: format!("line {line}: empty Symbol"),
            });
        }
        let price = Decimal::from_str(self.price.trim()).map_err(|e| StockfolioError::Csv {
            reason: format!("line {line}: invalid Price '{}': {e}", self.price),
        })?;

        Ok(Constituent {
            symbol,
            name: self.name.trim().to_string(),
            sector: self.sector.trim().to_string(),
            price,
            price_earnings: self.price_earnings,
            dividend_yield: self.dividend_yield,
            earnings_share: self.earnings_share,
            week_low_52: self.week_low_52,
            week_high_52: self.week_high_52,
            market_cap: self.market_cap,
            ebitda: self.ebitda,
            price_sales: self.price_sales,
            price_book: self.price_book,
            sec_filings: self.sec_filings.filter(|s| !s.trim().is_empty()),
        })
    }
}

pub fn parse_constituents<R: Read>(reader: R) -> Result<Vec<Constituent>, StockfolioError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for result in rdr.deserialize::<ConstituentRecord>() {
        let record = result.map_err(|e| StockfolioError::Csv {
            reason: format!("CSV parse error: {e}"),
        })?;
        let line = rows.len() as u64 + 2;
        rows.push(record.into_constituent(line)?);
    }

    Ok(rows)
}

pub struct ConstituentsCsv {
    path: PathBuf,
}

impl ConstituentsCsv {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Vec<Constituent>, StockfolioError> {
        let file = File::open(&self.path).map_err(|e| StockfolioError::Csv {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        parse_constituents(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Symbol,Name,Sector,Price,Price/Earnings,Dividend Yield,Earnings/Share,\
52 Week Low,52 Week High,Market Cap,EBITDA,Price/Sales,Price/Book,SEC Filings\n";

    #[test]
    fn parses_full_row() {
        let csv = format!(
            "{HEADER}MMM,3M Company,Industrials,222.89,24.31,2.33,7.92,259.77,175.49,138721055226,9048000000,4.39,11.34,http://www.sec.gov/cgi-bin/browse-edgar?action=getcompany&CIK=MMM\n"
        );
        let rows = parse_constituents(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        let mmm = &rows[0];
        assert_eq!(mmm.symbol, "MMM");
        assert_eq!(mmm.name, "3M Company");
        assert_eq!(mmm.price, dec!(222.89));
        assert_eq!(mmm.price_earnings, Some(24.31));
        assert_eq!(mmm.market_cap, Some(138_721_055_226));
        assert_eq!(mmm.ebitda, Some(9_048_000_000));
        assert!(mmm.sec_filings.as_deref().unwrap().contains("sec.gov"));
    }

    #[test]
    fn empty_cells_become_none() {
        let csv = format!("{HEADER}aos,A.O. Smith Corp,Industrials,60.24,,,,,,,,,,\n");
        let rows = parse_constituents(csv.as_bytes()).unwrap();

        let aos = &rows[0];
        assert_eq!(aos.symbol, "AOS");
        assert_eq!(aos.price, dec!(60.24));
        assert_eq!(aos.price_earnings, None);
        assert_eq!(aos.dividend_yield, None);
        assert_eq!(aos.market_cap, None);
        assert_eq!(aos.sec_filings, None);
    }

    #[test]
    fn large_integers_are_exact() {
        let csv = format!(
            "{HEADER}BIG,Big Corp,Industrials,1.00,,,,,,9007199254740993,-9007199254740993,,,\n"
        );
        let rows = parse_constituents(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].market_cap, Some(9_007_199_254_740_993));
        assert_eq!(rows[0].ebitda, Some(-9_007_199_254_740_993));
    }

    #[test]
    fn fractional_market_cap_is_rejected() {
        let csv = format!("{HEADER}BIG,Big Corp,Industrials,1.00,,,,,,12.5,,,,\n");
        assert!(matches!(
            parse_constituents(csv.as_bytes()),
            Err(StockfolioError::Csv { .. })
        ));
    }

    #[test]
    fn invalid_price_reports_line() {
        let csv = format!(
            "{HEADER}MMM,3M Company,Industrials,222.89,,,,,,,,,,\nABT,Abbott,Health Care,n/a,,,,,,,,,,\n"
        );
        match parse_constituents(csv.as_bytes()) {
            Err(StockfolioError::Csv { reason }) => assert!(reason.contains("line 3")),
            other => panic!("expected Csv error, got: {other:?}"),
        }
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{HEADER}ABT,Abbott Laboratories,Health Care,58.02,,,,,,,,,,\n").unwrap();

        let rows = ConstituentsCsv::new(file.path().to_path_buf()).load().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "ABT");
    }

    #[test]
    fn load_missing_file_is_csv_error() {
        let result = ConstituentsCsv::new(PathBuf::from("/nonexistent/constituents.csv")).load();
        assert!(matches!(result, Err(StockfolioError::Csv { .. })));
    }
}
