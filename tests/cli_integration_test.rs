#![cfg(feature = "sqlite")]
//! CLI wiring tests: config files on disk, store setup, provider selection
//! and the constituents import.

mod common;

use common::*;
use rust_decimal_macros::dec;
use std::io::Write;
use std::path::Path;
use stockfolio::cli;
use stockfolio::domain::error::StockfolioError;
use stockfolio::ports::constituents_port::ConstituentsPort;
use stockfolio::ports::holdings_port::HoldingsPort;
use tempfile::{NamedTempFile, TempDir};

const CSV: &str = "Symbol,Name,Sector,Price,Price/Earnings,Dividend Yield,Earnings/Share,\
52 Week Low,52 Week High,Market Cap,EBITDA,Price/Sales,Price/Book,SEC Filings
MMM,3M Company,Industrials,222.89,24.31,2.33,7.92,259.77,175.49,138721055226,9048000000,4.39,11.34,
ABT,Abbott Laboratories,Health Care,58.02,22.51,1.91,1.7,64.6,42.28,102121042306,5744000000,3.74,3.19,
AOS,A.O. Smith Corp,Industrials,60.24,,,,,,,,,,
";

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn ini_for(db: &Path, provider: &str) -> String {
    format!(
        "[sqlite]\npath = {}\n\n[provider]\n{provider}\n\n[pagination]\ndefault_limit = 50\nmax_limit = 200\n",
        db.display()
    )
}

mod config {
    use super::*;

    #[test]
    fn missing_file_is_config_error() {
        let err = cli::load_config(Path::new("/nonexistent/stockfolio.ini")).err().unwrap();
        assert!(matches!(err, StockfolioError::ConfigParse { .. }));
    }

    #[test]
    fn store_requires_sqlite_path() {
        let ini = write_temp("[provider]\nkind = constituents\n");
        let config = cli::load_config(ini.path()).unwrap();

        let err = cli::open_store(&config).err().unwrap();

        assert!(matches!(err, StockfolioError::ConfigMissing { .. }));
    }

    #[test]
    fn alphavantage_requires_api_key() {
        let dir = TempDir::new().unwrap();
        let ini = write_temp(&ini_for(&dir.path().join("folio.db"), "kind = alphavantage"));
        let config = cli::load_config(ini.path()).unwrap();
        let store = cli::open_store(&config).unwrap();

        let err = cli::build_price_port(&config, store).err().unwrap();

        assert!(matches!(
            err,
            StockfolioError::ConfigMissing { ref key, .. } if key == "api_key"
        ));
    }

    #[test]
    fn provider_kind_selects_adapter() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("folio.db");

        let ini = write_temp(&ini_for(&db, "kind = constituents"));
        let config = cli::load_config(ini.path()).unwrap();
        let store = cli::open_store(&config).unwrap();
        assert_eq!(
            cli::build_price_port(&config, store).unwrap().name(),
            "constituents"
        );

        let ini = write_temp(&ini_for(&db, "api_key = demo"));
        let config = cli::load_config(ini.path()).unwrap();
        let store = cli::open_store(&config).unwrap();
        assert_eq!(
            cli::build_price_port(&config, store).unwrap().name(),
            "alphavantage"
        );
    }

    #[test]
    fn invalid_settings_stop_service_build() {
        let dir = TempDir::new().unwrap();
        let ini = write_temp(&ini_for(
            &dir.path().join("folio.db"),
            "kind = constituents\nmax_concurrency = 0",
        ));
        let config = cli::load_config(ini.path()).unwrap();
        let store = cli::open_store(&config).unwrap();

        let err = cli::build_service(&config, store).err().unwrap();

        assert!(matches!(err, StockfolioError::ConfigInvalid { .. }));
    }
}

mod import {
    use super::*;

    #[test]
    fn imports_every_row_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let ini = write_temp(&ini_for(&dir.path().join("folio.db"), "kind = constituents"));
        let csv = write_temp(CSV);
        let config = cli::load_config(ini.path()).unwrap();
        let store = cli::open_store(&config).unwrap();

        assert_eq!(cli::import_constituents(&store, csv.path()).unwrap(), 3);
        assert_eq!(cli::import_constituents(&store, csv.path()).unwrap(), 3);
        assert_eq!(store.count_constituents().unwrap(), 3);

        let aos = store.get_constituent("AOS").unwrap().unwrap();
        assert_eq!(aos.price, dec!(60.24));
        assert_eq!(aos.price_earnings, None);
        assert_eq!(aos.sec_filings, None);
    }

    #[test]
    fn bad_csv_imports_nothing() {
        let store = memory_store();
        let csv = write_temp("Symbol,Name,Sector,Price\nMMM,3M,Industrials,abc\n");

        let err = cli::import_constituents(&store, csv.path()).unwrap_err();

        assert!(matches!(err, StockfolioError::Csv { .. }));
        assert_eq!(store.count_constituents().unwrap(), 0);
    }

    #[tokio::test]
    async fn imported_prices_value_the_portfolio() {
        let dir = TempDir::new().unwrap();
        let ini = write_temp(&ini_for(&dir.path().join("folio.db"), "kind = constituents"));
        let csv = write_temp(CSV);
        let config = cli::load_config(ini.path()).unwrap();
        let store = cli::open_store(&config).unwrap();
        cli::import_constituents(&store, csv.path()).unwrap();

        let service = cli::build_service(&config, store.clone()).unwrap();
        let created = service
            .create(new_holding("abt", 10, dec!(50)))
            .await
            .unwrap();
        let valuation = service.refresh_and_save(date(2024, 6, 1)).await.unwrap();

        assert_eq!(valuation.total_value, dec!(580.20));
        assert_eq!(
            store.get(created.id).unwrap().unwrap().current_price,
            Some(dec!(58.02))
        );
    }
}

mod on_disk {
    use super::*;

    #[test]
    fn holdings_survive_reopening_the_store() {
        let dir = TempDir::new().unwrap();
        let ini = write_temp(&ini_for(&dir.path().join("folio.db"), "kind = constituents"));
        let config = cli::load_config(ini.path()).unwrap();

        let id = {
            let store = cli::open_store(&config).unwrap();
            store.create(&new_holding("MMM", 3, dec!(200))).unwrap().id
        };

        let store = cli::open_store(&config).unwrap();
        let holding = store.get(id).unwrap().unwrap();
        assert_eq!(holding.symbol, "MMM");
        assert_eq!(holding.quantity, 3);
    }
}
