//! SQLite holdings and constituents store.
//!
//! Money columns are stored as TEXT and round-trip through `Decimal`, so no
//! value ever passes through a float.

use crate::domain::constituent::Constituent;
use crate::domain::error::StockfolioError;
use crate::domain::holding::{Holding, HoldingId, HoldingUpdate, NewHolding};
use crate::ports::config_port::ConfigPort;
use crate::ports::constituents_port::ConstituentsPort;
use crate::ports::holdings_port::HoldingsPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

const HOLDING_COLUMNS: &str = "id, symbol, quantity, purchase_price, current_price, purchase_date";

const CONSTITUENT_COLUMNS: &str = "symbol, name, sector, price, price_earnings, dividend_yield, \
     earnings_share, week_low_52, week_high_52, market_cap, ebitda, price_sales, price_book, \
     sec_filings";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> StockfolioError {
    StockfolioError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> StockfolioError {
    StockfolioError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn conversion_err(
    column: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

fn decimal_column(row: &Row<'_>, column: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(column)?;
    Decimal::from_str(&text).map_err(|e| conversion_err(column, e))
}

fn optional_decimal_column(row: &Row<'_>, column: usize) -> rusqlite::Result<Option<Decimal>> {
    let text: Option<String> = row.get(column)?;
    text.map(|t| Decimal::from_str(&t).map_err(|e| conversion_err(column, e)))
        .transpose()
}

/// SQLite reads a negative LIMIT/OFFSET as "none", so large values saturate.
fn to_sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn holding_from_row(row: &Row<'_>) -> rusqlite::Result<Holding> {
    let date_str: String = row.get(5)?;
    let purchase_date =
        NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| conversion_err(5, e))?;
    Ok(Holding {
        id: row.get(0)?,
        symbol: row.get(1)?,
        quantity: row.get(2)?,
        purchase_price: decimal_column(row, 3)?,
        current_price: optional_decimal_column(row, 4)?,
        purchase_date,
    })
}

fn constituent_from_row(row: &Row<'_>) -> rusqlite::Result<Constituent> {
    Ok(Constituent {
        symbol: row.get(0)?,
        name: row.get(1)?,
        sector: row.get(2)?,
        price: decimal_column(row, 3)?,
        price_earnings: row.get(4)?,
        dividend_yield: row.get(5)?,
        earnings_share: row.get(6)?,
        week_low_52: row.get(7)?,
        week_high_52: row.get(8)?,
        market_cap: row.get(9)?,
        ebitda: row.get(10)?,
        price_sales: row.get(11)?,
        price_book: row.get(12)?,
        sec_filings: row.get(13)?,
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockfolioError> {
        let db_path = config.require_string("sqlite", "path")?;
        if db_path == ":memory:" {
            return Self::in_memory();
        }

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        info!(path = %db_path, pool_size, "opened sqlite store");
        Ok(Self { pool })
    }

    /// A private in-memory database. The pool holds a single connection,
    /// never reaped, so every caller sees the same data for the life of the
    /// pool.
    pub fn in_memory() -> Result<Self, StockfolioError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StockfolioError> {
        self.pool.get().map_err(pool_err)
    }

    pub fn initialize_schema(&self) -> Result<(), StockfolioError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stock (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity > 0),
                purchase_price TEXT NOT NULL,
                current_price TEXT,
                purchase_date TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS ix_stock_symbol ON stock(symbol);
            CREATE TABLE IF NOT EXISTS constituents (
                symbol TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sector TEXT NOT NULL,
                price TEXT NOT NULL,
                price_earnings REAL,
                dividend_yield REAL,
                earnings_share REAL,
                week_low_52 REAL,
                week_high_52 REAL,
                market_cap INTEGER,
                ebitda INTEGER,
                price_sales REAL,
                price_book REAL,
                sec_filings TEXT
            );",
        )
        .map_err(query_err)?;

        Ok(())
    }
}

impl HoldingsPort for SqliteAdapter {
    fn list(&self, offset: usize, limit: usize) -> Result<(Vec<Holding>, usize), StockfolioError> {
        let conn = self.conn()?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM stock", [], |row| row.get(0))
            .map_err(query_err)?;

        let query = format!("SELECT {HOLDING_COLUMNS} FROM stock ORDER BY id ASC LIMIT ?1 OFFSET ?2");
        let mut stmt = conn.prepare(&query).map_err(query_err)?;
        let rows = stmt
            .query_map(
                params![to_sql_count(limit), to_sql_count(offset)],
                holding_from_row,
            )
            .map_err(query_err)?;

        let holdings = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_err)?;

        Ok((holdings, count as usize))
    }

    fn all(&self) -> Result<Vec<Holding>, StockfolioError> {
        let conn = self.conn()?;

        let query = format!("SELECT {HOLDING_COLUMNS} FROM stock ORDER BY id ASC");
        let mut stmt = conn.prepare(&query).map_err(query_err)?;
        let rows = stmt.query_map([], holding_from_row).map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn get(&self, id: HoldingId) -> Result<Option<Holding>, StockfolioError> {
        let conn = self.conn()?;

        let query = format!("SELECT {HOLDING_COLUMNS} FROM stock WHERE id = ?1");
        conn.query_row(&query, params![id], holding_from_row)
            .optional()
            .map_err(query_err)
    }

    fn create(&self, holding: &NewHolding) -> Result<Holding, StockfolioError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO stock (symbol, quantity, purchase_price, current_price, purchase_date)
             VALUES (?1, ?2, ?3, NULL, ?4)",
            params![
                holding.symbol,
                holding.quantity,
                holding.purchase_price.to_string(),
                holding.purchase_date.format(DATE_FORMAT).to_string(),
            ],
        )
        .map_err(query_err)?;

        let id = conn.last_insert_rowid();
        debug!(id, symbol = %holding.symbol, "inserted holding");

        Ok(Holding {
            id,
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            purchase_price: holding.purchase_price,
            current_price: None,
            purchase_date: holding.purchase_date,
        })
    }

    fn update(
        &self,
        id: HoldingId,
        update: &HoldingUpdate,
    ) -> Result<Option<Holding>, StockfolioError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        let query = format!("SELECT {HOLDING_COLUMNS} FROM stock WHERE id = ?1");
        let existing = tx
            .query_row(&query, params![id], holding_from_row)
            .optional()
            .map_err(query_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let merged = update.apply(&existing);
        tx.execute(
            "UPDATE stock
             SET symbol = ?1, quantity = ?2, purchase_price = ?3, purchase_date = ?4
             WHERE id = ?5",
            params![
                merged.symbol,
                merged.quantity,
                merged.purchase_price.to_string(),
                merged.purchase_date.format(DATE_FORMAT).to_string(),
                id,
            ],
        )
        .map_err(query_err)?;

        tx.commit().map_err(query_err)?;

        Ok(Some(merged))
    }

    fn delete(&self, id: HoldingId) -> Result<bool, StockfolioError> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM stock WHERE id = ?1", params![id])
            .map_err(query_err)?;
        Ok(removed > 0)
    }

    fn set_current_prices(
        &self,
        prices: &[(HoldingId, Decimal)],
    ) -> Result<usize, StockfolioError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        let mut written = 0;
        for (id, price) in prices {
            written += tx
                .execute(
                    "UPDATE stock SET current_price = ?1 WHERE id = ?2",
                    params![price.to_string(), id],
                )
                .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        Ok(written)
    }
}

impl ConstituentsPort for SqliteAdapter {
    fn upsert_constituents(&self, rows: &[Constituent]) -> Result<usize, StockfolioError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for c in rows {
            tx.execute(
                &format!(
                    "INSERT OR REPLACE INTO constituents ({CONSTITUENT_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
                ),
                params![
                    c.symbol,
                    c.name,
                    c.sector,
                    c.price.to_string(),
                    c.price_earnings,
                    c.dividend_yield,
                    c.earnings_share,
                    c.week_low_52,
                    c.week_high_52,
                    c.market_cap,
                    c.ebitda,
                    c.price_sales,
                    c.price_book,
                    c.sec_filings,
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        Ok(rows.len())
    }

    fn get_constituent(&self, symbol: &str) -> Result<Option<Constituent>, StockfolioError> {
        let conn = self.conn()?;

        let query = format!("SELECT {CONSTITUENT_COLUMNS} FROM constituents WHERE symbol = ?1");
        conn.query_row(&query, params![symbol], constituent_from_row)
            .optional()
            .map_err(query_err)
    }

    fn count_constituents(&self) -> Result<usize, StockfolioError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM constituents", [], |row| row.get(0))
            .map_err(query_err)?;
        Ok(count as usize)
    }
}
