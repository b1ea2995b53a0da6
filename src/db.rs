//! SQLite schema and queries for applications and sales.
//!
//! Dates and timestamps are stored as text so that malformed legacy values
//! are read back as-is and handled by the normalizer rather than failing the
//! whole query.

use rusqlite::{Connection, Row, Transaction as SqlTransaction};
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    sale::{
        Application, ApplicationId, DurationKind, OwnerId, RawSaleRecord, SaleId,
        compute_period_end,
    },
};

/// Create the application and sale tables if they do not exist.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    transaction.execute_batch(
        "CREATE TABLE IF NOT EXISTS application (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS sale (
            id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL,
            application_id INTEGER REFERENCES application(id) ON DELETE SET NULL,
            buyer_phone TEXT,
            order_count INTEGER,
            cost_amount INTEGER,
            sale_amount INTEGER,
            period_start TEXT,
            period_end TEXT,
            duration_kind TEXT,
            duration_count INTEGER,
            created_at TEXT,
            note TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_sale_owner ON sale(owner_id);",
    )?;

    transaction.commit()?;

    Ok(())
}

/// Create an application and return it with its generated ID.
pub fn create_application(name: &str, connection: &Connection) -> Result<Application, Error> {
    connection.execute("INSERT INTO application (name) VALUES (?1);", (name,))?;

    let id = connection.last_insert_rowid();

    Ok(Application {
        id,
        display_name: name.to_owned(),
    })
}

/// Retrieve all applications ordered alphabetically by name.
pub fn get_all_applications(connection: &Connection) -> Result<Vec<Application>, Error> {
    connection
        .prepare("SELECT id, name FROM application ORDER BY name ASC;")?
        .query_map([], |row| {
            Ok(Application {
                id: row.get(0)?,
                display_name: row.get(1)?,
            })
        })?
        .map(|maybe_application| maybe_application.map_err(|error| error.into()))
        .collect()
}

/// A sale about to be written to the database.
///
/// To create a new `NewSale`, use [NewSale::build].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    /// The application that was sold.
    pub application_id: Option<ApplicationId>,
    /// The buyer's contact number.
    pub buyer_phone: String,
    /// The number of units sold.
    pub order_count: u32,
    /// What the reseller paid.
    pub cost_amount: i64,
    /// What the buyer paid.
    pub sale_amount: i64,
    /// The first day of the subscription.
    pub period_start: Date,
    /// How long the subscription lasts.
    pub duration: (DurationKind, u32),
    /// When the sale was entered. `None` stores no timestamp, like legacy rows.
    pub created_at: Option<OffsetDateTime>,
    /// Free text shown next to the sale.
    pub note: Option<String>,
}

impl NewSale {
    /// Start building a single-unit sale with no cost, no application and
    /// no creation time.
    pub fn build(sale_amount: i64, period_start: Date, duration: (DurationKind, u32)) -> Self {
        Self {
            application_id: None,
            buyer_phone: String::new(),
            order_count: 1,
            cost_amount: 0,
            sale_amount,
            period_start,
            duration,
            created_at: None,
            note: None,
        }
    }

    /// Set the application that was sold.
    pub fn application_id(mut self, application_id: Option<ApplicationId>) -> Self {
        self.application_id = application_id;
        self
    }

    /// Set the buyer's phone number.
    pub fn buyer_phone(mut self, buyer_phone: &str) -> Self {
        self.buyer_phone = buyer_phone.to_owned();
        self
    }

    /// Set the number of units sold.
    pub fn order_count(mut self, order_count: u32) -> Self {
        self.order_count = order_count;
        self
    }

    /// Set what the reseller paid.
    pub fn cost_amount(mut self, cost_amount: i64) -> Self {
        self.cost_amount = cost_amount;
        self
    }

    /// Set when the sale was entered.
    pub fn created_at(mut self, created_at: Option<OffsetDateTime>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the note.
    pub fn note(mut self, note: Option<&str>) -> Self {
        self.note = note.map(str::to_owned);
        self
    }
}

/// Write a sale for `owner_id`, deriving its end date from the duration.
///
/// # Errors
/// Returns [Error::SqlError] if the insert fails, e.g. because the
/// application ID does not exist and foreign keys are enforced.
pub fn create_sale(
    sale: NewSale,
    owner_id: OwnerId,
    connection: &Connection,
) -> Result<SaleId, Error> {
    let (kind, count) = sale.duration;
    let period_end = compute_period_end(sale.period_start, kind, count);
    let created_at = sale
        .created_at
        .map(|created_at| created_at.format(&Rfc3339))
        .transpose()
        .map_err(|error| Error::InvalidOption(error.to_string()))?;

    connection.execute(
        "INSERT INTO sale (
            owner_id, application_id, buyer_phone, order_count, cost_amount, sale_amount,
            period_start, period_end, duration_kind, duration_count, created_at, note
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        rusqlite::params![
            owner_id,
            sale.application_id,
            sale.buyer_phone,
            sale.order_count,
            sale.cost_amount,
            sale.sale_amount,
            sale.period_start.to_string(),
            period_end.map(|date| date.to_string()),
            kind.as_str(),
            count,
            created_at,
            sale.note,
        ],
    )?;

    Ok(connection.last_insert_rowid())
}

/// Retrieve every sale owned by `owner_id`, oldest entry first.
pub fn get_sales_for_owner(
    owner_id: OwnerId,
    connection: &Connection,
) -> Result<Vec<RawSaleRecord>, Error> {
    connection
        .prepare(
            "SELECT id, application_id, buyer_phone, order_count, cost_amount, sale_amount,
                period_start, period_end, duration_kind, duration_count, created_at, note
             FROM sale
             WHERE owner_id = :owner_id
             ORDER BY id ASC;",
        )?
        .query_map(&[(":owner_id", &owner_id)], map_sale_row)?
        .map(|maybe_sale| maybe_sale.map_err(|error| error.into()))
        .collect()
}

fn map_sale_row(row: &Row) -> Result<RawSaleRecord, rusqlite::Error> {
    Ok(RawSaleRecord {
        id: row.get(0)?,
        application_id: row.get(1)?,
        buyer_phone: row.get(2)?,
        order_count: row.get(3)?,
        cost_amount: row.get(4)?,
        sale_amount: row.get(5)?,
        period_start: row.get(6)?,
        period_end: row.get(7)?,
        duration_kind: row.get(8)?,
        duration_count: row.get(9)?,
        created_at: row.get(10)?,
        note: row.get(11)?,
    })
}
