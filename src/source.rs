//! Where sale records come from.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    dashboard::Snapshot,
    db::{get_all_applications, get_sales_for_owner},
    normalize::normalize_all,
    sale::{Application, Catalog, OwnerId, RawSaleRecord},
};

/// Read-only queries against the store that holds sales and applications.
pub trait RecordSource {
    /// Fetch every sale entered by `owner_id`.
    fn fetch_sale_records(&self, owner_id: OwnerId) -> Result<Vec<RawSaleRecord>, Error>;

    /// Fetch every application that sales may refer to.
    fn fetch_applications(&self) -> Result<Vec<Application>, Error>;
}

/// A [RecordSource] backed by a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteRecordSource {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRecordSource {
    /// Create a source over a shared connection.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl RecordSource for SqliteRecordSource {
    fn fetch_sale_records(&self, owner_id: OwnerId) -> Result<Vec<RawSaleRecord>, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_sales_for_owner(owner_id, &connection)
            .map_err(|error| Error::UpstreamFetch(error.to_string()))
    }

    fn fetch_applications(&self) -> Result<Vec<Application>, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_applications(&connection).map_err(|error| Error::UpstreamFetch(error.to_string()))
    }
}

/// Fetch, normalize and snapshot the records for `owner_id`.
///
/// A failed sale fetch yields an empty snapshot rather than an error, so the
/// dashboard always has something to aggregate. A failed application fetch
/// leaves every sale under the "other" category.
pub fn load_snapshot(source: &impl RecordSource, owner_id: OwnerId) -> Snapshot {
    let records = source
        .fetch_sale_records(owner_id)
        .inspect_err(|error| {
            tracing::error!("could not fetch sales for owner {owner_id}, using no records: {error}")
        })
        .unwrap_or_default();

    let applications = source
        .fetch_applications()
        .inspect_err(|error| tracing::error!("could not fetch applications: {error}"))
        .unwrap_or_default();

    tracing::debug!(
        "loaded {} sales and {} applications for owner {owner_id}",
        records.len(),
        applications.len()
    );

    Snapshot::new(normalize_all(records), Catalog::new(applications))
}
