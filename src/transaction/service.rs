//! The transaction service, which owns the database connection and implements
//! every operation on transactions.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::Connection;

use crate::{
    Error,
    database_id::TransactionId,
    db::initialize,
    summary::{Summary, summarize},
    transaction::{
        Transaction, TransactionInput, count_transactions, create_transaction,
        delete_transaction, get_all_transactions, remove_duplicate_transactions,
        update_transaction,
    },
};

/// Stores transactions in SQLite and computes summaries over them.
///
/// Cloning the service is cheap: clones share the same connection, which is
/// locked for the duration of each operation.
#[derive(Debug, Clone)]
pub struct TransactionService {
    connection: Arc<Mutex<Connection>>,
}

impl TransactionService {
    /// Create a service that owns `connection`.
    ///
    /// The database tables are created if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Open (or create) the SQLite database at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let connection = Connection::open(path)?;

        Self::new(connection)
    }

    /// Create a service backed by a private in-memory database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn open_in_memory() -> Result<Self, Error> {
        Self::new(Connection::open_in_memory()?)
    }

    pub(crate) fn lock_connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }

    /// Every stored transaction.
    ///
    /// Callers should not rely on the order of the transactions.
    ///
    /// # Errors
    /// Returns an error if the database cannot be read.
    pub fn list(&self) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock_connection()?;

        get_all_transactions(&connection)
    }

    /// Validate `input` and store it as a new transaction.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `input` is missing a required field or
    /// has a malformed one, or a store error if the write fails.
    pub fn add(&self, input: TransactionInput) -> Result<Transaction, Error> {
        let transaction = input.validate()?;
        let connection = self.lock_connection()?;
        let transaction = create_transaction(transaction, &connection)?;

        tracing::info!("Created transaction {}", transaction.id);

        Ok(transaction)
    }

    /// Replace every field of the transaction `id` with `input`.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `input` is invalid, [Error::NotFound]
    /// if there is no transaction with the ID `id`, or a store error if the
    /// write fails.
    pub fn update(&self, id: TransactionId, input: TransactionInput) -> Result<Transaction, Error> {
        let transaction = input.validate()?;
        let connection = self.lock_connection()?;
        let transaction = update_transaction(id, transaction, &connection)?;

        tracing::info!("Updated transaction {id}");

        Ok(transaction)
    }

    /// Delete the transaction `id`.
    ///
    /// Deleting a transaction that does not exist does nothing.
    ///
    /// # Errors
    /// Returns a store error if the write fails.
    pub fn remove(&self, id: TransactionId) -> Result<(), Error> {
        let connection = self.lock_connection()?;

        match delete_transaction(id, &connection)? {
            0 => tracing::debug!("Transaction {id} does not exist, nothing to delete"),
            _ => tracing::info!("Deleted transaction {id}"),
        }

        Ok(())
    }

    /// Income, expense and per-category totals over **all** transactions.
    ///
    /// Despite the name this is not limited to the current month; the name
    /// matches the `/transactions/summary/monthly` route that clients use.
    ///
    /// # Errors
    /// Returns an error if the database cannot be read.
    pub fn monthly_summary(&self) -> Result<Summary, Error> {
        let transactions = self.list()?;

        Ok(summarize(&transactions))
    }

    /// Delete duplicate transactions, keeping the lowest ID of each group.
    ///
    /// Returns the number of deleted transactions.
    ///
    /// # Errors
    /// Returns a store error if the database cannot be read or written.
    /// Groups deleted before the error stay deleted.
    pub fn remove_duplicates(&self) -> Result<usize, Error> {
        let connection = self.lock_connection()?;

        remove_duplicate_transactions(&connection)
    }

    /// The number of stored transactions.
    ///
    /// # Errors
    /// Returns an error if the database cannot be read.
    pub fn count(&self) -> Result<u32, Error> {
        let connection = self.lock_connection()?;

        count_transactions(&connection)
    }

    /// Close the database connection.
    ///
    /// If other clones of the service are still alive the connection stays
    /// open until the last one is dropped.
    ///
    /// # Errors
    /// Returns an error if SQLite fails to close the connection.
    pub fn close(self) -> Result<(), Error> {
        let mutex = match Arc::try_unwrap(self.connection) {
            Ok(mutex) => mutex,
            Err(_) => {
                tracing::warn!(
                    "The database connection is still in use, it closes with the last clone"
                );
                return Ok(());
            }
        };

        let connection = mutex.into_inner().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        connection.close().map_err(|(_, error)| Error::from(error))?;

        tracing::info!("Closed the database connection");

        Ok(())
    }
}
