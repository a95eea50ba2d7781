//! Populates an empty database with sample transactions.

use std::{io::ErrorKind, path::Path};

use crate::{
    Error,
    transaction::{TransactionInput, TransactionService, create_transaction},
};

/// The sample transactions used when no sample data file is given.
pub const DEFAULT_SAMPLE_DATA: &str = include_str!("../data/sample_transactions.json");

/// Insert the transactions in the JSON array `json` if the store is empty.
///
/// Every record is validated the same way as a request body, and all records
/// are inserted in a single SQL transaction: either all of them are stored or
/// none are.
///
/// Returns the number of inserted transactions, which is zero if the store
/// already had transactions.
///
/// # Errors
/// Returns [Error::SampleData] if `json` is not an array of transactions,
/// [Error::Validation] if a record is invalid, or a store error.
pub fn load_sample_data(json: &str, service: &TransactionService) -> Result<usize, Error> {
    let existing = service.count()?;
    if existing > 0 {
        tracing::info!("Database already has {existing} transactions, skipping sample data");
        return Ok(0);
    }

    let records: Vec<TransactionInput> =
        serde_json::from_str(json).map_err(|error| Error::SampleData(error.to_string()))?;
    let transactions = records
        .into_iter()
        .map(TransactionInput::validate)
        .collect::<Result<Vec<_>, _>>()?;

    let connection = service.lock_connection()?;
    let sql_transaction = connection.unchecked_transaction()?;

    for transaction in &transactions {
        create_transaction(transaction.clone(), &sql_transaction)?;
    }

    sql_transaction.commit()?;

    tracing::info!("Inserted {} sample transactions", transactions.len());

    Ok(transactions.len())
}

/// Read the sample data at `path` and insert it with [load_sample_data].
///
/// A missing file is not an error: it is logged and nothing is inserted.
///
/// # Errors
/// Returns [Error::SampleData] if the file exists but cannot be read, or any
/// error from [load_sample_data].
pub fn load_sample_data_file(
    path: impl AsRef<Path>,
    service: &TransactionService,
) -> Result<usize, Error> {
    let path = path.as_ref();

    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::warn!("Sample data file {path:?} does not exist, skipping sample data");
            return Ok(0);
        }
        Err(error) => {
            return Err(Error::SampleData(format!(
                "could not read {}: {error}",
                path.display()
            )));
        }
    };

    load_sample_data(&json, service)
}
