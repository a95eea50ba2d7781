//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. a salary or a sale.
    Income,
    /// Money going out, e.g. rent or office supplies.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::Validation(format!(
                "Invalid transaction type \"{other}\", expected \"income\" or \"expense\""
            ))),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|_| FromSqlError::Other(format!("invalid transaction type \"{text}\"").into()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the database.
    pub id: TransactionId,
    /// Whether this transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// A free text category, e.g. "Services" or "Office".
    pub category: String,
    /// The amount of money spent or earned, always greater than zero.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for, empty if not given.
    #[serde(default)]
    pub description: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(kind: TransactionType, category: &str, amount: f64, date: Date) -> NewTransaction {
        NewTransaction {
            kind,
            category: category.to_owned(),
            amount,
            date,
            description: String::new(),
        }
    }
}

/// A validated transaction that has not been given an ID yet.
///
/// Every field of a stored [Transaction] except the ID. Created either with
/// [Transaction::build] or by validating a [TransactionInput].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether this transaction is income or an expense.
    pub kind: TransactionType,
    /// A non-empty, free text category.
    pub category: String,
    /// The amount of money, always greater than zero.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// An optional description, empty if not given.
    pub description: String,
}

impl NewTransaction {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

/// A transaction amount as sent by a client, either a JSON number or a
/// numeric string such as `"12.50"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    /// A JSON number.
    Number(f64),
    /// A string that should contain a number.
    Text(String),
}

/// The body of a request to create or overwrite a transaction.
///
/// Every field is optional on the wire so that missing fields can be reported
/// as validation errors rather than deserialization failures. Use
/// [TransactionInput::validate] to get a [NewTransaction].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// "income" or "expense".
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// The category name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// The amount, must be a number greater than zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// An ISO 8601 calendar date, e.g. "2025-08-15".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// An optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

impl TransactionInput {
    /// Check that every required field is present and well formed.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `type`, `category`, `amount` or `date`
    /// is missing or empty, if `type` is not "income" or "expense", if
    /// `amount` is not a number greater than zero, or if `date` is not a
    /// valid `YYYY-MM-DD` date.
    pub fn validate(self) -> Result<NewTransaction, Error> {
        let kind = non_empty(self.kind);
        let category = non_empty(self.category);
        let amount = self
            .amount
            .filter(|amount| !matches!(amount, Amount::Text(text) if text.trim().is_empty()));
        let date = non_empty(self.date);

        let missing: Vec<&str> = [
            ("type", kind.is_none()),
            ("category", category.is_none()),
            ("amount", amount.is_none()),
            ("date", date.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, is_missing)| is_missing.then_some(name))
        .collect();

        match (kind, category, amount, date) {
            (Some(kind), Some(category), Some(amount), Some(date)) => Ok(NewTransaction {
                kind: kind.trim().parse()?,
                category,
                amount: parse_amount(amount)?,
                date: parse_date(&date)?,
                description: self.description.unwrap_or_default(),
            }),
            _ => Err(Error::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn parse_amount(amount: Amount) -> Result<f64, Error> {
    let value = match amount {
        Amount::Number(value) => value,
        Amount::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::Validation(format!("Amount \"{text}\" is not a number")))?,
    };

    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(format!(
            "Amount must be a number greater than zero, got {value}"
        )));
    }

    Ok(value)
}

fn parse_date(text: &str) -> Result<Date, Error> {
    let invalid = || {
        Error::Validation(format!(
            "Date \"{text}\" is not a valid date, expected the format YYYY-MM-DD"
        ))
    };

    let trimmed = text.trim();

    // `[year]` also accepts a leading sign, e.g. "+2025-08-15".
    if trimmed.len() != 10 || !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid());
    }

    Date::parse(trimmed, DATE_FORMAT).map_err(|_| invalid())
}

impl From<NewTransaction> for TransactionInput {
    fn from(transaction: NewTransaction) -> Self {
        Self {
            kind: Some(transaction.kind.as_str().to_owned()),
            category: Some(transaction.category),
            amount: Some(Amount::Number(transaction.amount)),
            date: Some(transaction.date.to_string()),
            description: Some(transaction.description),
        }
    }
}

impl From<&Transaction> for TransactionInput {
    fn from(transaction: &Transaction) -> Self {
        Self {
            kind: Some(transaction.kind.as_str().to_owned()),
            category: Some(transaction.category.clone()),
            amount: Some(Amount::Number(transaction.amount)),
            date: Some(transaction.date.to_string()),
            description: Some(transaction.description.clone()),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (type, category, amount, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, type, category, amount, date, description",
        )?
        .query_row(
            params![
                transaction.kind,
                transaction.category,
                transaction.amount,
                transaction.date,
                transaction.description,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve every transaction in the database, ordered by ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, type, category, amount, date, description FROM \"transaction\" ORDER BY id",
    )?;

    let transactions = statement
        .query_map([], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, type, category, amount, date, description FROM \"transaction\"
             WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Overwrite every field of the transaction `id` and return the stored row.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "UPDATE \"transaction\"
             SET type = ?1, category = ?2, amount = ?3, date = ?4, description = ?5
             WHERE id = ?6
             RETURNING id, type, category, amount, date, description",
        )?
        .query_row(
            params![
                transaction.kind,
                transaction.category,
                transaction.amount,
                transaction.date,
                transaction.description,
                id,
            ],
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound(format!("Transaction {id} not found"))
            }
            error => error.into(),
        })
}

/// The number of rows changed by a write.
pub type RowsAffected = usize;

/// Delete the transaction `id`, deleting a transaction that does not exist
/// affects zero rows and is not an error.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id",
            &[(":id", &id)],
        )
        .map_err(|err| err.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT INTO sqlite_sequence (name, seq)
         SELECT 'transaction', 0
         WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'transaction')",
        (),
    )?;

    // Covers the GROUP BY used when removing duplicates.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_duplicate_key
         ON \"transaction\"(type, category, amount, date, description);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let kind = row.get(1)?;
    let category = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;
    let description = row.get(5)?;

    Ok(Transaction {
        id,
        kind,
        category,
        amount,
        date,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================
