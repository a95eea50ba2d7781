//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the `TransactionInput` accepted from clients
//! - Database functions for storing, querying, and de-duplicating transactions
//! - The `TransactionService` that owns the database connection
//! - The JSON route handlers for transactions

mod cleanup_endpoint;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod duplicates;
mod edit_endpoint;
mod list_endpoint;
mod service;
mod summary_endpoint;

pub use cleanup_endpoint::{CleanupReport, remove_duplicates_endpoint};
pub use core::{
    Amount, NewTransaction, RowsAffected, Transaction, TransactionInput, TransactionType,
    count_transactions, create_transaction, create_transaction_table, delete_transaction,
    get_all_transactions, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use duplicates::remove_duplicate_transactions;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use service::TransactionService;
pub use summary_endpoint::get_monthly_summary_endpoint;

#[cfg(test)]
pub use core::get_transaction;
