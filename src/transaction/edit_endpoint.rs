use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{Transaction, TransactionInput, TransactionService},
};

/// A route handler for overwriting every field of a transaction.
///
/// Responds with the updated transaction, or `400 Bad Request` if the input is
/// invalid or the transaction does not exist.
pub async fn edit_transaction_endpoint(
    State(service): State<TransactionService>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let Path(transaction_id) = transaction_id?;
    let Json(input) = payload?;

    service
        .update(transaction_id, input)
        .inspect_err(|error| {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
        })
        .map(Json)
}
