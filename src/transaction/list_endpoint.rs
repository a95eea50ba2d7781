use axum::{Json, extract::State};

use crate::{Error, transaction::{Transaction, TransactionService}};

/// A route handler that returns every transaction as a JSON array.
pub async fn list_transactions_endpoint(
    State(service): State<TransactionService>,
) -> Result<Json<Vec<Transaction>>, Error> {
    service.list().map(Json)
}
