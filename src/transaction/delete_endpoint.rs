use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};

use crate::{Error, database_id::TransactionId, transaction::TransactionService};

/// A route handler for deleting a transaction, responds with `204 No Content`.
///
/// Deleting a transaction that does not exist also succeeds.
pub async fn delete_transaction_endpoint(
    State(service): State<TransactionService>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(transaction_id) = transaction_id?;

    service.remove(transaction_id).inspect_err(|error| {
        tracing::error!("Could not delete transaction {transaction_id}: {error}");
    })?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::transaction::{
        Transaction, TransactionService, TransactionType,
        delete_endpoint::delete_transaction_endpoint,
    };

    #[tokio::test]
    async fn deletes_transaction() {
        let service = TransactionService::open_in_memory().unwrap();
        let transaction = service
            .add(
                Transaction::build(TransactionType::Expense, "Test", 1.23, date!(2025 - 10 - 26))
                    .into(),
            )
            .unwrap();

        let status = delete_transaction_endpoint(State(service.clone()), Ok(Path(transaction.id)))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_missing_transaction_succeeds() {
        let service = TransactionService::open_in_memory().unwrap();

        let status = delete_transaction_endpoint(State(service), Ok(Path(404)))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
