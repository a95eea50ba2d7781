use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    Error,
    transaction::{Transaction, TransactionInput, TransactionService},
};

/// A route handler for creating a new transaction, responds with the stored
/// transaction and `201 Created`.
///
/// Missing or malformed fields, including a body that is not valid JSON, are
/// rejected with `400 Bad Request`.
pub async fn create_transaction_endpoint(
    State(service): State<TransactionService>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let Json(input) = payload?;

    let transaction = service.add(input).inspect_err(|error| {
        tracing::debug!("Could not create transaction: {error}");
    })?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod tests {
    use axum::{Json, extract::State, http::StatusCode};
    use time::macros::date;

    use crate::{
        Error,
        transaction::{
            Amount, Transaction, TransactionInput, TransactionService, TransactionType,
            create_endpoint::create_transaction_endpoint,
        },
    };

    fn bonus_input() -> TransactionInput {
        TransactionInput {
            kind: Some("income".to_owned()),
            category: Some("Bonus".to_owned()),
            amount: Some(Amount::Number(1000.0)),
            date: Some("2025-08-15".to_owned()),
            description: Some("Yearly bonus".to_owned()),
        }
    }

    #[tokio::test]
    async fn creates_transaction() {
        let service = TransactionService::open_in_memory().unwrap();

        let (status, Json(transaction)) =
            create_transaction_endpoint(State(service.clone()), Ok(Json(bonus_input())))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            transaction,
            Transaction {
                id: 1,
                kind: TransactionType::Income,
                category: "Bonus".to_owned(),
                amount: 1000.0,
                date: date!(2025 - 08 - 15),
                description: "Yearly bonus".to_owned(),
            }
        );
        assert_eq!(service.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_category_is_rejected() {
        let service = TransactionService::open_in_memory().unwrap();
        let input = TransactionInput {
            category: None,
            ..bonus_input()
        };

        let result = create_transaction_endpoint(State(service.clone()), Ok(Json(input))).await;

        assert_eq!(
            result.unwrap_err(),
            Error::Validation("Missing required fields: category".to_owned())
        );
        assert_eq!(service.count().unwrap(), 0);
    }
}
