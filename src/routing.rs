//! Application router configuration for the transaction API.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, ErrorBody, endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_monthly_summary_endpoint, list_transactions_endpoint, remove_duplicates_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Requests from any origin are allowed.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::MONTHLY_SUMMARY, get(get_monthly_summary_endpoint))
        .route(endpoints::CLEANUP_DUPLICATES, post(remove_duplicates_endpoint))
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_owned(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::params;
    use serde_json::json;

    use crate::{
        AppState, ErrorBody, Transaction, TransactionService, build_router, endpoints,
        endpoints::format_endpoint, transaction::CleanupReport,
    };

    fn get_test_server() -> (TestServer, TransactionService) {
        let service = TransactionService::open_in_memory().expect("Could not open database.");
        let app = build_router(AppState::new(service.clone()));
        let server = TestServer::new(app).expect("Could not create test server.");

        (server, service)
    }

    #[tokio::test]
    async fn create_then_list_and_summarize() {
        let (server, _) = get_test_server();

        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "type": "income",
                "category": "Bonus",
                "amount": 1000,
                "date": "2025-08-15",
                "description": "Yearly bonus",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let transactions = server
            .get(endpoints::TRANSACTIONS)
            .await
            .json::<Vec<Transaction>>();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].category, "Bonus");
        assert_eq!(transactions[0].description, "Yearly bonus");

        server
            .get(endpoints::MONTHLY_SUMMARY)
            .await
            .assert_json(&json!({
                "totalIncome": 1000.0,
                "totalExpense": 0.0,
                "balance": 1000.0,
                "categories": {"Bonus": 1000.0},
            }));
    }

    #[tokio::test]
    async fn created_transaction_uses_wire_names() {
        let (server, _) = get_test_server();

        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "type": "expense",
                "category": "Office",
                "amount": "125.50",
                "date": "2024-01-14",
            }))
            .await
            .assert_json(&json!({
                "id": 1,
                "type": "expense",
                "category": "Office",
                "amount": 125.5,
                "date": "2024-01-14",
                "description": "",
            }));
    }

    #[tokio::test]
    async fn create_with_missing_amount_is_bad_request() {
        let (server, service) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "type": "income",
                "category": "Bonus",
                "date": "2025-08-15",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<ErrorBody>().error,
            "Missing required fields: amount"
        );
        assert_eq!(service.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .text("{\"type\": ")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(!response.json::<ErrorBody>().error.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let (server, service) = get_test_server();
        let created = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "type": "income",
                "category": "Bonus",
                "amount": 1000,
                "date": "2025-08-15",
            }))
            .await
            .json::<Transaction>();

        let updated = server
            .put(&format_endpoint(endpoints::TRANSACTION, created.id))
            .json(&json!({
                "type": "expense",
                "category": "Rent",
                "amount": 950,
                "date": "2025-09-01",
                "description": "September rent",
            }))
            .await
            .json::<Transaction>();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.category, "Rent");
        assert_eq!(service.list().unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn update_missing_transaction_is_bad_request() {
        let (server, _) = get_test_server();

        server
            .put(&format_endpoint(endpoints::TRANSACTION, 999))
            .json(&json!({
                "type": "expense",
                "category": "Rent",
                "amount": 950,
                "date": "2025-09-01",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let (server, _) = get_test_server();

        server
            .delete("/transactions/abc")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (server, service) = get_test_server();
        let created = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "type": "income",
                "category": "Bonus",
                "amount": 1000,
                "date": "2025-08-15",
            }))
            .await
            .json::<Transaction>();
        let path = format_endpoint(endpoints::TRANSACTION, created.id);

        server
            .delete(&path)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&path)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn cleanup_keeps_lowest_id() {
        let (server, service) = get_test_server();
        {
            let connection = service.lock_connection().unwrap();
            for id in [100, 101] {
                connection
                    .execute(
                        "INSERT INTO \"transaction\" (id, type, category, amount, date, description)
                         VALUES (?1, 'expense', 'Office', 125.5, '2024-01-14', 'Office Supplies')",
                        params![id],
                    )
                    .unwrap();
            }
        }

        let report = server
            .post(endpoints::CLEANUP_DUPLICATES)
            .await
            .json::<CleanupReport>();

        assert_eq!(report.removed_count, 1);
        assert_eq!(report.message, "Removed 1 duplicate transactions");
        let remaining: Vec<i64> = service
            .list()
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();
        assert_eq!(remaining, vec![100]);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (server, _) = get_test_server();

        let response = server.get("/coffee").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<ErrorBody>().error, "Not found");
    }
}
