//! Ledger Lite is a small finance tracker for recording income and expenses.
//!
//! This library provides:
//! - a [TransactionService] that stores transactions in SQLite and computes
//!   summaries and duplicate clean-ups,
//! - a JSON REST API over the service (see [build_router]),
//! - a [client::TransactionCache] that mirrors the transaction set for a
//!   dashboard and derives its tables and charts from the local copy.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

pub mod client;
mod app_state;
mod database_id;
mod db;
mod endpoints;
mod filter;
mod logging;
mod routing;
mod seed;
mod summary;
mod transaction;

pub use app_state::AppState;
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use filter::{TransactionFilter, filter_and_sort};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use seed::{DEFAULT_SAMPLE_DATA, load_sample_data, load_sample_data_file};
pub use summary::{CategoryShare, Summary, category_breakdown, summarize};
pub use transaction::{
    Amount, CleanupReport, NewTransaction, Transaction, TransactionInput, TransactionService,
    TransactionType,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field was missing or could not be parsed.
    ///
    /// The string describes which field was rejected and why, and is safe to
    /// show to the client.
    #[error("{0}")]
    Validation(String),

    /// The transaction targeted by an update does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The sample data file could not be read or parsed.
    #[error("could not load sample data: {0}")]
    SampleData(String),

    /// A response body could not be read back after the handler ran.
    #[error("could not read the response body: {0}")]
    ResponseBody(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound("Transaction not found".to_owned())
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// A human readable description of what went wrong.
    pub error: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            // Missing transactions are reported as bad requests, the same as
            // validation failures.
            Error::Validation(_) | Error::NotFound(_) => StatusCode::BAD_REQUEST,
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::SampleData(_)
            | Error::ResponseBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::Validation(message) | Error::NotFound(message) => message,
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn validation_and_not_found_are_bad_requests() {
        let validation = Error::Validation("Missing required field: amount".to_owned());
        let not_found = Error::NotFound("Transaction 7 not found".to_owned());

        assert_eq!(validation.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(not_found.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_are_internal_server_errors() {
        let response = Error::DatabaseLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_errors_are_internal_server_errors() {
        let response = Error::ResponseBody("connection reset".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert!(matches!(error, Error::NotFound(_)));
    }
}
