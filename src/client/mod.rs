//! The client side of the transaction API.
//!
//! A [TransactionCache] holds the full transaction set that a dashboard
//! displays. It talks to the server through the [TransactionApi] trait, which
//! [HttpTransactionApi] implements over HTTP, and derives the list, summary,
//! chart and export data from its local copy.

mod api;
mod cache;
mod export;

pub use api::{HttpTransactionApi, TransactionApi};
pub use cache::{RefreshOutcome, TransactionCache};

/// The errors that may occur when calling the transaction API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("could not reach the server: {0}")]
    Http(#[from] reqwest::Error),

    /// The server responded with a non-success status.
    ///
    /// `message` is the server's error message, or a generic message if the
    /// response did not include one.
    #[error("{message}")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The error message to show to the user.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("could not decode the server response: {0}")]
    Decode(String),

    /// The transactions could not be written as CSV.
    #[error("could not export transactions: {0}")]
    Export(String),

    /// An error from a [crate::TransactionService] used directly as the API.
    #[error(transparent)]
    Service(#[from] crate::Error),
}
