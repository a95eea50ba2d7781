//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;

use crate::transaction::TransactionService;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The service that stores and summarizes transactions.
    pub transaction_service: TransactionService,
}

impl AppState {
    /// Create a new [AppState] around an opened [TransactionService].
    pub fn new(transaction_service: TransactionService) -> Self {
        Self {
            transaction_service,
        }
    }
}

// Lets handlers take `State<TransactionService>` directly.
impl FromRef<AppState> for TransactionService {
    fn from_ref(state: &AppState) -> Self {
        state.transaction_service.clone()
    }
}
