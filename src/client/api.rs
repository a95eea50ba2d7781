//! The transaction API as seen by a client.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    ErrorBody,
    client::ClientError,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    summary::Summary,
    transaction::{CleanupReport, Transaction, TransactionInput, TransactionService},
};

/// The operations the server offers on transactions.
#[async_trait]
pub trait TransactionApi: Send + Sync {
    /// Fetch every transaction.
    async fn list(&self) -> Result<Vec<Transaction>, ClientError>;

    /// Create a transaction and return it as stored.
    async fn add(&self, input: &TransactionInput) -> Result<Transaction, ClientError>;

    /// Replace every field of the transaction `id`.
    async fn update(
        &self,
        id: TransactionId,
        input: &TransactionInput,
    ) -> Result<Transaction, ClientError>;

    /// Delete the transaction `id`.
    async fn remove(&self, id: TransactionId) -> Result<(), ClientError>;

    /// Fetch the income, expense and category totals.
    async fn monthly_summary(&self) -> Result<Summary, ClientError>;

    /// Delete duplicate transactions on the server.
    async fn remove_duplicates(&self) -> Result<CleanupReport, ClientError>;
}

/// Calls the transaction API of a server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransactionApi {
    client: Client,
    base_url: String,
}

impl HttpTransactionApi {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client that sends its requests with `client`.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn non-success responses into [ClientError::Api].
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await?;
    let message = match serde_json::from_slice::<ErrorBody>(&body) {
        Ok(ErrorBody { error }) => error,
        Err(_) => format!("HTTP error! status: {}", status.as_u16()),
    };

    tracing::debug!("Request failed with status {status}: {message}");

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    let body = response.bytes().await?;

    serde_json::from_slice(&body).map_err(|error| ClientError::Decode(error.to_string()))
}

#[async_trait]
impl TransactionApi for HttpTransactionApi {
    async fn list(&self) -> Result<Vec<Transaction>, ClientError> {
        let response = self.client.get(self.url(endpoints::TRANSACTIONS)).send().await?;

        decode(response).await
    }

    async fn add(&self, input: &TransactionInput) -> Result<Transaction, ClientError> {
        let response = self
            .client
            .post(self.url(endpoints::TRANSACTIONS))
            .json(input)
            .send()
            .await?;

        decode(response).await
    }

    async fn update(
        &self,
        id: TransactionId,
        input: &TransactionInput,
    ) -> Result<Transaction, ClientError> {
        let path = format_endpoint(endpoints::TRANSACTION, id);
        let response = self.client.put(self.url(&path)).json(input).send().await?;

        decode(response).await
    }

    async fn remove(&self, id: TransactionId) -> Result<(), ClientError> {
        let path = format_endpoint(endpoints::TRANSACTION, id);
        let response = self.client.delete(self.url(&path)).send().await?;

        check_status(response).await.map(|_| ())
    }

    async fn monthly_summary(&self) -> Result<Summary, ClientError> {
        let response = self
            .client
            .get(self.url(endpoints::MONTHLY_SUMMARY))
            .send()
            .await?;

        decode(response).await
    }

    async fn remove_duplicates(&self) -> Result<CleanupReport, ClientError> {
        let response = self
            .client
            .post(self.url(endpoints::CLEANUP_DUPLICATES))
            .send()
            .await?;

        decode(response).await
    }
}

/// Uses the service in-process, without a server in between.
#[async_trait]
impl TransactionApi for TransactionService {
    async fn list(&self) -> Result<Vec<Transaction>, ClientError> {
        Ok(TransactionService::list(self)?)
    }

    async fn add(&self, input: &TransactionInput) -> Result<Transaction, ClientError> {
        Ok(TransactionService::add(self, input.clone())?)
    }

    async fn update(
        &self,
        id: TransactionId,
        input: &TransactionInput,
    ) -> Result<Transaction, ClientError> {
        Ok(TransactionService::update(self, id, input.clone())?)
    }

    async fn remove(&self, id: TransactionId) -> Result<(), ClientError> {
        Ok(TransactionService::remove(self, id)?)
    }

    async fn monthly_summary(&self) -> Result<Summary, ClientError> {
        Ok(TransactionService::monthly_summary(self)?)
    }

    async fn remove_duplicates(&self) -> Result<CleanupReport, ClientError> {
        let removed_count = TransactionService::remove_duplicates(self)?;

        Ok(CleanupReport::new(removed_count))
    }
}
