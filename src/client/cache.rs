//! The in-memory mirror of the transaction set held by a dashboard.

use std::{
    collections::BTreeSet,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use time::Date;

use crate::{
    client::{ClientError, TransactionApi, export::write_csv},
    database_id::TransactionId,
    filter::{TransactionFilter, filter_and_sort},
    summary::{CategoryShare, Summary, category_breakdown, summarize},
    transaction::{Transaction, TransactionInput, TransactionType},
};

/// Whether the result of a refresh was applied to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cache now holds the fetched transactions.
    Applied,
    /// A newer refresh was started while this one was in flight, so its
    /// result was discarded.
    Superseded,
}

#[derive(Debug)]
struct CacheState {
    transactions: Arc<[Transaction]>,
    last_error: Option<String>,
}

/// Holds the transactions fetched through a [TransactionApi] and derives the
/// list, summary and chart data from them.
///
/// Mutations go through the API first and are applied locally only once the
/// API call succeeds. Readers get an immutable snapshot, so they never see a
/// partially applied change.
#[derive(Debug)]
pub struct TransactionCache<A> {
    api: A,
    state: Mutex<CacheState>,
    latest_refresh: AtomicU64,
    refreshes_in_flight: AtomicUsize,
}

/// Marks a refresh as in flight until dropped.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<A: TransactionApi> TransactionCache<A> {
    /// Create an empty cache. Call [TransactionCache::refresh] to load the
    /// transactions.
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Mutex::new(CacheState {
                transactions: Arc::from(Vec::new()),
                last_error: None,
            }),
            latest_refresh: AtomicU64::new(0),
            refreshes_in_flight: AtomicUsize::new(0),
        }
    }

    // The state is only ever replaced wholesale, so a poisoned lock still
    // holds a consistent value.
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_error(&self, error: &ClientError) {
        tracing::error!("Transaction API call failed: {error}");
        self.lock_state().last_error = Some(error.to_string());
    }

    fn replace_transactions(&self, update: impl FnOnce(&[Transaction]) -> Vec<Transaction>) {
        let mut state = self.lock_state();
        let transactions = update(&state.transactions);
        state.transactions = transactions.into();
    }

    /// Replace the local transactions with a fresh copy from the API.
    ///
    /// If another refresh is started before this one completes, only the
    /// most recently started refresh is applied and this one returns
    /// [RefreshOutcome::Superseded].
    ///
    /// # Errors
    /// Returns the API error if the latest refresh fails. The previous
    /// transactions are kept and the error is recorded in
    /// [TransactionCache::last_error].
    pub async fn refresh(&self) -> Result<RefreshOutcome, ClientError> {
        let sequence = self.latest_refresh.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::new(&self.refreshes_in_flight);

        self.lock_state().last_error = None;

        let result = self.api.list().await;

        let mut state = self.lock_state();

        if sequence != self.latest_refresh.load(Ordering::SeqCst) {
            tracing::debug!("Discarding result of superseded refresh {sequence}");
            return Ok(RefreshOutcome::Superseded);
        }

        match result {
            Ok(transactions) => {
                tracing::debug!("Refresh {sequence} loaded {} transactions", transactions.len());
                state.transactions = transactions.into();
                Ok(RefreshOutcome::Applied)
            }
            Err(error) => {
                tracing::error!("Could not refresh transactions: {error}");
                state.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Create a transaction and append it to the local transactions.
    ///
    /// # Errors
    /// Returns the API error, which is also recorded in
    /// [TransactionCache::last_error]. The local transactions are unchanged.
    pub async fn add(&self, input: &TransactionInput) -> Result<Transaction, ClientError> {
        let created = self
            .api
            .add(input)
            .await
            .inspect_err(|error| self.record_error(error))?;

        self.replace_transactions(|transactions| {
            let mut transactions = transactions.to_vec();
            transactions.push(created.clone());
            transactions
        });

        Ok(created)
    }

    /// Update a transaction and replace the local copy with the server's
    /// version.
    ///
    /// # Errors
    /// Returns the API error, which is also recorded in
    /// [TransactionCache::last_error]. The local transactions are unchanged.
    pub async fn update(
        &self,
        id: TransactionId,
        input: &TransactionInput,
    ) -> Result<Transaction, ClientError> {
        let updated = self
            .api
            .update(id, input)
            .await
            .inspect_err(|error| self.record_error(error))?;

        self.replace_transactions(|transactions| {
            transactions
                .iter()
                .map(|transaction| {
                    if transaction.id == id {
                        updated.clone()
                    } else {
                        transaction.clone()
                    }
                })
                .collect()
        });

        Ok(updated)
    }

    /// Delete a transaction and remove it from the local transactions.
    ///
    /// # Errors
    /// Returns the API error, which is also recorded in
    /// [TransactionCache::last_error]. The local transactions are unchanged.
    pub async fn remove(&self, id: TransactionId) -> Result<(), ClientError> {
        self.api
            .remove(id)
            .await
            .inspect_err(|error| self.record_error(error))?;

        self.replace_transactions(|transactions| {
            transactions
                .iter()
                .filter(|transaction| transaction.id != id)
                .cloned()
                .collect()
        });

        Ok(())
    }

    /// Delete duplicate transactions on the server and reload the local
    /// transactions.
    ///
    /// Returns the number of deleted transactions.
    ///
    /// # Errors
    /// Returns the error of the clean up or the following refresh, which is
    /// also recorded in [TransactionCache::last_error].
    pub async fn cleanup_duplicates(&self) -> Result<usize, ClientError> {
        let report = self
            .api
            .remove_duplicates()
            .await
            .inspect_err(|error| self.record_error(error))?;

        tracing::info!("{}", report.message);

        self.refresh().await?;

        Ok(report.removed_count)
    }

    /// A snapshot of the local transactions in the order they were loaded.
    pub fn transactions(&self) -> Arc<[Transaction]> {
        self.lock_state().transactions.clone()
    }

    /// The message of the most recent failed API call, cleared when a
    /// refresh starts.
    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Whether a refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.refreshes_in_flight.load(Ordering::SeqCst) > 0
    }

    /// The transactions that match `filter`, most recent first.
    pub fn filtered(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let transactions = self.transactions();

        filter_and_sort(&transactions, filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The totals of the transactions that match `filter`.
    pub fn summary(&self, filter: &TransactionFilter) -> Summary {
        let transactions = self.transactions();

        summarize(filter_and_sort(&transactions, filter))
    }

    /// The transactions in the calendar month of `today`, most recent first.
    ///
    /// Pass the result to [crate::summarize] for the month's totals. Unlike
    /// the server's monthly summary, this only covers one month.
    pub fn current_month(&self, today: Date) -> Vec<Transaction> {
        self.filtered(&TransactionFilter::month_of(today))
    }

    /// The per-category totals of one transaction type, largest first.
    pub fn category_breakdown(&self, kind: TransactionType) -> Vec<CategoryShare> {
        category_breakdown(self.transactions().iter(), kind)
    }

    /// The distinct category names, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.transactions()
            .iter()
            .map(|transaction| transaction.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The transaction with the latest date, if there are any transactions.
    ///
    /// Of several transactions on the latest date, the first loaded is returned.
    pub fn most_recent(&self) -> Option<Transaction> {
        filter_and_sort(&self.transactions(), &TransactionFilter::default())
            .first()
            .map(|transaction| (*transaction).clone())
    }

    /// The transactions that match `filter` as CSV, most recent first.
    ///
    /// Returns `None` if no transactions match.
    ///
    /// # Errors
    /// Returns [ClientError::Export] if the CSV cannot be written.
    pub fn export_csv(&self, filter: &TransactionFilter) -> Result<Option<String>, ClientError> {
        let transactions = self.transactions();
        let matching = filter_and_sort(&transactions, filter);

        if matching.is_empty() {
            return Ok(None);
        }

        write_csv(matching).map(Some)
    }

    /// The API the cache calls.
    pub fn api(&self) -> &A {
        &self.api
    }
}
