//! Debounced product search for the search overlay.
//!
//! [`SearchBar`] owns the overlay's state: the query text, the latest
//! results, a loading flag and whether the overlay is shown. Each
//! [`set_query`](SearchBar::set_query) restarts a quiet-period timer; only
//! when typing settles is the query sent to the catalog. An empty query
//! resets to [`SearchStatus::Idle`] immediately without touching the network.
//!
//! New input aborts any in-flight request, and every request carries a
//! generation number so a response that races with newer input is dropped
//! instead of overwriting fresher state.

mod debounce;

use std::sync::{Arc, Weak};
use std::time::Duration;

use tienda_core::Product;
use tokio::sync::watch;
use tracing::{debug, instrument};

pub use debounce::Debouncer;

use crate::catalog::CatalogSource;
use crate::config::DEFAULT_SEARCH_DEBOUNCE;

/// Where the search overlay is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// Empty query, no results.
    #[default]
    Idle,
    /// Waiting for typing to settle or for the response.
    Pending,
    /// Response applied; results may be empty.
    Loaded,
    /// The request failed; results are empty.
    Error,
}

/// Everything the overlay renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: Vec<Product>,
    pub loading: bool,
    pub visible: bool,
    pub status: SearchStatus,
    generation: u64,
}

/// Handle to a search overlay's state.
///
/// Cheaply cloneable; clones share state. Dropping the last clone cancels
/// any pending search.
pub struct SearchBar<C> {
    inner: Arc<SearchInner<C>>,
}

impl<C> Clone for SearchBar<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SearchInner<C> {
    catalog: Arc<C>,
    debouncer: Debouncer,
    state: watch::Sender<SearchSnapshot>,
}

impl<C: CatalogSource + 'static> SearchBar<C> {
    /// Create a search bar with the default 300 ms quiet period.
    #[must_use]
    pub fn new(catalog: Arc<C>) -> Self {
        Self::with_debounce(catalog, DEFAULT_SEARCH_DEBOUNCE)
    }

    /// Create a search bar with a custom quiet period.
    #[must_use]
    pub fn with_debounce(catalog: Arc<C>, quiet_period: Duration) -> Self {
        let (state, _rx) = watch::channel(SearchSnapshot::default());
        Self {
            inner: Arc::new(SearchInner {
                catalog,
                debouncer: Debouncer::new(quiet_period),
                state,
            }),
        }
    }

    /// Update the query text.
    ///
    /// Blank text clears results and returns to idle at once. Anything else
    /// (re)starts the quiet-period timer; results from the previous query
    /// stay visible until the new response arrives.
    ///
    /// # Panics
    ///
    /// Panics if called with non-blank text outside a Tokio runtime.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let search_text = text.trim().to_string();
        let weak: Weak<SearchInner<C>> = Arc::downgrade(&self.inner);

        // The generation bump and the job it tags are swapped in under the
        // debouncer lock, so concurrent clones cannot leave a job scheduled
        // for a query that is no longer current.
        self.inner.debouncer.schedule_with(|| {
            let mut generation = 0;
            self.inner.state.send_modify(|state| {
                state.generation += 1;
                generation = state.generation;
                state.query = text;
                state.loading = false;
                if search_text.is_empty() {
                    state.results.clear();
                    state.status = SearchStatus::Idle;
                } else {
                    state.status = SearchStatus::Pending;
                }
            });

            if search_text.is_empty() {
                return None;
            }
            Some(async move {
                if let Some(inner) = weak.upgrade() {
                    inner.run_search(search_text, generation).await;
                }
            })
        });
    }

    /// Current query text.
    #[must_use]
    pub fn query(&self) -> String {
        self.inner.state.borrow().query.clone()
    }

    /// Latest results.
    #[must_use]
    pub fn results(&self) -> Vec<Product> {
        self.inner.state.borrow().results.clone()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Current request-cycle status.
    #[must_use]
    pub fn status(&self) -> SearchStatus {
        self.inner.state.borrow().status
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner.state.borrow().visible
    }

    /// Show or hide the overlay.
    pub fn set_visible(&self, visible: bool) {
        self.inner.state.send_if_modified(|state| {
            let changed = state.visible != visible;
            state.visible = visible;
            changed
        });
    }

    /// Hide the overlay and reset the query.
    pub fn close(&self) {
        self.set_query(String::new());
        self.set_visible(false);
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.state.subscribe()
    }
}

impl<C: CatalogSource> SearchInner<C> {
    #[instrument(skip(self))]
    async fn run_search(&self, text: String, generation: u64) {
        let started = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.loading = true;
            true
        });
        if !started {
            return;
        }

        let outcome = self.catalog.search_products(&text).await;
        if let Err(e) = &outcome {
            tracing::error!(error = %e, "Error fetching products");
        }

        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.loading = false;
            match outcome {
                Ok(products) => {
                    state.results = products;
                    state.status = SearchStatus::Loaded;
                }
                Err(_) => {
                    state.results.clear();
                    state.status = SearchStatus::Error;
                }
            }
            true
        });
        if !applied {
            debug!("Discarded search response for superseded query");
        }
    }
}
