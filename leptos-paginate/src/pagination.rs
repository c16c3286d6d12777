use std::{
    convert::Infallible,
    fmt::{self, Debug, Formatter},
    num::NonZeroUsize,
    sync::Arc,
};

use futures::{FutureExt, Stream, StreamExt, channel::oneshot};
use leptos::prelude::ArcReadSignal;
use parking_lot::Mutex;

use crate::{
    Mergeable, Page, PageRequest, PaginationError, PaginationOptions, Sort, SortPatch, Sortable,
    observable::{Observable, Subscription},
    pagination_endpoint::{PaginationEndpoint, PaginationEndpointTrait},
    utils::new_pagination_id,
};

/// A reactive controller for a paginated, sortable and filterable listing.
///
/// Holds the current page index, [`Sort`] and query `Q`, and fetches pages from an endpoint
/// whenever any of them change. The latest accepted page and a loading flag are exposed
/// both as leptos signals ([`Pagination::page`], [`Pagination::loading`]) and as streams
/// ([`Pagination::subscribe_page`], [`Pagination::subscribe_loading`]).
///
/// Every fetch is tagged with an increasing sequence number when it's issued. A result is only
/// applied if no newer fetch has been issued since, so a slow response can never overwrite a
/// newer one, no matter the order responses arrive in.
///
/// Changing the sort or query resets to the first page.
///
/// Cloning is cheap, all clones drive the same state.
///
/// # Example
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use leptos_paginate::{Mergeable, Page, PageRequest, Pagination, Sort, SortValue, Sortable};
///
/// #[derive(Debug, Clone)]
/// struct Todo {
///     id: i64,
///     title: String,
/// }
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum TodoField {
///     Id,
///     Title,
/// }
///
/// impl Sortable for Todo {
///     type Field = TodoField;
///
///     fn sort_value(&self, field: &TodoField) -> SortValue<'_> {
///         match field {
///             TodoField::Id => SortValue::Integer(self.id),
///             TodoField::Title => SortValue::Text(&self.title),
///         }
///     }
/// }
///
/// #[derive(Debug, Clone, Default)]
/// struct TodoQuery {
///     search: String,
/// }
///
/// impl Mergeable for TodoQuery {
///     type Patch = String;
///
///     fn merge(&mut self, search: String) {
///         self.search = search;
///     }
/// }
///
/// async fn get_todos(
///     request: PageRequest<TodoField>,
///     _query: TodoQuery,
/// ) -> Result<Page<Todo>, String> {
///     Ok(Page {
///         content: vec![],
///         total_elements: 0,
///         size: request.size,
///         number: request.page_index,
///     })
/// }
///
/// let pagination: Pagination<Todo, TodoQuery> = Pagination::new(
///     get_todos,
///     Sort::asc(TodoField::Id),
///     TodoQuery::default(),
///     NonZeroUsize::new(20).unwrap(),
/// );
///
/// assert_eq!(pagination.page_size().get(), 20);
///
/// // Then from event handlers, e.g. when the sort dropdown changes:
/// // pagination.sort_by(SortPatch::new().set_order(SortOrder::Descending));
/// ```
pub struct Pagination<T, Q>
where
    T: Sortable + 'static,
    Q: 'static,
{
    inner: Arc<PaginationInner<T, Q>>,
}

impl<T, Q> Clone for Pagination<T, Q>
where
    T: Sortable + 'static,
    Q: 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, Q> Debug for Pagination<T, Q>
where
    T: Sortable + 'static,
    Q: 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Pagination")
            .field("id", &self.inner.id)
            .field("page_size", &self.inner.page_size)
            .field("options", &self.inner.options)
            .field("page_index", &state.page_index)
            .field("sort", &state.sort)
            .field("request_seq", &state.request_seq)
            .finish()
    }
}

struct PaginationInner<T, Q>
where
    T: Sortable + 'static,
    Q: 'static,
{
    id: u64,
    endpoint: PaginationEndpoint<T, Q>,
    page_size: NonZeroUsize,
    options: PaginationOptions,
    state: Mutex<State<T::Field, Q>>,
    page: Observable<Option<Page<T>>>,
    loading: Observable<bool>,
}

struct State<F, Q> {
    page_index: usize,
    sort: Sort<F>,
    query: Q,
    // Incremented once per issued fetch, only the fetch holding the current value may publish.
    request_seq: u64,
    abort_tx: Option<oneshot::Sender<()>>,
}

impl<T, Q> Pagination<T, Q>
where
    T: Sortable + Clone + Send + Sync + 'static,
    Q: Mergeable + Clone + Send + Sync + 'static,
{
    /// Create a new [`Pagination`] controller with default [`PaginationOptions`].
    ///
    /// Nothing is fetched until [`Pagination::fetch`] or another mutation is called.
    pub fn new(
        endpoint: impl PaginationEndpointTrait<T, Q> + Send + Sync + 'static,
        initial_sort: Sort<T::Field>,
        initial_query: Q,
        page_size: NonZeroUsize,
    ) -> Self {
        Self::new_with_options(
            endpoint,
            initial_sort,
            initial_query,
            page_size,
            PaginationOptions::default(),
        )
    }

    /// Create a new [`Pagination`] controller with custom [`PaginationOptions`].
    pub fn new_with_options(
        endpoint: impl PaginationEndpointTrait<T, Q> + Send + Sync + 'static,
        initial_sort: Sort<T::Field>,
        initial_query: Q,
        page_size: NonZeroUsize,
        options: PaginationOptions,
    ) -> Self {
        let self_ = Self {
            inner: Arc::new(PaginationInner {
                id: new_pagination_id(),
                endpoint: PaginationEndpoint::new(endpoint),
                page_size,
                options,
                state: Mutex::new(State {
                    page_index: 0,
                    sort: initial_sort,
                    query: initial_query,
                    request_seq: 0,
                    abort_tx: None,
                }),
                page: Observable::new(None),
                loading: Observable::new(false),
            }),
        };
        if options.fetch_on_create() {
            self_.fetch(0);
        }
        self_
    }

    /// Fetch the page at `page_index` with the current sort and query.
    ///
    /// The index isn't clamped, past the last page the endpoint will usually return an empty page.
    /// Endpoint failures don't surface here, they're logged and the previous page is kept.
    pub fn fetch(&self, page_index: usize) {
        self.issue(|state| state.page_index = page_index);
    }

    /// Merge `patch` into the current sort, then fetch the first page.
    ///
    /// Always refetches, even if the patch changes nothing.
    pub fn sort_by(&self, patch: SortPatch<T::Field>) {
        self.issue(|state| {
            state.sort.merge(patch);
            state.page_index = 0;
        });
    }

    /// Merge `patch` into the current query, then fetch the first page.
    ///
    /// Always refetches, even if the patch changes nothing.
    pub fn query_by(&self, patch: Q::Patch) {
        self.issue(|state| {
            state.query.merge(patch);
            state.page_index = 0;
        });
    }

    /// Fetch the page after the most recently requested one.
    ///
    /// Like [`Pagination::fetch`] this isn't clamped to the last page,
    /// check [`Page::has_next`] first to avoid requesting empty pages.
    /// At `usize::MAX` the index saturates, so the same page is requested again.
    pub fn next_page(&self) {
        self.issue(|state| state.page_index = state.page_index.saturating_add(1));
    }

    /// Fetch the page before the most recently requested one.
    ///
    /// Fails with [`PaginationError::NoPreviousPage`] without fetching anything
    /// if the most recently requested page is the first.
    pub fn previous_page(&self) -> Result<(), PaginationError> {
        self.try_issue(|state| {
            state.page_index = state
                .page_index
                .checked_sub(1)
                .ok_or(PaginationError::NoPreviousPage)?;
            Ok(())
        })
    }

    /// The latest accepted page, `None` until the first fetch succeeds.
    pub fn page(&self) -> ArcReadSignal<Option<Page<T>>> {
        self.inner.page.signal()
    }

    /// Whether the most recently issued fetch is still in flight.
    pub fn loading(&self) -> ArcReadSignal<bool> {
        self.inner.loading.signal()
    }

    /// A stream of accepted pages.
    ///
    /// Yields the latest page immediately if one has been accepted, then each new one.
    pub fn subscribe_page(&self) -> impl Stream<Item = Page<T>> + Unpin + Send + use<T, Q> {
        self.inner.page.subscribe().filter_map(futures::future::ready)
    }

    /// A stream of loading flag changes, starting with the current value.
    ///
    /// `true` is yielded every time a fetch is issued.
    pub fn subscribe_loading(&self) -> Subscription<bool> {
        self.inner.loading.subscribe()
    }

    /// The most recently requested page index.
    pub fn page_index(&self) -> usize {
        self.inner.state.lock().page_index
    }

    /// The fixed number of items requested per page.
    pub fn page_size(&self) -> NonZeroUsize {
        self.inner.page_size
    }

    /// The current sort.
    pub fn sort(&self) -> Sort<T::Field> {
        self.inner.state.lock().sort.clone()
    }

    /// The current query.
    pub fn query(&self) -> Q {
        self.inner.state.lock().query.clone()
    }

    /// The options this controller was created with.
    pub fn options(&self) -> PaginationOptions {
        self.inner.options
    }

    fn issue(&self, update: impl FnOnce(&mut State<T::Field, Q>)) {
        let Ok(()) = self.try_issue::<Infallible>(|state| {
            update(state);
            Ok(())
        });
    }

    /// Nothing is issued if `update` fails, it's checked and applied under the same lock.
    fn try_issue<E>(
        &self,
        update: impl FnOnce(&mut State<T::Field, Q>) -> Result<(), E>,
    ) -> Result<(), E> {
        let inner = &self.inner;

        let (seq, request, query, maybe_abort_rx) = {
            let mut state = inner.state.lock();
            update(&mut *state)?;
            state.request_seq += 1;
            let seq = state.request_seq;

            // Stop the superseded fetch if it's abortable and still running:
            if let Some(abort_tx) = state.abort_tx.take() {
                let _ = abort_tx.send(());
            }
            let maybe_abort_rx = if inner.options.abort_superseded() {
                let (abort_tx, abort_rx) = oneshot::channel();
                state.abort_tx = Some(abort_tx);
                Some(abort_rx)
            } else {
                None
            };

            let request = PageRequest {
                page_index: state.page_index,
                size: inner.page_size.get(),
                sort: Some(state.sort.clone()),
            };
            tracing::debug!(
                pagination_id = inner.id,
                seq,
                page_index = request.page_index,
                size = request.size,
                "issuing page fetch"
            );

            // Published under the state lock so emissions follow issuance order:
            inner.loading.publish(true);

            (seq, request, state.query.clone(), maybe_abort_rx)
        };

        // Outside the lock, the endpoint may read the controller:
        let fetch = inner.endpoint.fetch_page(request, query);
        let inner = inner.clone();
        let started_at = chrono::Utc::now();
        leptos::task::spawn(async move {
            let maybe_result = if let Some(abort_rx) = maybe_abort_rx {
                futures::select!(
                    result = fetch.fuse() => Some(result),
                    _ = abort_rx.fuse() => None,
                )
            } else {
                Some(fetch.await)
            };

            if let Some(result) = maybe_result {
                inner.resolve(seq, result, started_at);
            } else {
                tracing::trace!(
                    pagination_id = inner.id,
                    seq,
                    "superseded page fetch aborted"
                );
            }
        });
        Ok(())
    }
}

impl<T, Q> PaginationInner<T, Q>
where
    T: Sortable + Clone + Send + Sync + 'static,
    Q: 'static,
{
    fn resolve(
        &self,
        seq: u64,
        result: Result<Page<T>, PaginationError>,
        started_at: chrono::DateTime<chrono::Utc>,
    ) {
        let mut state = self.state.lock();
        if state.request_seq != seq {
            tracing::trace!(
                pagination_id = self.id,
                seq,
                latest_seq = state.request_seq,
                "discarding stale page fetch result"
            );
            return;
        }
        state.abort_tx = None;

        let elapsed_ms = (chrono::Utc::now() - started_at).num_milliseconds();
        match result {
            Ok(page) => {
                tracing::debug!(
                    pagination_id = self.id,
                    seq,
                    number = page.number,
                    total_elements = page.total_elements,
                    elapsed_ms,
                    "page fetch accepted"
                );
                self.page.publish(Some(page));
            }
            Err(e) => {
                tracing::warn!(
                    pagination_id = self.id,
                    seq,
                    elapsed_ms,
                    error = %e,
                    "page fetch failed, keeping the previous page"
                );
            }
        }
        self.loading.publish(false);
    }
}
