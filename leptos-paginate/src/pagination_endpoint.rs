use std::{
    fmt::{self, Debug, Formatter},
    future::Future,
    pin::Pin,
    sync::Arc,
};

use crate::{BoxError, Page, PageRequest, PaginationError, Sortable};

type BoxedFetch<T> = Pin<Box<dyn Future<Output = Result<Page<T>, PaginationError>> + Send>>;

/// A data source that serves pages of `T` filtered by a query `Q`.
///
/// Implemented for any `Fn(PageRequest<T::Field>, Q) -> Fut` where `Fut` resolves to
/// `Result<Page<T>, E>` and `E` converts into a [`BoxError`], so plain async closures
/// and functions can be passed to [`crate::Pagination::new`] directly.
///
/// The endpoint should echo [`PageRequest::page_index`] in [`Page::number`] and
/// [`PageRequest::size`] in [`Page::size`], this isn't enforced.
pub trait PaginationEndpointTrait<T, Q>
where
    T: Sortable + 'static,
    Q: 'static,
{
    /// Fetch the page described by `request` under `query`.
    fn fetch_page(
        &self,
        request: PageRequest<T::Field>,
        query: Q,
    ) -> impl Future<Output = Result<Page<T>, PaginationError>> + Send + 'static;
}

impl<T, Q, Func, Fut, E> PaginationEndpointTrait<T, Q> for Func
where
    T: Sortable + 'static,
    Q: 'static,
    Func: Fn(PageRequest<T::Field>, Q) -> Fut + 'static,
    Fut: Future<Output = Result<Page<T>, E>> + Send + 'static,
    E: Into<BoxError>,
{
    fn fetch_page(
        &self,
        request: PageRequest<T::Field>,
        query: Q,
    ) -> impl Future<Output = Result<Page<T>, PaginationError>> + Send + 'static {
        let fut = self(request, query);
        async move { fut.await.map_err(|e| PaginationError::Endpoint(e.into())) }
    }
}

/// The type-erased endpoint held by a controller for its whole lifetime.
pub(crate) struct PaginationEndpoint<T, Q>
where
    T: Sortable,
{
    fetch: Arc<dyn Fn(PageRequest<T::Field>, Q) -> BoxedFetch<T> + Send + Sync>,
}

impl<T, Q> Debug for PaginationEndpoint<T, Q>
where
    T: Sortable,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationEndpoint")
            .field(
                "fetch",
                &"Arc<dyn Fn(PageRequest, Q) -> Pin<Box<dyn Future<Output = Result<Page<T>, PaginationError>>>>",
            )
            .finish()
    }
}

impl<T, Q> PaginationEndpoint<T, Q>
where
    T: Sortable + 'static,
    Q: 'static,
{
    pub fn new(endpoint: impl PaginationEndpointTrait<T, Q> + Send + Sync + 'static) -> Self {
        Self {
            fetch: Arc::new(move |request, query| Box::pin(endpoint.fetch_page(request, query))),
        }
    }

    pub fn fetch_page(&self, request: PageRequest<T::Field>, query: Q) -> BoxedFetch<T> {
        (self.fetch)(request, query)
    }
}
