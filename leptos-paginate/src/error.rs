/// A boxed error as returned by a failing [`crate::Pagination`] endpoint.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while paginating.
#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    /// The endpoint future resolved to an error.
    #[error("page endpoint failed: {0}")]
    Endpoint(#[source] BoxError),

    /// [`crate::Pagination::previous_page`] was called while already on the first page.
    #[error("already on the first page, there is no previous page to fetch")]
    NoPreviousPage,
}
