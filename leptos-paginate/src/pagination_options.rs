/// Configuration for a [`crate::Pagination`] controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationOptions {
    abort_superseded: bool,
    fetch_on_create: bool,
}

impl PaginationOptions {
    /// Create new [`PaginationOptions`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the in-flight endpoint future as soon as a newer fetch is issued.
    ///
    /// Without this, a superseded fetch runs to completion and its result is ignored.
    /// Enable it when the endpoint is expensive, e.g. a network request.
    ///
    /// Default: `false`
    pub fn set_abort_superseded(mut self, abort_superseded: bool) -> Self {
        self.abort_superseded = abort_superseded;
        self
    }

    /// Issue a fetch for the first page as soon as the controller is created.
    ///
    /// Default: `false`
    pub fn set_fetch_on_create(mut self, fetch_on_create: bool) -> Self {
        self.fetch_on_create = fetch_on_create;
        self
    }

    /// Whether superseded in-flight fetches are dropped.
    ///
    /// Default: `false`
    pub fn abort_superseded(&self) -> bool {
        self.abort_superseded
    }

    /// Whether the first page is fetched on creation.
    ///
    /// Default: `false`
    pub fn fetch_on_create(&self) -> bool {
        self.fetch_on_create
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = PaginationOptions::new();
        assert!(!options.abort_superseded());
        assert!(!options.fetch_on_create());

        let options = options
            .set_abort_superseded(true)
            .set_fetch_on_create(true);
        assert!(options.abort_superseded());
        assert!(options.fetch_on_create());

        assert!(!options.set_abort_superseded(false).abort_superseded());
    }
}
