use crate::Sort;

/// The request handed to a [`crate::Pagination`] endpoint.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    /// The requested page, starting from 0.
    pub page_index: usize,
    /// The maximum number of items per page.
    pub size: usize,
    /// The ordering to apply before slicing out the page.
    pub sort: Option<Sort<F>>,
}

impl<F> PageRequest<F> {
    /// The index of the first item on the requested page.
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.size)
    }
}

/// A single page of items, as returned by a [`crate::Pagination`] endpoint.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The items on this page, in order.
    pub content: Vec<T>,
    /// The number of items matching the query across all pages.
    pub total_elements: usize,
    /// The page size the page was requested with.
    pub size: usize,
    /// The index of this page, echoing [`PageRequest::page_index`].
    pub number: usize,
}

impl<T> Page<T> {
    /// The number of pages needed to hold [`Page::total_elements`].
    pub fn total_pages(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            self.total_elements.div_ceil(self.size)
        }
    }

    /// Whether this page has no items, e.g. when requested past the last page.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether a page exists after this one.
    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages()
    }

    /// Whether a page exists before this one.
    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    /// Map the items while preserving the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            size: self.size,
            number: self.number,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    fn page(total_elements: usize, size: usize, number: usize) -> Page<()> {
        Page {
            content: vec![],
            total_elements,
            size,
            number,
        }
    }

    #[rstest]
    #[case(12, 5, 3)]
    #[case(10, 5, 2)]
    #[case(0, 5, 0)]
    #[case(1, 5, 1)]
    #[case(7, 0, 0)]
    fn test_total_pages(#[case] total: usize, #[case] size: usize, #[case] expected: usize) {
        assert_eq!(page(total, size, 0).total_pages(), expected);
    }

    #[test]
    fn test_navigation_bounds() {
        let first = page(12, 5, 0);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = page(12, 5, 2);
        assert!(last.has_previous());
        assert!(!last.has_next());

        // Past the end, still no next:
        assert!(!page(12, 5, 9).has_next());
        assert!(!page(0, 5, 0).has_next());
        assert!(!page(12, 5, usize::MAX).has_next());
        assert!(page(12, 5, usize::MAX).has_previous());
        assert!(!page(usize::MAX, 1, usize::MAX).has_next());
    }

    #[test]
    fn test_offset_saturates() {
        let request = PageRequest::<()> {
            page_index: 3,
            size: 5,
            sort: None,
        };
        assert_eq!(request.offset(), 15);

        let request = PageRequest::<()> {
            page_index: usize::MAX,
            size: 5,
            sort: None,
        };
        assert_eq!(request.offset(), usize::MAX);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let mapped = Page {
            content: vec![1, 2],
            total_elements: 7,
            size: 2,
            number: 1,
        }
        .map(|v| v * 10);
        assert_eq!(mapped.content, vec![10, 20]);
        assert_eq!((mapped.total_elements, mapped.size, mapped.number), (7, 2, 1));
    }
}
