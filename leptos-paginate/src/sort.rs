use std::{cmp::Ordering, fmt::Debug};

/// Types that can be partially updated with a patch value.
///
/// [`crate::Pagination::query_by`] requires the query type to implement this,
/// the patch is merged field by field, unspecified fields are left as they were.
///
/// # Example
///
/// ```
/// use leptos_paginate::Mergeable;
///
/// #[derive(Clone, Default)]
/// struct TodoQuery {
///     search: String,
///     done: Option<bool>,
/// }
///
/// #[derive(Default)]
/// struct TodoQueryPatch {
///     search: Option<String>,
///     done: Option<Option<bool>>,
/// }
///
/// impl Mergeable for TodoQuery {
///     type Patch = TodoQueryPatch;
///
///     fn merge(&mut self, patch: TodoQueryPatch) {
///         if let Some(search) = patch.search {
///             self.search = search;
///         }
///         if let Some(done) = patch.done {
///             self.done = done;
///         }
///     }
/// }
/// ```
pub trait Mergeable {
    /// The partial form of `Self`.
    type Patch;

    /// Merge the fields set in `patch` into `self`.
    fn merge(&mut self, patch: Self::Patch);
}

/// Items that can be ordered by one of a closed set of fields.
pub trait Sortable {
    /// The fields items can be sorted by, usually a fieldless enum.
    type Field: Debug + Clone + PartialEq + Send + Sync + 'static;

    /// The value of `field` for this item, used to pick the comparator.
    fn sort_value(&self, field: &Self::Field) -> SortValue<'_>;
}

/// A comparable value extracted from an item by [`Sortable::sort_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortValue<'a> {
    /// Compared case-insensitively.
    Text(&'a str),
    /// Compared numerically.
    Integer(i64),
    /// Compared chronologically.
    Date(chrono::NaiveDate),
}

impl SortValue<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Text(_) => 0,
            SortValue::Integer(_) => 1,
            SortValue::Date(_) => 2,
        }
    }

    /// Compare two values in ascending order.
    ///
    /// Values of different kinds never compare equal, they're ordered by kind.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (SortValue::Integer(a), SortValue::Integer(b)) => a.cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// The direction of a [`Sort`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortOrder {
    /// Apply this direction to an ascending ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// The active ordering of a paginated listing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sort<F> {
    /// The field to order by.
    pub property: F,
    /// The direction to order in.
    pub order: SortOrder,
}

impl<F> Sort<F> {
    /// Create a new [`Sort`].
    pub fn new(property: F, order: SortOrder) -> Self {
        Self { property, order }
    }

    /// Ascending by `property`.
    pub fn asc(property: F) -> Self {
        Self::new(property, SortOrder::Ascending)
    }

    /// Descending by `property`.
    pub fn desc(property: F) -> Self {
        Self::new(property, SortOrder::Descending)
    }

    /// Compare two items according to this sort.
    pub fn compare<T>(&self, a: &T, b: &T) -> Ordering
    where
        T: Sortable<Field = F>,
    {
        self.order.apply(
            a.sort_value(&self.property)
                .compare(&b.sort_value(&self.property)),
        )
    }
}

/// A partial [`Sort`], passed to [`crate::Pagination::sort_by`].
///
/// Unset fields keep their current value when merged.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortPatch<F> {
    /// Replaces [`Sort::property`] if set.
    pub property: Option<F>,
    /// Replaces [`Sort::order`] if set.
    pub order: Option<SortOrder>,
}

impl<F> Default for SortPatch<F> {
    fn default() -> Self {
        Self {
            property: None,
            order: None,
        }
    }
}

impl<F> SortPatch<F> {
    /// An empty patch, merging it changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the property to sort by.
    pub fn set_property(mut self, property: F) -> Self {
        self.property = Some(property);
        self
    }

    /// Set the direction to sort in.
    pub fn set_order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }
}

impl<F> Mergeable for Sort<F> {
    type Patch = SortPatch<F>;

    fn merge(&mut self, patch: SortPatch<F>) {
        if let Some(property) = patch.property {
            self.property = property;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }
}
