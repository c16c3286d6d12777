#![allow(clippy::type_complexity)]
#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod error;
mod observable;
mod page;
mod pagination;
mod pagination_endpoint;
mod pagination_options;
mod sort;
mod utils;

pub use error::*;
pub use observable::Subscription;
pub use page::*;
pub use pagination::*;
pub use pagination_endpoint::PaginationEndpointTrait;
pub use pagination_options::*;
pub use sort::*;
