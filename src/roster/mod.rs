//! Donor roster aggregation: search, enrichment, ordering and pagination
//! over a store that only offers filtered and keyed reads.

pub mod merge;
pub mod paginate;
pub mod predicate;
pub mod service;
pub mod sort;

pub use merge::merge_statistics;
pub use paginate::{page_offset, paginate, total_pages};
pub use predicate::{SearchPredicate, SEARCH_FIELDS};
pub use service::RosterService;
pub use sort::{sort_rows, RosterComparator};
