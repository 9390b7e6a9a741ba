//! Ordering of enriched donor rows.
//!
//! Text columns use a fixed collation: Unicode-lowercased strings compared by
//! code point, with the raw strings compared by code point when the lowercased
//! forms are equal. A missing text value is the empty string, so it sorts
//! first ascending and last descending.
//!
//! Numeric and temporal columns compare by value. A missing value counts as
//! +inf ascending and -inf descending, so it always lands at the end of the
//! ordering whichever direction is requested.
//!
//! Rows whose sort values are equal keep their input order.

use crate::models::{DonorRow, SortDirection, SortField, SortSpec};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Sort value of one row for one column, extracted once before sorting
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Text { folded: String, raw: String },
    Timestamp(Option<DateTime<Utc>>),
    Count(Option<u64>),
    Amount(Option<Decimal>),
}

impl SortKey {
    fn extract(row: &DonorRow, field: SortField) -> Self {
        let profile = &row.profile;
        match field {
            SortField::Email => Self::text(Some(profile.email.as_str())),
            SortField::FirstName => Self::text(profile.first_name.as_deref()),
            SortField::LastName => Self::text(profile.last_name.as_deref()),
            SortField::DisplayName => Self::text(profile.display_name.as_deref()),
            SortField::LastLogin => SortKey::Timestamp(profile.last_login),
            SortField::CreatedAt => SortKey::Timestamp(profile.created_at),
            SortField::PledgeCount => SortKey::Count(Some(row.pledge_count)),
            SortField::TotalDonated => SortKey::Amount(Some(row.total_donated)),
        }
    }

    fn text(value: Option<&str>) -> Self {
        let raw = value.unwrap_or_default();
        SortKey::Text {
            folded: raw.to_lowercase(),
            raw: raw.to_string(),
        }
    }
}

/// Total-order comparator over donor rows for one [`SortSpec`]
#[derive(Debug, Clone, Copy)]
pub struct RosterComparator {
    spec: SortSpec,
}

impl RosterComparator {
    pub fn new(spec: SortSpec) -> Self {
        Self { spec }
    }

    /// Compare two rows under this comparator's column and direction
    pub fn compare(&self, a: &DonorRow, b: &DonorRow) -> Ordering {
        let field = self.spec.field;
        self.compare_keys(&SortKey::extract(a, field), &SortKey::extract(b, field))
    }

    /// Sort rows; equal rows keep their relative order
    pub fn sort(&self, rows: Vec<DonorRow>) -> Vec<DonorRow> {
        let field = self.spec.field;
        let mut keyed: Vec<(SortKey, DonorRow)> = rows
            .into_iter()
            .map(|row| (SortKey::extract(&row, field), row))
            .collect();

        // slice::sort_by is stable
        keyed.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));

        keyed.into_iter().map(|(_, row)| row).collect()
    }

    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        let direction = self.spec.direction;
        match (a, b) {
            (
                SortKey::Text { folded: fa, raw: ra },
                SortKey::Text { folded: fb, raw: rb },
            ) => apply_direction(fa.cmp(fb).then_with(|| ra.cmp(rb)), direction),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => nulls_last(a, b, direction),
            (SortKey::Count(a), SortKey::Count(b)) => nulls_last(a, b, direction),
            (SortKey::Amount(a), SortKey::Amount(b)) => nulls_last(a, b, direction),
            // keys always come from the same column
            _ => Ordering::Equal,
        }
    }
}

fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => apply_direction(a.cmp(b), direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort rows by `spec`
pub fn sort_rows(rows: Vec<DonorRow>, spec: SortSpec) -> Vec<DonorRow> {
    RosterComparator::new(spec).sort(rows)
}
