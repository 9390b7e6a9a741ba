use crate::error::{self, AppError};
use crate::models::donor::{DonorRow, StatisticSource};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use validator::Validate;

/// Columns the roster can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortField {
    Email,
    FirstName,
    LastName,
    DisplayName,
    LastLogin,
    CreatedAt,
    PledgeCount,
    TotalDonated,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Email,
        SortField::FirstName,
        SortField::LastName,
        SortField::DisplayName,
        SortField::LastLogin,
        SortField::CreatedAt,
        SortField::PledgeCount,
        SortField::TotalDonated,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum SortDirection {
    #[serde(alias = "ascending")]
    #[strum(to_string = "asc", serialize = "ascending")]
    Asc,
    #[default]
    #[serde(alias = "descending")]
    #[strum(to_string = "desc", serialize = "descending")]
    Desc,
}

/// Ordering applied to the merged roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::desc(SortField::TotalDonated)
    }
}

impl std::fmt::Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

/// One page of the donor roster, as requested by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PageRequest {
    /// 1-based page number
    #[validate(range(min = 1))]
    pub page: u32,

    /// Rows per page
    #[validate(range(min = 1))]
    pub page_size: u32,

    /// Free-text search across name and email columns
    pub search_query: Option<String>,

    /// Ordering of the merged roster
    #[serde(default)]
    pub sort: SortSpec,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            search_query: None,
            sort: SortSpec::default(),
        }
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Build a request from loosely typed query parameters
    pub fn from_params(params: &DonorPageParams, default_page_size: u32) -> error::Result<Self> {
        let page = parse_positive("page", params.page.as_deref())?.unwrap_or(1);
        let page_size =
            parse_positive("page_size", params.page_size.as_deref())?.unwrap_or(default_page_size);

        let mut sort = SortSpec::default();
        if let Some(raw) = non_blank(params.sort_field.as_deref()) {
            sort.field = SortField::from_str(raw)
                .map_err(|_| AppError::InvalidRequest(format!("unknown sort field '{}'", raw)))?;
        }
        if let Some(raw) = non_blank(params.sort_direction.as_deref()) {
            sort.direction = SortDirection::from_str(raw).map_err(|_| {
                AppError::InvalidRequest(format!("unknown sort direction '{}'", raw))
            })?;
        }

        Ok(Self {
            page,
            page_size,
            search_query: params.search.clone(),
            sort,
        })
    }
}

/// Raw query parameters of the roster endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonorPageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    #[serde(alias = "search_query", alias = "q")]
    pub search: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_positive(name: &str, value: Option<&str>) -> error::Result<Option<u32>> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };

    let parsed: i64 = raw
        .parse()
        .map_err(|_| AppError::InvalidRequest(format!("{} must be an integer, got '{}'", name, raw)))?;

    if parsed < 1 {
        return Err(AppError::InvalidRequest(format!("{} must be at least 1", name)));
    }

    u32::try_from(parsed)
        .map(Some)
        .map_err(|_| AppError::InvalidRequest(format!("{} is too large", name)))
}

/// A page of enriched donor rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Rows on this page, in sort order
    pub items: Vec<DonorRow>,

    /// Donors matching the search, before pagination
    pub total_count: u64,

    pub page: u32,

    pub page_size: u32,

    pub total_pages: u64,

    /// Statistic sources that fell back to defaults for this response
    #[serde(default)]
    pub degraded_sources: Vec<StatisticSource>,
}

impl PageResult {
    /// Whether any statistic was defaulted because its source was unavailable
    pub fn is_degraded(&self) -> bool {
        !self.degraded_sources.is_empty()
    }
}
