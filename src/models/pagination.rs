//! Pagination and sorting primitives shared across all list endpoints.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::validation::FieldErrors;

/// Pagination and sort query parameters: `?page=2&page_size=20&sort=-username`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort: Option<String>,
}

impl Pagination {
    /// Maximum items per page.
    const MAX_PAGE_SIZE: i64 = 100;

    /// Default items per page.
    const DEFAULT_PAGE_SIZE: i64 = 20;

    const MAX_PAGE: i64 = 10_000_000;

    /// Check page bounds and that the sort key is in `safelist`.
    ///
    /// `safelist` holds bare column names; each is also accepted with a `-`
    /// prefix for descending order.
    pub fn validate(&self, safelist: &[&str]) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        let page = self.current_page();
        errors.check(page > 0, "page", "must be greater than zero");
        errors.check(page <= Self::MAX_PAGE, "page", "must be a maximum of 10 million");
        let size = self.page_size();
        errors.check(size > 0, "page_size", "must be greater than zero");
        errors.check(size <= Self::MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");
        errors.check(
            safelist.contains(&self.sort_column()),
            "sort",
            "invalid sort value",
        );
        errors.into_result()
    }

    pub fn current_page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE)
    }

    pub fn limit(&self) -> i64 {
        self.page_size()
    }

    pub fn offset(&self) -> i64 {
        (self.current_page() - 1) * self.page_size()
    }

    /// Sort key without its direction prefix; `id` when none was given.
    pub fn sort_column(&self) -> &str {
        let sort = self.sort.as_deref().unwrap_or("id");
        sort.strip_prefix('-').unwrap_or(sort)
    }

    pub fn sort_direction(&self) -> &'static str {
        match self.sort.as_deref() {
            Some(s) if s.starts_with('-') => "DESC",
            _ => "ASC",
        }
    }

    /// ORDER BY body with ascending id as the tie-break.
    ///
    /// Only call after [`Pagination::validate`]: the column is interpolated.
    pub fn order_by(&self) -> String {
        format!("{} {}, id ASC", self.sort_column(), self.sort_direction())
    }
}

/// Pagination details returned alongside list results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl PageMetadata {
    pub fn new(total_records: i64, current_page: i64, page_size: i64) -> Self {
        if total_records == 0 {
            return Self::default();
        }
        Self {
            current_page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }

    pub fn for_pagination(total_records: i64, pagination: &Pagination) -> Self {
        Self::new(total_records, pagination.current_page(), pagination.page_size())
    }
}

/// One page of results with its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub metadata: PageMetadata,
}
