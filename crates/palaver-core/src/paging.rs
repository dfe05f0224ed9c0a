//! Pagination parameters and sort-column safelists

use crate::validation::ValidationErrors;
use serde::{Deserialize, Serialize};

/// Default page size when the client does not send `limit`.
pub const DEFAULT_LIMIT: i64 = 20;
/// Hard ceiling on page size.
pub const MAX_LIMIT: i64 = 100;

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// SQL keyword for this direction. Safe to interpolate.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Allow-listed sort columns for one resource.
///
/// The sort column ends up interpolated into `ORDER BY`, so it must never
/// come from the client unchecked. A safelist holds the acceptable column
/// names; anything else is a validation error.
#[derive(Clone, Copy, Debug)]
pub struct SortSafelist {
    columns: &'static [&'static str],
}

impl SortSafelist {
    pub const fn new(columns: &'static [&'static str]) -> Self {
        Self { columns }
    }

    /// Resolve a client-supplied sort key to a known column.
    ///
    /// Returns the safelisted `&'static str`, never the client's string.
    pub fn resolve(&self, requested: &str) -> Option<&'static str> {
        self.columns.iter().find(|c| **c == requested).copied()
    }

    /// First entry, used when the client sends no `sort`.
    pub fn default_column(&self) -> &'static str {
        self.columns[0]
    }
}

/// Raw paging/sorting query parameters as sent by the client.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<Direction>,
}

impl PageParams {
    /// Validate against a safelist and produce a query-ready [`Page`].
    pub fn validate(&self, safelist: &SortSafelist) -> Result<PageSpec, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            errors.add("limit", format!("must be between 1 and {MAX_LIMIT}"));
        }

        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            errors.add("offset", "must not be negative");
        }

        let order_by = match &self.sort {
            Some(requested) => match safelist.resolve(requested) {
                Some(column) => column,
                None => {
                    errors.add("sort", format!("unknown sort column: {requested}"));
                    safelist.default_column()
                }
            },
            None => safelist.default_column(),
        };

        errors.into_result()?;

        Ok(PageSpec {
            limit,
            offset,
            order_by,
            direction: self.direction.unwrap_or_default(),
        })
    }
}

/// Validated paging spec handed to the data layer.
#[derive(Clone, Copy, Debug)]
pub struct PageSpec {
    pub limit: i64,
    pub offset: i64,
    /// Safelisted column name, safe for `ORDER BY` interpolation.
    pub order_by: &'static str,
    pub direction: Direction,
}

impl PageSpec {
    /// `ORDER BY ... LIMIT ... OFFSET ...` suffix for a list query.
    pub fn to_sql(&self) -> String {
        format!(
            " ORDER BY {} {} LIMIT {} OFFSET {}",
            self.order_by,
            self.direction.as_sql(),
            self.limit,
            self.offset
        )
    }
}

/// One page of results with totals, the standard list envelope.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total: i64, spec: &PageSpec, items: Vec<T>) -> Self {
        Self {
            total,
            limit: spec.limit,
            offset: spec.offset,
            items,
        }
    }
}
