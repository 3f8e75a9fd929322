//! Page-based pagination for list endpoints.
//!
//! List endpoints accept `?limit=&page=` and answer with
//! `{"data": [...], "meta": {...}}`. `limit` is clamped to 1..=200 so a
//! whole class roster fits in one page.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_optional_i64;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Items per page (the limit that was applied)
    pub limit: i64,
    /// Current page (1-indexed)
    pub page: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total: i64) -> Self {
        let limit = params.limit();
        Self {
            total,
            limit,
            page: params.page(),
            has_more: params.offset() + limit < total,
        }
    }
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Items per page (1-200, default: 50)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), DEFAULT_LIMIT);
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        let low = PaginationParams {
            limit: Some(0),
            page: None,
        };
        let high = PaginationParams {
            limit: Some(10_000),
            page: None,
        };
        assert_eq!(low.limit(), 1);
        assert_eq!(high.limit(), MAX_LIMIT);
    }

    #[test]
    fn test_offset_from_page() {
        let params = PaginationParams {
            limit: Some(20),
            page: Some(3),
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_negative_page_is_first_page() {
        let params = PaginationParams {
            limit: Some(20),
            page: Some(-4),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_meta_has_more() {
        let params = PaginationParams {
            limit: Some(10),
            page: Some(2),
        };
        assert!(PaginationMeta::new(&params, 25).has_more);
        assert!(!PaginationMeta::new(&params, 20).has_more);
    }

    #[test]
    fn test_deserialize_empty_strings_as_none() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"limit": "", "page": "2"}"#).unwrap();
        assert_eq!(params.limit, None);
        assert_eq!(params.page, Some(2));
    }
}
