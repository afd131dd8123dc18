use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

impl Meta {
    pub fn total(total: i64) -> Self {
        Self {
            total,
            page: None,
            limit: None,
            total_pages: None,
        }
    }

    pub fn paginated(total: i64, pagination: &PaginationQuery) -> Self {
        let limit = pagination.limit();
        Self {
            total,
            page: Some(pagination.page()),
            limit: Some(limit),
            total_pages: Some((total + limit - 1) / limit),
        }
    }
}

/// Body returned by delete endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponseDto {
    pub deleted: bool,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 20, max: 100)
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Get clamped limit (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps() {
        let q = PaginationQuery { page: 0, limit: 1000 };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
        assert_eq!(q.offset(), 0);

        let q = PaginationQuery { page: 3, limit: 20 };
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let q = PaginationQuery {
            page: i64::MAX,
            limit: 100,
        };
        assert_eq!(q.offset(), i64::MAX);

        let q = PaginationQuery {
            page: i64::MAX,
            limit: 1,
        };
        assert_eq!(q.offset(), i64::MAX - 1);
    }

    #[test]
    fn test_paginated_meta_rounds_total_pages_up() {
        let q = PaginationQuery { page: 2, limit: 20 };
        let meta = Meta::paginated(41, &q);
        assert_eq!(meta.total_pages, Some(3));
        assert_eq!(meta.page, Some(2));

        assert_eq!(Meta::paginated(0, &q).total_pages, Some(0));
    }
}
