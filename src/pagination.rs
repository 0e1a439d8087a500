//! Offset/limit pagination for list queries

use validator::Validate;

/// Page used when the client omits `page`
pub const DEFAULT_PAGE: i32 = 1;

/// Page size used when the client omits `limit`
pub const DEFAULT_LIMIT: i32 = 10;

/// Largest page size a client may request
pub const MAX_LIMIT: i32 = 100;

/// 1-based page number plus page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
pub struct PageInput {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: i32,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: i32,
}

impl PageInput {
    /// Build from optional GraphQL arguments, filling in defaults
    pub fn new(page: Option<i32>, limit: Option<i32>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Rows to skip
    pub fn offset(&self) -> usize {
        let page = self.page.max(1) as usize;
        (page - 1) * self.limit()
    }

    /// Rows to take, clamped to `1..=MAX_LIMIT`
    pub fn limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT) as usize
    }
}

impl Default for PageInput {
    fn default() -> Self {
        Self::new(None, None)
    }
}
