//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod category;
pub mod complaint;
pub mod stats;
pub mod user;

pub use auth::{AuthService, Claims, INVALID_TOKEN_MESSAGE};
pub use category::{CategoryService, CreateCategoryInput, DEFAULT_CATEGORIES, UpdateCategoryInput};
pub use complaint::{
    AssignInput, CommentInput, ComplaintQuery, ComplaintService, CreateComplaintInput,
    UpdateStatusInput,
};
pub use stats::{ComplaintStats, StatsService, UserStats};
pub use user::{
    AuthOutcome, LoginInput, RegisterInput, SetActiveInput, UpdateProfileInput, UserQuery,
    UserService,
};

use serde::{Deserialize, Serialize};

/// Default page size for listings.
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest page a client may request.
pub const MAX_LIMIT: u64 = 100;

/// Page position requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Normalize raw query values: page starts at 1, limit within `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the totals clients paginate with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(skip)]
    pub items: Vec<T>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_pages: total.div_ceil(request.limit.max(1)),
            current_page: request.page,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults_and_bounds() {
        assert_eq!(PageRequest::default(), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(Some(3), Some(500)).limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let request = PageRequest::new(Some(2), Some(10));
        assert_eq!(Page::<()>::new(vec![], 0, request).total_pages, 0);
        assert_eq!(Page::<()>::new(vec![], 10, request).total_pages, 1);
        assert_eq!(Page::<()>::new(vec![], 11, request).total_pages, 2);
        assert_eq!(Page::<()>::new(vec![], 11, request).current_page, 2);
    }
}
