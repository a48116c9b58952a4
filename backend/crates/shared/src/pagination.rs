//! Page/limit handling for list endpoints

use serde::Deserialize;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Page request as sent by the client (`?page=2&limit=20`)
///
/// Values are clamped rather than rejected: page is at least 1, limit lies
/// in `1..=100`, and a missing limit means 10.
///
/// ```
/// use kernel::pagination::PageRequest;
///
/// let page = PageRequest::new(Some(3), Some(500));
/// assert_eq!(page.page(), 3);
/// assert_eq!(page.limit(), 100);
/// assert_eq!(page.offset(), 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

#[derive(Deserialize)]
struct RawPageRequest {
    page: Option<i64>,
    limit: Option<i64>,
}

impl From<RawPageRequest> for PageRequest {
    fn from(raw: RawPageRequest) -> Self {
        Self::from_signed(raw.page, raw.limit)
    }
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Same clamping for raw query values, which may be negative
    pub fn from_signed(page: Option<i64>, limit: Option<i64>) -> Self {
        let clamp = |v: Option<i64>| v.map(|v| v.clamp(0, i64::from(u32::MAX)) as u32);
        Self::new(clamp(page), clamp(limit))
    }

    #[inline]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip
    #[inline]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}
