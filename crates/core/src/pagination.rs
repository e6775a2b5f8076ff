//! List pagination limits shared by every paged endpoint.

/// Page size applied when the client sends none.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Largest page size a client may request.
pub const MAX_PAGE_LIMIT: i64 = 200;

/// Clamp a requested limit into `[1, MAX_PAGE_LIMIT]`, falling back to
/// the default when absent.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
