//! Shared pagination query parameters.

use serde::Deserialize;
use utoipa::IntoParams;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

/// `?skip=0&limit=100` style pagination, shared by every list endpoint.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[serde(default)]
pub struct Pagination {
    /// Number of records to skip
    pub skip: i64,
    /// Maximum number of records to return
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Clamp to sane bounds so a client cannot request the whole table or
    /// negative offsets.
    pub fn clamped(self) -> Self {
        Self {
            skip: self.skip.max(0),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let p = Pagination { skip: -5, limit: 0 }.clamped();
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, 1);

        let p = Pagination { skip: 10, limit: 100_000 }.clamped();
        assert_eq!(p.skip, 10);
        assert_eq!(p.limit, MAX_LIMIT);
    }
}
