/// List pagination parameters
///
/// Shared by every paginated listing. Out-of-range values are rejected
/// rather than clamped, so callers learn about their mistake instead of
/// silently getting a different page size.

use crate::error::{DomainError, DomainResult};
use serde::Deserialize;

/// Largest page a caller may request
pub const MAX_LIMIT: i64 = 20;

/// Page size when the caller does not specify one
pub const DEFAULT_LIMIT: i64 = 10;

/// Limit/offset pair for paginated listings
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    /// Page size, 1..=20
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Rows to skip before the page starts
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Checks the parameters are within range.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when `limit` is outside `1..=20`
    /// or `offset` is negative.
    pub fn validate(&self) -> DomainResult<()> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(DomainError::Validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, self.limit
            )));
        }
        if self.offset < 0 {
            return Err(DomainError::Validation(format!(
                "offset must not be negative, got {}",
                self.offset
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::default();
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset, 0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_serde_defaults_apply_per_field() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset, 0);

        let p: Pagination = serde_json::from_str(r#"{"offset": 30}"#).unwrap();
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset, 30);
    }

    #[test]
    fn test_limit_bounds() {
        let ok = Pagination { limit: 20, offset: 0 };
        assert!(ok.validate().is_ok());

        let ok = Pagination { limit: 1, offset: 0 };
        assert!(ok.validate().is_ok());

        let too_big = Pagination { limit: 21, offset: 0 };
        assert!(matches!(
            too_big.validate(),
            Err(DomainError::Validation(_))
        ));

        let zero = Pagination { limit: 0, offset: 0 };
        assert!(matches!(zero.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_negative_offset_rejected() {
        let p = Pagination {
            limit: 10,
            offset: -1,
        };
        assert!(matches!(p.validate(), Err(DomainError::Validation(_))));
    }
}
