/// Column capacity admission control
///
/// A column may carry an optional WIP limit: the maximum number of tasks it
/// holds at once. Task creation and cross-column moves are admitted against
/// the destination column's occupancy before the write commits.
///
/// The check itself is pure. Callers must read the occupancy under a
/// row-level lock on the column (`SELECT … FOR UPDATE`) held for the rest of
/// the unit of work, so two concurrent admissions into the same near-full
/// column serialize instead of jointly overshooting the limit.

use crate::error::DomainError;

/// Admits or rejects adding one task to a column.
///
/// `occupied` is the destination column's current task count. For a move the
/// moving task still counts toward its origin column; the destination is
/// checked against its own occupancy only.
///
/// # Errors
///
/// Returns `CapacityExceeded` when a limit is set and `occupied >= limit`.
pub fn check_capacity(
    column_id: i64,
    wip_limit: Option<i32>,
    occupied: i64,
) -> Result<(), DomainError> {
    if let Some(limit) = wip_limit {
        if occupied >= i64::from(limit) {
            return Err(DomainError::CapacityExceeded { column_id, limit });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_column_always_admits() {
        assert!(check_capacity(1, None, 0).is_ok());
        assert!(check_capacity(1, None, 10_000).is_ok());
    }

    #[test]
    fn test_admits_below_limit() {
        assert!(check_capacity(1, Some(3), 0).is_ok());
        assert!(check_capacity(1, Some(3), 2).is_ok());
    }

    #[test]
    fn test_rejects_at_limit() {
        let err = check_capacity(7, Some(3), 3).unwrap_err();
        assert!(matches!(
            err,
            DomainError::CapacityExceeded { column_id: 7, limit: 3 }
        ));
    }

    #[test]
    fn test_rejects_over_limit() {
        assert!(check_capacity(1, Some(3), 4).is_err());
    }

    #[test]
    fn test_kth_succeeds_k_plus_first_fails() {
        // Property 1: filling a column with limit K one task at a time,
        // the Kth admission succeeds and the (K+1)th fails.
        for k in 1..=10 {
            for occupied in 0..k {
                assert!(check_capacity(1, Some(k), i64::from(occupied)).is_ok());
            }
            assert!(check_capacity(1, Some(k), i64::from(k)).is_err());
        }
    }

    #[test]
    fn test_limit_zero_rejects_first_task() {
        assert!(check_capacity(1, Some(0), 0).is_err());
    }
}
