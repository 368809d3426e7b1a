/// Position allocation for columns and tasks
///
/// Siblings (columns of one board, tasks of one column) are ordered by an
/// arbitrary-precision decimal key. Inserting between two existing siblings
/// never renumbers the others: the new key is the midpoint of its neighbors.
///
/// The allocator is pure. Callers look up whatever neighbor keys exist in the
/// current unit of work's read view and pass them in.
///
/// Repeated midpoint insertion between the same pair eventually exhausts the
/// precision the key column can store. [`needs_rebalance`] reports when a
/// computed key has crossed the scale threshold; the caller then renumbers
/// the sibling set to evenly spaced integers inside the same unit of work and
/// recomputes the key.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Keys are stored as `NUMERIC(16,8)`; a key needing more than this many
/// fractional digits triggers a renumbering of its sibling set.
pub const MAX_POSITION_SCALE: u32 = 8;

/// Key for appending after the current maximum of a sibling set.
///
/// Returns `previous_max + 1`, or `1.0` when the set is empty.
pub fn append_after(previous_max: Option<Decimal>) -> Decimal {
    match previous_max {
        Some(max) => max + Decimal::ONE,
        None => dec!(1.0),
    }
}

/// Key strictly between two neighbors.
///
/// - both neighbors: their midpoint
/// - only `above` (the preceding sibling): `above + 1`, the new item is last
/// - only `below` (the following sibling): `below / 2`, the new item is first
/// - neither: `1.0`
///
/// Given `above < below`, the result `x` satisfies `above < x < below`.
pub fn between(above: Option<Decimal>, below: Option<Decimal>) -> Decimal {
    match (above, below) {
        (Some(a), Some(b)) => (a + b) / dec!(2),
        (Some(a), None) => a + Decimal::ONE,
        (None, Some(b)) => b / dec!(2),
        (None, None) => dec!(1.0),
    }
}

/// Whether a computed key has exhausted the storable precision and the
/// sibling set should be renumbered before the key is persisted.
pub fn needs_rebalance(key: &Decimal) -> bool {
    key.normalize().scale() > MAX_POSITION_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_empty_set() {
        assert_eq!(append_after(None), dec!(1.0));
    }

    #[test]
    fn test_append_after_max() {
        assert_eq!(append_after(Some(dec!(3.0))), dec!(4.0));
        assert_eq!(append_after(Some(dec!(1.5))), dec!(2.5));
    }

    #[test]
    fn test_between_both_neighbors() {
        assert_eq!(between(Some(dec!(1.0)), Some(dec!(2.0))), dec!(1.5));
    }

    #[test]
    fn test_between_only_above_appends() {
        assert_eq!(between(Some(dec!(4.0)), None), dec!(5.0));
    }

    #[test]
    fn test_between_only_below_prepends() {
        assert_eq!(between(None, Some(dec!(1.0))), dec!(0.5));
    }

    #[test]
    fn test_between_empty_set() {
        assert_eq!(between(None, None), dec!(1.0));
    }

    #[test]
    fn test_midpoint_law() {
        // For a < b, between(a, b) is strictly inside the interval.
        let pairs = [
            (dec!(1.0), dec!(2.0)),
            (dec!(0.001), dec!(0.002)),
            (dec!(-3.0), dec!(7.0)),
            (dec!(1.0), dec!(1.00000001)),
        ];
        for (a, b) in pairs {
            let x = between(Some(a), Some(b));
            assert!(a < x, "{a} < {x} violated");
            assert!(x < b, "{x} < {b} violated");
        }
    }

    #[test]
    fn test_repeated_midpoints_stay_ordered() {
        let mut low = dec!(1.0);
        let high = dec!(2.0);
        for _ in 0..20 {
            let mid = between(Some(low), Some(high));
            assert!(low < mid && mid < high);
            low = mid;
        }
    }

    #[test]
    fn test_rebalance_threshold() {
        assert!(!needs_rebalance(&dec!(1.5)));
        assert!(!needs_rebalance(&dec!(1.00000001))); // scale 8, still storable
        assert!(needs_rebalance(&dec!(1.000000001))); // scale 9

        // Trailing zeros do not count against the threshold.
        assert!(!needs_rebalance(&dec!(1.5000000000)));
    }

    #[test]
    fn test_midpoints_eventually_need_rebalance() {
        let mut low = dec!(1.0);
        let high = dec!(2.0);
        let mut triggered = false;
        for _ in 0..40 {
            let mid = between(Some(low), Some(high));
            if needs_rebalance(&mid) {
                triggered = true;
                break;
            }
            low = mid;
        }
        assert!(triggered, "scale threshold never reached");
    }
}
