//! # Page Break Decisions
//!
//! Deciding how much of a splittable node stays on the current page.
//! Orphan and widow minimums keep a paragraph from leaving a lone line at
//! the bottom of one page or the top of the next.

/// Tolerance for "fits" comparisons, so sums of exact line heights never
/// miss by a rounding error.
pub const EPSILON: f64 = 1e-6;

/// Decide what to do when a node doesn't fit on the current page.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Place the entire node on the current page (it fits).
    Place,
    /// Move the entire node to the next page.
    MoveToNextPage,
    /// Place some items here and continue on the next page.
    Split {
        /// How many items fit on the current page.
        items_on_current_page: usize,
    },
}

/// Given the remaining space on a page and a list of item heights,
/// decide how to break.
pub fn decide_break(
    remaining_height: f64,
    item_heights: &[f64],
    is_breakable: bool,
    min_orphan_lines: usize,
    min_widow_lines: usize,
) -> BreakDecision {
    let total: f64 = item_heights.iter().sum();
    if total <= remaining_height + EPSILON {
        return BreakDecision::Place;
    }

    if !is_breakable {
        return BreakDecision::MoveToNextPage;
    }

    let fit_count = count_fitting(remaining_height, item_heights);
    let total_items = item_heights.len();

    // Too few items left behind on this page.
    if fit_count < min_orphan_lines && fit_count < total_items {
        return BreakDecision::MoveToNextPage;
    }

    // Too few items carried onto the next page: pull some back.
    let remaining_items = total_items - fit_count;
    if remaining_items < min_widow_lines && remaining_items > 0 {
        let adjusted = fit_count.saturating_sub(min_widow_lines - remaining_items);
        if adjusted == 0 || adjusted < min_orphan_lines {
            return BreakDecision::MoveToNextPage;
        }
        return BreakDecision::Split {
            items_on_current_page: adjusted,
        };
    }

    if fit_count == 0 {
        return BreakDecision::MoveToNextPage;
    }

    BreakDecision::Split {
        items_on_current_page: fit_count,
    }
}

/// How many leading items fit in `remaining_height`, ignoring orphan and
/// widow rules.
pub fn count_fitting(remaining_height: f64, item_heights: &[f64]) -> usize {
    let mut running = 0.0;
    let mut fit_count = 0;
    for &h in item_heights {
        if running + h > remaining_height + EPSILON {
            break;
        }
        running += h;
        fit_count += 1;
    }
    fit_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_fits() {
        let decision = decide_break(100.0, &[20.0, 30.0, 40.0], true, 2, 2);
        assert_eq!(decision, BreakDecision::Place);
    }

    #[test]
    fn unbreakable_moves() {
        let decision = decide_break(50.0, &[20.0, 30.0, 40.0], false, 2, 2);
        assert_eq!(decision, BreakDecision::MoveToNextPage);
    }

    #[test]
    fn split_at_right_point() {
        let decision = decide_break(55.0, &[20.0, 30.0, 40.0], true, 1, 1);
        assert_eq!(
            decision,
            BreakDecision::Split {
                items_on_current_page: 2,
            }
        );
    }

    #[test]
    fn orphan_control() {
        // Only 1 item would fit, but min_orphan is 2 → move everything
        let decision = decide_break(25.0, &[20.0, 30.0, 40.0], true, 2, 2);
        assert_eq!(decision, BreakDecision::MoveToNextPage);
    }

    #[test]
    fn widow_control() {
        // 3 of 4 fit, leaving 1 widow (min=2) → pull one back
        let decision = decide_break(70.0, &[20.0, 20.0, 20.0, 20.0], true, 2, 2);
        assert_eq!(
            decision,
            BreakDecision::Split {
                items_on_current_page: 2,
            }
        );
    }

    #[test]
    fn widow_pullback_cannot_create_orphan() {
        // 2 of 3 fit; pulling one back for widows=2 would leave 1 < orphans=2
        let decision = decide_break(45.0, &[20.0, 20.0, 20.0], true, 2, 2);
        assert_eq!(decision, BreakDecision::MoveToNextPage);
    }

    #[test]
    fn exact_multiple_fits() {
        let heights = [0.1; 10];
        assert_eq!(count_fitting(1.0, &heights), 10);
    }
}
