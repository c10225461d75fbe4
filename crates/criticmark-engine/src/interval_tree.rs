//! Interval index over range spans.
//!
//! A sorted vector with binary search plus a prefix maximum of interval
//! ends, which lets point and overlap queries stop scanning early.
//! Query complexity: O(log n + k). The index is built once per collection.

/// A half-open span `[start, end)` pointing at an entry in the owning
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
    pub index: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize, index: usize) -> Self {
        Self { start, end, index }
    }

    /// `start <= pos < end`
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// `start <= pos <= end`
    pub fn touches(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntervalTree {
    /// Sorted by start position.
    intervals: Vec<Interval>,
    /// `prefix_max_end[i] = max(intervals[0..=i].end)`
    prefix_max_end: Vec<usize>,
}

impl IntervalTree {
    pub fn from_intervals(mut intervals: Vec<Interval>) -> Self {
        intervals.sort_by_key(|i| (i.start, i.end));
        let prefix_max_end = intervals
            .iter()
            .scan(0, |max_end, interval| {
                *max_end = (*max_end).max(interval.end);
                Some(*max_end)
            })
            .collect();
        Self {
            intervals,
            prefix_max_end,
        }
    }

    /// Intervals with `start <= pos < end`, in start order.
    pub fn query_point(&self, pos: usize) -> Vec<&Interval> {
        let idx = self.intervals.partition_point(|i| i.start <= pos);

        let mut result = Vec::new();
        for i in (0..idx).rev() {
            // Nothing in `intervals[0..=i]` ends after `pos`.
            if self.prefix_max_end[i] <= pos {
                break;
            }
            if self.intervals[i].contains(pos) {
                result.push(&self.intervals[i]);
            }
        }
        result.reverse();
        result
    }

    /// Intervals with `start <= pos <= end`, in start order.
    pub fn query_point_inclusive(&self, pos: usize) -> Vec<&Interval> {
        let idx = self.intervals.partition_point(|i| i.start <= pos);

        let mut result = Vec::new();
        for i in (0..idx).rev() {
            if self.prefix_max_end[i] < pos {
                break;
            }
            if self.intervals[i].touches(pos) {
                result.push(&self.intervals[i]);
            }
        }
        result.reverse();
        result
    }

    /// Intervals overlapping `[start, end)`, in start order.
    pub fn query_range(&self, start: usize, end: usize) -> Vec<&Interval> {
        if self.intervals.is_empty() || start >= end {
            return Vec::new();
        }

        let search_end = self.intervals.partition_point(|i| i.start < end);
        let mut scan_start = self
            .intervals
            .partition_point(|i| i.start < start)
            .min(search_end);
        while scan_start > 0 && self.prefix_max_end[scan_start - 1] > start {
            scan_start -= 1;
        }

        self.intervals[scan_start..search_end]
            .iter()
            .filter(|i| i.start < end && i.end > start)
            .collect()
    }

    /// Intervals touching the closed span `[start, end]`, in start order.
    pub fn query_closed(&self, start: usize, end: usize) -> Vec<&Interval> {
        let search_end = self.intervals.partition_point(|i| i.start <= end);
        let mut scan_start = self
            .intervals
            .partition_point(|i| i.start < start)
            .min(search_end);
        while scan_start > 0 && self.prefix_max_end[scan_start - 1] >= start {
            scan_start -= 1;
        }

        self.intervals[scan_start..search_end]
            .iter()
            .filter(|i| i.start <= end && i.end >= start)
            .collect()
    }

    /// The interval ending closest before `pos`: greatest `end` with
    /// `end < pos`, or `end <= pos` when `include_edge`.
    pub fn nearest_before(&self, pos: usize, include_edge: bool) -> Option<&Interval> {
        let fits = |i: &Interval| if include_edge { i.end <= pos } else { i.end < pos };
        let idx = self.intervals.partition_point(|i| i.start <= pos);

        let mut best: Option<&Interval> = None;
        for i in (0..idx).rev() {
            if best.is_some_and(|found| self.prefix_max_end[i] <= found.end) {
                break;
            }
            let interval = &self.intervals[i];
            if fits(interval) && best.is_none_or(|found| interval.end > found.end) {
                best = Some(interval);
            }
        }
        best
    }

    /// The interval starting closest after `pos`: least `start` with
    /// `start > pos`, or `start >= pos` when `include_edge`.
    pub fn nearest_after(&self, pos: usize, include_edge: bool) -> Option<&Interval> {
        let idx = if include_edge {
            self.intervals.partition_point(|i| i.start < pos)
        } else {
            self.intervals.partition_point(|i| i.start <= pos)
        };
        self.intervals.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> IntervalTree {
        // Two adjacent spans, a gap, then one more.
        IntervalTree::from_intervals(vec![
            Interval::new(20, 30, 2),
            Interval::new(0, 10, 0),
            Interval::new(10, 15, 1),
        ])
    }

    fn indices(found: Vec<&Interval>) -> Vec<usize> {
        found.into_iter().map(|i| i.index).collect()
    }

    #[test]
    fn query_point_half_open() {
        let tree = sample();
        assert_eq!(indices(tree.query_point(0)), vec![0]);
        assert_eq!(indices(tree.query_point(10)), vec![1]);
        assert_eq!(indices(tree.query_point(17)), Vec::<usize>::new());
        assert_eq!(indices(tree.query_point(30)), Vec::<usize>::new());
    }

    #[test]
    fn query_point_inclusive_reports_both_neighbours() {
        let tree = sample();
        assert_eq!(indices(tree.query_point_inclusive(10)), vec![0, 1]);
        assert_eq!(indices(tree.query_point_inclusive(30)), vec![2]);
        assert_eq!(indices(tree.query_point_inclusive(0)), vec![0]);
        assert_eq!(indices(tree.query_point_inclusive(17)), Vec::<usize>::new());
    }

    #[test]
    fn query_range_is_strict_overlap() {
        let tree = sample();
        assert_eq!(indices(tree.query_range(5, 25)), vec![0, 1, 2]);
        assert_eq!(indices(tree.query_range(15, 20)), Vec::<usize>::new());
        assert_eq!(indices(tree.query_range(14, 21)), vec![1, 2]);
        assert_eq!(indices(tree.query_range(5, 5)), Vec::<usize>::new());
    }

    #[test]
    fn query_closed_includes_edges() {
        let tree = sample();
        assert_eq!(indices(tree.query_closed(15, 20)), vec![1, 2]);
        assert_eq!(indices(tree.query_closed(16, 19)), Vec::<usize>::new());
    }

    #[test]
    fn nearest_before_and_after() {
        let tree = sample();

        assert_eq!(tree.nearest_before(17, false).map(|i| i.index), Some(1));
        assert_eq!(tree.nearest_before(15, false).map(|i| i.index), Some(0));
        assert_eq!(tree.nearest_before(15, true).map(|i| i.index), Some(1));
        assert_eq!(tree.nearest_before(5, true), None);

        assert_eq!(tree.nearest_after(17, false).map(|i| i.index), Some(2));
        assert_eq!(tree.nearest_after(20, false), None);
        assert_eq!(tree.nearest_after(20, true).map(|i| i.index), Some(2));
    }

    #[test]
    fn empty_tree() {
        let tree = IntervalTree::from_intervals(Vec::new());
        assert!(tree.query_point(0).is_empty());
        assert!(tree.nearest_before(10, true).is_none());
        assert!(tree.nearest_after(0, true).is_none());
    }
}
