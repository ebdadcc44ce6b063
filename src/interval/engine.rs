use super::types::{Interval, IntervalSet};

/// Intersects two sorted, disjoint interval sets with a two-pointer sweep.
///
/// A candidate overlap `[max(starts), min(ends)]` is emitted only when it is
/// non-degenerate: a shared instant does not count as availability. The
/// output is sorted and disjoint by construction. O(|a| + |b|).
pub fn intersect(a: &IntervalSet, b: &IntervalSet) -> IntervalSet {
    let (a, b) = (a.as_slice(), b.as_slice());
    let mut common = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() && j < b.len() {
        if a[i].end < b[j].start {
            // a's interval ends before b's begins, no overlap possible
            i += 1;
        } else if b[j].end < a[i].start {
            j += 1;
        } else {
            let start = a[i].start.max(b[j].start);
            let end = a[i].end.min(b[j].end);
            if start < end {
                common.push(Interval { start, end });
            }
            // advance whichever interval ends first
            if a[i].end < b[j].end {
                i += 1;
            } else {
                j += 1;
            }
        }
    }
    IntervalSet::from_intervals(common)
}

/// Left fold of [`intersect`] over a sequence of sets.
///
/// An empty sequence yields the empty set. A single set is returned
/// unchanged (the only-one-contributor case). An empty set anywhere in the
/// fold propagates, so callers must exclude no-data contributors before
/// folding; only a genuine zero-overlap result belongs in the input.
pub fn intersect_all<'a, I>(sets: I) -> IntervalSet
where
    I: IntoIterator<Item = &'a IntervalSet>,
{
    let mut iter = sets.into_iter();
    let mut acc = match iter.next() {
        Some(first) => first.clone(),
        None => return IntervalSet::new(),
    };
    for set in iter {
        if acc.is_empty() {
            break;
        }
        acc = intersect(&acc, set);
    }
    acc
}
