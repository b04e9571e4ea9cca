//! Closed-interval bookkeeping over stellar mass.
//!
//! Track models and yield models describe mass ranges as flat, sorted cut
//! lists `[c0, c1, c2, c3, ...]` where `[c0, c1]`, `[c2, c3]`, ... are the
//! members of the set. These helpers turn cut lists into interval lists and
//! combine them.

/// Pairs up a sorted cut list. A trailing unpaired cut is dropped.
pub fn cuts_to_intervals(cuts: &[f64]) -> Vec<(f64, f64)> {
    cuts.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

/// True if `x` lies inside one of the intervals described by `cuts`.
pub fn in_cuts(cuts: &[f64], x: f64) -> bool {
    cuts.chunks_exact(2).any(|c| x >= c[0] && x <= c[1])
}

/// Intersection of two sorted, disjoint interval lists.
pub fn intersect(a: &[(f64, f64)], b: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let lo = a[i].0.max(b[j].0);
        let hi = a[i].1.min(b[j].1);
        if lo < hi {
            out.push((lo, hi));
        }
        if a[i].1 < b[j].1 {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

/// The parts of `[lo, hi]` not covered by the sorted, disjoint `intervals`.
pub fn complement(intervals: &[(f64, f64)], lo: f64, hi: f64) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    let mut cursor = lo;
    for &(a, b) in intervals {
        if b <= cursor {
            continue;
        }
        if a >= hi {
            break;
        }
        if a > cursor {
            out.push((cursor, a));
        }
        cursor = cursor.max(b);
    }
    if cursor < hi {
        out.push((cursor, hi));
    }
    out
}

/// Splits intervals at every cut that falls strictly inside one.
pub fn split_at(intervals: &[(f64, f64)], cuts: &[f64]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(intervals.len());
    for &(lo, hi) in intervals {
        let mut start = lo;
        for &c in cuts.iter().filter(|&&c| c > lo && c < hi) {
            out.push((start, c));
            start = c;
        }
        out.push((start, hi));
    }
    out
}

/// Total length covered.
pub fn total_width(intervals: &[(f64, f64)]) -> f64 {
    intervals.iter().map(|(a, b)| b - a).sum()
}
