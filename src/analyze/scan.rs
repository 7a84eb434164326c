//! Scan controller
//!
//! Enumerates segment pairs (i < j), prunes pairs that cannot be closer
//! than the threshold, distance-evaluates the survivors, and collects
//! issues. An R-tree over segment bounding boxes supplies the candidate
//! set for each outer index; candidates are index-sorted, so the
//! surviving pairs and their discovery order are exactly those of a
//! flat i < j loop with the bounding-box test inlined.
//!
//! The loop is single-threaded and deterministic. Every
//! [`YIELD_INTERVAL`] outer iterations it checks the cancel flag and
//! emits a progress event; the comparison budget bounds only the pairs
//! that survive pruning.

use super::distance::segment_distance;
use super::types::{CancelFlag, Completion, Issue, ProgressEvent, ScanPhase, Segment, SegmentRef};
use rstar::{RTree, RTreeObject, AABB};

/// Outer-loop cadence for progress reporting and cancel checks
pub const YIELD_INTERVAL: usize = 50;

/// Distances at or below this are treated as coincident points (shared
/// endpoints where two elements legitimately touch) and not reported.
pub const MIN_REPORTED_DISTANCE: f32 = 0.01;

/// Result of one scan pass
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Flagged pairs in discovery order
    pub issues: Vec<Issue>,
    /// Pairs that survived pruning and were distance-evaluated
    pub comparisons: u64,
    /// Pairs rejected by the owner or bounding-box filter
    pub skipped: u64,
    pub completion: Completion,
}

struct IndexedBox {
    index: usize,
    aabb: AABB<[f32; 2]>,
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Pruning filter: full distance evaluation is needed only for pairs
/// from different owner elements whose bounding boxes come within
/// `buffer` of each other. The buffer is `threshold + 1` - strictly
/// larger than the threshold - so boundary rounding in the bbox
/// distance relation cannot reject a truly-close pair.
pub fn should_compare(a: &Segment, b: &Segment, buffer: f32) -> bool {
    if a.owner_id == b.owner_id {
        return false;
    }
    a.bbox.expanded(buffer).overlaps(b.bbox)
}

/// Scan all segment pairs for spacing issues.
///
/// `observer` receives advisory progress events; the percentage is held
/// at 90 or below until the loop exits. `cancel` is consulted only at
/// yield points - a set flag does not abort mid-evaluation.
pub fn scan_segments(
    segments: &[Segment],
    threshold: f32,
    max_comparisons: u64,
    observer: &mut dyn FnMut(&ProgressEvent),
    cancel: &CancelFlag,
) -> ScanOutcome {
    let n = segments.len();
    let buffer = threshold + 1.0;
    let total_pairs = (n as u64).saturating_mul(n.saturating_sub(1) as u64) / 2;
    let estimated_total = total_pairs.min(max_comparisons).max(1);

    let tree = RTree::bulk_load(
        segments
            .iter()
            .enumerate()
            .map(|(index, seg)| IndexedBox {
                index,
                aabb: AABB::from_corners(
                    [seg.bbox.min_x, seg.bbox.min_y],
                    [seg.bbox.max_x, seg.bbox.max_y],
                ),
            })
            .collect(),
    );

    let mut issues = Vec::new();
    let mut comparisons: u64 = 0;
    let mut skipped: u64 = 0;
    let mut completion = Completion::Exhaustive;

    'outer: for i in 0..n {
        if i % YIELD_INTERVAL == 0 {
            if cancel.is_cancelled() {
                completion = Completion::Cancelled;
                break 'outer;
            }
            let percent = (30.0 + 60.0 * comparisons as f32 / estimated_total as f32).min(90.0);
            observer(&ProgressEvent {
                phase: ScanPhase::Scanning,
                percent,
                comparisons,
                skipped,
                message: format!("Checked {} pairs ({} skipped)...", comparisons, skipped),
            });
        }

        let seg_a = &segments[i];
        let query = seg_a.bbox.expanded(buffer);
        let envelope = AABB::from_corners([query.min_x, query.min_y], [query.max_x, query.max_y]);

        let mut candidates: Vec<usize> = tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.index)
            .filter(|&j| j > i)
            .collect();
        candidates.sort_unstable();

        // Bbox-pruned pairs are credited to `skipped` as the row is
        // walked, so a budget or cancel break leaves the counter at the
        // pairs actually passed over rather than the whole row's
        let mut prev = i;
        for j in candidates {
            skipped += (j - prev - 1) as u64;
            prev = j;
            let seg_b = &segments[j];
            if !should_compare(seg_a, seg_b, buffer) {
                skipped += 1;
                continue;
            }
            if comparisons == max_comparisons {
                completion = Completion::Truncated;
                break 'outer;
            }
            comparisons += 1;

            let dist = segment_distance(seg_a, seg_b);
            if dist > MIN_REPORTED_DISTANCE && dist < threshold {
                issues.push(Issue {
                    distance: dist,
                    segment_a: SegmentRef::of(seg_a),
                    segment_b: SegmentRef::of(seg_b),
                    location: seg_a.midpoint(),
                });
            }
        }
        skipped += (n - 1 - prev) as u64;
    }

    // A scan that spent its whole budget is reported truncated even if
    // the last pair happened to be the last one enumerated.
    if completion == Completion::Exhaustive && comparisons >= max_comparisons {
        completion = Completion::Truncated;
    }

    ScanOutcome {
        issues,
        comparisons,
        skipped,
        completion,
    }
}
