//! Core data model for the spacing analysis

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A 2D point in drawing units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Axis-aligned bounding box, computed once at segment creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bbox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bbox {
    pub fn of_endpoints(start: Point, end: Point) -> Self {
        Bbox {
            min_x: start.x.min(end.x),
            max_x: start.x.max(end.x),
            min_y: start.y.min(end.y),
            max_y: start.y.max(end.y),
        }
    }

    /// This box grown by `buffer` on all sides.
    pub fn expanded(self, buffer: f32) -> Self {
        Bbox {
            min_x: self.min_x - buffer,
            max_x: self.max_x + buffer,
            min_y: self.min_y - buffer,
            max_y: self.max_y + buffer,
        }
    }

    /// Closed-interval overlap test on both axes.
    pub fn overlaps(self, other: Bbox) -> bool {
        self.max_x >= other.min_x
            && self.min_x <= other.max_x
            && self.max_y >= other.min_y
            && self.min_y <= other.max_y
    }
}

/// Kind of drawing element a segment was sliced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Path,
    Line,
    Polyline,
}

impl SegmentKind {
    pub fn label(self) -> &'static str {
        match self {
            SegmentKind::Path => "path",
            SegmentKind::Line => "line",
            SegmentKind::Polyline => "polyline",
        }
    }
}

/// A straight line piece sliced from a drawing element.
///
/// `owner_id` identifies the element the segment came from (unique
/// across all element kinds); segments sharing an owner are never
/// compared against each other. `owner_index` is the per-kind element
/// index used in report descriptors ("path 3").
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub owner_index: usize,
    pub owner_id: u64,
    pub start: Point,
    pub end: Point,
    pub bbox: Bbox,
}

impl Segment {
    pub fn new(kind: SegmentKind, owner_index: usize, owner_id: u64, start: Point, end: Point) -> Self {
        Segment {
            kind,
            owner_index,
            owner_id,
            start,
            end,
            bbox: Bbox::of_endpoints(start, end),
        }
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Report descriptor, e.g. "line 0" or "path 3"
    pub fn descriptor(&self) -> String {
        format!("{} {}", self.kind.label(), self.owner_index)
    }
}

/// Identifies a segment's owning element in an issue record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentRef {
    pub kind: SegmentKind,
    pub owner_index: usize,
}

impl SegmentRef {
    pub fn of(segment: &Segment) -> Self {
        SegmentRef {
            kind: segment.kind,
            owner_index: segment.owner_index,
        }
    }

    pub fn descriptor(&self) -> String {
        format!("{} {}", self.kind.label(), self.owner_index)
    }
}

/// A flagged segment pair: two elements closer than the threshold.
/// `location` is the midpoint of the first segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub distance: f32,
    pub segment_a: SegmentRef,
    pub segment_b: SegmentRef,
    pub location: Point,
}

/// One formatted row of the bounded issue listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRow {
    /// Distance in drawing units, 3 decimal places
    pub distance: String,
    pub segment1: String,
    pub segment2: String,
    /// "(x, y)" rounded to 1 decimal
    pub location: String,
}

/// A coordinate that could not be decoded from an element.
///
/// Bad coordinates never enter the geometry as NaN; the affected
/// segment is skipped and the failure reported here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeError {
    pub kind: SegmentKind,
    pub owner_index: usize,
    pub detail: String,
}

/// How a scan run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    /// All surviving pairs were evaluated
    Exhaustive,
    /// The comparison budget ran out; the issue list is a lower bound
    Truncated,
    /// The cancel flag fired at a yield point
    Cancelled,
}

/// Analysis phase, reported through progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanPhase {
    /// Pre-run state for callers tracking a pipeline that has not
    /// started yet; a run itself begins at [`ScanPhase::Extracting`]
    /// and never emits `Idle`
    Idle,
    Extracting,
    Scanning,
    Annotating,
    Done,
    Failed,
}

/// Advisory progress report emitted at yield points
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: ScanPhase,
    /// 0-100, monotonically non-decreasing, held at <= 90 while scanning
    pub percent: f32,
    pub comparisons: u64,
    pub skipped: u64,
    pub message: String,
}

/// Cooperative cancellation flag, checked at scan yield points only.
/// A set flag does not abort an in-flight pair evaluation.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Immutable inputs for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Flag pairs closer than this distance (drawing units, positive)
    pub threshold: f32,
    /// Hard ceiling on distance-evaluated (non-pruned) pairs
    pub max_comparisons: u64,
}

/// Aggregate counters for one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub segment_count: usize,
    pub comparisons: u64,
    pub skipped: u64,
    pub issue_count: usize,
    pub completion: Completion,
    pub decode_error_count: usize,
    pub elapsed_ms: f64,
}

/// Everything produced by one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// All flagged pairs, in discovery order (not capped)
    pub issues: Vec<Issue>,
    /// Formatted listing of the first 100 issues
    pub rows: Vec<IssueRow>,
    /// The original drawing plus the marker overlay
    pub annotated_svg: String,
    /// Coordinate decode failures surfaced from extraction
    pub decode_errors: Vec<DecodeError>,
    pub summary: AnalysisSummary,
}
