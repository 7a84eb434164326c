//! plotcheck - line spacing analyzer for pen plotter SVG drawings
//!
//! Parses an SVG document, slices its straight-line geometry (`path`,
//! `line`, `polyline` elements) into segments, and flags pairs of
//! segments from different elements whose separation falls below a
//! configured threshold. Produces a bounded issue report plus an
//! annotated copy of the drawing with markers at each flagged location.

pub mod analyze;
pub mod parse_xml;
pub mod serialize_xml;

pub use analyze::types::{
    AnalysisRequest, AnalysisResult, AnalysisSummary, CancelFlag, Completion, DecodeError, Issue,
    IssueRow, Point, ProgressEvent, ScanPhase, Segment, SegmentKind,
};
pub use analyze::{run_analysis, run_analysis_observed};
pub use parse_xml::{parse_svg_file, parse_svg_str, XmlNode};
pub use serialize_xml::{xml_node_to_file, xml_node_to_string};
