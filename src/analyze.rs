//! Spacing-issue detection engine
//!
//! One analysis run is a pure function of the document text and the
//! request parameters: parse, extract segments, scan pairs, annotate.
//! Phases are reported through progress events (Extracting, Scanning,
//! Annotating, Done); a malformed document fails the run before any
//! scanning starts.

pub mod annotate;
pub mod distance;
pub mod extract;
pub mod report;
pub mod scan;
pub mod types;

use crate::parse_xml::parse_svg_str;
use crate::serialize_xml::xml_node_to_string;
use anyhow::{Context, Result};
use std::time::Instant;
use types::{
    AnalysisRequest, AnalysisResult, CancelFlag, ProgressEvent, ScanPhase,
};

/// Run a full analysis with no progress observer or cancellation.
pub fn run_analysis(document: &str, request: &AnalysisRequest) -> Result<AnalysisResult> {
    run_analysis_observed(document, request, &mut |_| {}, &CancelFlag::new())
}

/// Run a full analysis, reporting progress to `observer` and checking
/// `cancel` at scan yield points.
///
/// Returns an error only for an unparseable document; budget exhaustion
/// and cancellation are normal terminal conditions recorded in the
/// result's completion status.
pub fn run_analysis_observed(
    document: &str,
    request: &AnalysisRequest,
    observer: &mut dyn FnMut(&ProgressEvent),
    cancel: &CancelFlag,
) -> Result<AnalysisResult> {
    let total_start = Instant::now();

    emit(observer, ScanPhase::Extracting, 0.0, 0, 0, "Parsing SVG...");
    let root = match parse_svg_str(document).context("failed to parse drawing document") {
        Ok(root) => root,
        Err(err) => {
            emit(observer, ScanPhase::Failed, 0.0, 0, 0, "Parse error");
            return Err(err);
        }
    };

    emit(observer, ScanPhase::Extracting, 10.0, 0, 0, "Extracting elements...");
    let extract_start = Instant::now();
    let extraction = extract::extract_segments(&root);
    eprintln!(
        "[Analyze] Extracted {} segments ({} decode errors, {} unsupported path commands) in {:.2}ms",
        extraction.segments.len(),
        extraction.decode_errors.len(),
        extraction.unsupported_commands,
        extract_start.elapsed().as_secs_f64() * 1000.0
    );

    emit(
        observer,
        ScanPhase::Scanning,
        30.0,
        0,
        0,
        &format!("Analyzing {} segments...", extraction.segments.len()),
    );
    let scan_start = Instant::now();
    let outcome = scan::scan_segments(
        &extraction.segments,
        request.threshold,
        request.max_comparisons,
        observer,
        cancel,
    );
    eprintln!(
        "[Scan] {} comparisons, {} skipped, {} issues ({:?}) in {:.2}ms",
        outcome.comparisons,
        outcome.skipped,
        outcome.issues.len(),
        outcome.completion,
        scan_start.elapsed().as_secs_f64() * 1000.0
    );

    emit(
        observer,
        ScanPhase::Annotating,
        95.0,
        outcome.comparisons,
        outcome.skipped,
        "Creating annotated SVG...",
    );
    let annotated = annotate::annotate_document(&root, &outcome.issues, request.threshold);
    let annotated_svg = xml_node_to_string(&annotated);

    let rows = report::issue_rows(&outcome.issues);
    let summary = report::build_summary(
        extraction.segments.len(),
        outcome.comparisons,
        outcome.skipped,
        outcome.issues.len(),
        outcome.completion,
        extraction.decode_errors.len(),
        total_start.elapsed().as_secs_f64() * 1000.0,
    );

    emit(
        observer,
        ScanPhase::Done,
        100.0,
        outcome.comparisons,
        outcome.skipped,
        &report::completion_message(outcome.completion, request.max_comparisons),
    );

    Ok(AnalysisResult {
        issues: outcome.issues,
        rows,
        annotated_svg,
        decode_errors: extraction.decode_errors,
        summary,
    })
}

fn emit(
    observer: &mut dyn FnMut(&ProgressEvent),
    phase: ScanPhase,
    percent: f32,
    comparisons: u64,
    skipped: u64,
    message: &str,
) {
    observer(&ProgressEvent {
        phase,
        percent,
        comparisons,
        skipped,
        message: message.to_string(),
    });
}
