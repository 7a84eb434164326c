// Annotated output: marker overlay shape, caps, and additivity
use plotcheck::{run_analysis, AnalysisRequest};
use std::fmt::Write;

fn hatch_svg(line_count: usize, spacing: f32) -> String {
    let mut svg = String::from("<svg xmlns=\"http://www.w3.org/2000/svg\">\n");
    for i in 0..line_count {
        let x = i as f32 * spacing;
        let _ = writeln!(svg, "  <line x1=\"{x}\" y1=\"0\" x2=\"{x}\" y2=\"10\" />");
    }
    svg.push_str("</svg>\n");
    svg
}

#[test]
fn test_markers_capped_at_100() {
    // 150 lines 0.2 apart: each adjacent pair is an issue (149 total)
    let svg = hatch_svg(150, 0.2);
    let request = AnalysisRequest {
        threshold: 0.3,
        max_comparisons: 5_000_000,
    };
    let result = run_analysis(&svg, &request).expect("analysis failed");

    assert_eq!(result.summary.issue_count, 149);
    assert_eq!(result.rows.len(), 100);
    assert_eq!(result.annotated_svg.matches("<circle").count(), 100);
    println!("{} issues, {} marked", result.summary.issue_count, 100);
}

#[test]
fn test_clean_drawing_gets_empty_overlay() {
    let svg = hatch_svg(5, 10.0);
    let request = AnalysisRequest {
        threshold: 0.5,
        max_comparisons: 1_000_000,
    };
    let result = run_analysis(&svg, &request).expect("analysis failed");

    assert_eq!(result.summary.issue_count, 0);
    assert_eq!(result.annotated_svg.matches("<circle").count(), 0);
    // The overlay group is still present, just empty
    assert!(result.annotated_svg.contains("id=\"spacing-issues\""));
}

#[test]
fn test_overlay_is_strictly_additive() {
    let svg = hatch_svg(10, 0.2);
    let request = AnalysisRequest {
        threshold: 0.3,
        max_comparisons: 1_000_000,
    };
    let result = run_analysis(&svg, &request).expect("analysis failed");

    // 9 issues: 10 original lines + 2 crosshair lines per marker
    assert_eq!(result.summary.issue_count, 9);
    assert_eq!(result.annotated_svg.matches("<line").count(), 10 + 2 * 9);
    assert_eq!(result.annotated_svg.matches("<circle").count(), 9);

    // Every original line survives verbatim placement
    for i in 0..10 {
        let x = i as f32 * 0.2;
        assert!(
            result.annotated_svg.contains(&format!("x1=\"{x}\"")),
            "line at x={x} missing from annotated output"
        );
    }
}

#[test]
fn test_marker_geometry_follows_threshold() {
    let svg = r#"<svg>
      <line x1="0" y1="0" x2="0" y2="10" />
      <line x1="0.4" y1="0" x2="0.4" y2="10" />
    </svg>"#;
    let request = AnalysisRequest {
        threshold: 0.5,
        max_comparisons: 1_000_000,
    };
    let result = run_analysis(svg, &request).expect("analysis failed");

    // Marker at the first segment's midpoint, radius 2x threshold
    assert!(result.annotated_svg.contains("cx=\"0\""));
    assert!(result.annotated_svg.contains("cy=\"5\""));
    assert!(result.annotated_svg.contains("r=\"1\""));
    // Crosshair spans +/- threshold around the midpoint
    assert!(result.annotated_svg.contains("x1=\"-0.5\""));
    assert!(result.annotated_svg.contains("x2=\"0.5\""));
    assert!(result.annotated_svg.contains("y1=\"4.5\""));
    assert!(result.annotated_svg.contains("y2=\"5.5\""));
}
