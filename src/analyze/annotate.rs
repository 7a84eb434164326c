//! Annotation overlay
//!
//! Builds a derived drawing: the original tree plus one `<g>` overlay
//! holding a circular marker and a crosshair per flagged location
//! (first 100 issues). The original geometry is never mutated; removing
//! the `spacing-issues` group restores the input drawing exactly.

use super::report::MAX_REPORTED_ISSUES;
use super::types::{Issue, Point};
use crate::parse_xml::XmlNode;
use crate::serialize_xml::fmt_coord;

/// One overlay marker: a circle of radius 2x threshold at an issue location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationMark {
    pub center: Point,
    pub radius: f32,
}

/// Marks for the first 100 issues, one per issue.
pub fn annotation_marks(issues: &[Issue], threshold: f32) -> Vec<AnnotationMark> {
    issues
        .iter()
        .take(MAX_REPORTED_ISSUES)
        .map(|issue| AnnotationMark {
            center: issue.location,
            radius: threshold * 2.0,
        })
        .collect()
}

/// Clone the drawing and append the marker overlay group.
pub fn annotate_document(root: &XmlNode, issues: &[Issue], threshold: f32) -> XmlNode {
    let mut layer = XmlNode::new("g")
        .with_attr("id", "spacing-issues")
        .with_attr("stroke", "red")
        .with_attr("fill", "red")
        .with_attr("opacity", "0.7");

    for mark in annotation_marks(issues, threshold) {
        let circle = XmlNode::new("circle")
            .with_attr("cx", fmt_coord(mark.center.x))
            .with_attr("cy", fmt_coord(mark.center.y))
            .with_attr("r", fmt_coord(mark.radius))
            .with_attr("fill", "none")
            .with_attr("stroke", "red")
            .with_attr("stroke-width", "0.2");
        layer.children.push(circle);

        let horizontal = XmlNode::new("line")
            .with_attr("x1", fmt_coord(mark.center.x - threshold))
            .with_attr("y1", fmt_coord(mark.center.y))
            .with_attr("x2", fmt_coord(mark.center.x + threshold))
            .with_attr("y2", fmt_coord(mark.center.y))
            .with_attr("stroke-width", "0.1");
        layer.children.push(horizontal);

        let vertical = XmlNode::new("line")
            .with_attr("x1", fmt_coord(mark.center.x))
            .with_attr("y1", fmt_coord(mark.center.y - threshold))
            .with_attr("x2", fmt_coord(mark.center.x))
            .with_attr("y2", fmt_coord(mark.center.y + threshold))
            .with_attr("stroke-width", "0.1");
        layer.children.push(vertical);
    }

    let mut annotated = root.clone();
    annotated.children.push(layer);
    annotated
}
