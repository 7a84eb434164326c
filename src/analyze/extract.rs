//! Geometry extraction
//!
//! Slices `path`, `line`, and `polyline` elements into flat segment
//! collections. Path data is decoded from the straight-command subset
//! only (absolute/relative move and line-to, plus horizontal/vertical
//! variants); every visited coordinate after the first closes a segment
//! with the previous one, so a move inside a path chains into the
//! existing stroke rather than starting a fresh one. Curve,
//! arc, and close-path operands contribute no geometry at all - curved
//! strokes are deliberately under-modeled, not flattened.
//!
//! Missing or non-numeric coordinates are reported as [`DecodeError`]s
//! and the affected segment is skipped, rather than letting NaN
//! propagate into the distance math.

use super::types::{DecodeError, Point, Segment, SegmentKind};
use crate::parse_xml::XmlNode;
use rayon::prelude::*;

/// Output of one extraction pass over a drawing
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Segments grouped by kind (paths, lines, polylines), each group
    /// in document order
    pub segments: Vec<Segment>,
    pub decode_errors: Vec<DecodeError>,
    /// Count of path commands outside the straight-line subset
    pub unsupported_commands: usize,
}

/// Path command letters the decoder recognizes (consumed or skipped).
const COMMAND_CHARS: &[char] = &[
    'M', 'L', 'H', 'V', 'Z', 'C', 'S', 'Q', 'T', 'A', 'm', 'l', 'h', 'v', 'z', 'c', 's', 'q',
    't', 'a',
];

struct ElementRef<'a> {
    kind: SegmentKind,
    owner_index: usize,
    owner_id: u64,
    node: &'a XmlNode,
}

/// Extract all segments from the drawing, grouped by element kind:
/// every `path` first, then every `line`, then every `polyline`, each
/// group in document order. The grouping is observable downstream (it
/// fixes issue discovery order and the truncation point), so it is
/// pinned here rather than left to the tree walk.
///
/// Each geometry element gets a unique `owner_id` (global, across
/// kinds) and a per-kind `owner_index` for report descriptors.
/// Elements decode independently, so decoding runs in parallel and the
/// results are flattened back in element order.
pub fn extract_segments(root: &XmlNode) -> Extraction {
    let elements = collect_elements(root);

    let decoded: Vec<(Vec<Segment>, Vec<DecodeError>, usize)> = elements
        .par_iter()
        .map(|element| match element.kind {
            SegmentKind::Path => decode_path(element),
            SegmentKind::Line => decode_line(element),
            SegmentKind::Polyline => decode_polyline(element),
        })
        .collect();

    let mut extraction = Extraction {
        segments: Vec::new(),
        decode_errors: Vec::new(),
        unsupported_commands: 0,
    };
    for (segments, errors, unsupported) in decoded {
        extraction.segments.extend(segments);
        extraction.decode_errors.extend(errors);
        extraction.unsupported_commands += unsupported;
    }
    extraction
}

/// Gather geometry elements kind-grouped: one walk per kind so paths
/// precede lines precede polylines regardless of document interleaving.
fn collect_elements(root: &XmlNode) -> Vec<ElementRef<'_>> {
    let mut elements = Vec::new();
    for kind in [SegmentKind::Path, SegmentKind::Line, SegmentKind::Polyline] {
        collect_kind(root, kind, &mut elements);
    }
    elements
}

fn collect_kind<'a>(node: &'a XmlNode, kind: SegmentKind, out: &mut Vec<ElementRef<'a>>) {
    if node.local_name() == kind.label() {
        // owner_index restarts per kind, owner_id is global
        let owner_index = out.iter().filter(|e| e.kind == kind).count();
        out.push(ElementRef {
            kind,
            owner_index,
            owner_id: out.len() as u64,
            node,
        });
    }

    for child in &node.children {
        collect_kind(child, kind, out);
    }
}

/// Accumulates visited points into segments. A decode error breaks the
/// chain so no segment spans a bad coordinate.
struct ChainBuilder {
    kind: SegmentKind,
    owner_index: usize,
    owner_id: u64,
    prev: Option<Point>,
    segments: Vec<Segment>,
    errors: Vec<DecodeError>,
}

impl ChainBuilder {
    fn new(element: &ElementRef<'_>) -> Self {
        ChainBuilder {
            kind: element.kind,
            owner_index: element.owner_index,
            owner_id: element.owner_id,
            prev: None,
            segments: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn visit(&mut self, p: Point) {
        if let Some(q) = self.prev {
            self.segments
                .push(Segment::new(self.kind, self.owner_index, self.owner_id, q, p));
        }
        self.prev = Some(p);
    }

    fn error(&mut self, detail: String) {
        self.errors.push(DecodeError {
            kind: self.kind,
            owner_index: self.owner_index,
            detail,
        });
        self.prev = None;
    }
}

/// Split path data into (command letter, operand text) chunks.
/// Text before the first command letter is ignored.
fn split_commands(d: &str) -> Vec<(char, &str)> {
    let mut out = Vec::new();
    let mut current: Option<(char, usize)> = None;
    for (i, ch) in d.char_indices() {
        if COMMAND_CHARS.contains(&ch) {
            if let Some((cmd, start)) = current.take() {
                out.push((cmd, &d[start..i]));
            }
            current = Some((ch, i + ch.len_utf8()));
        }
    }
    if let Some((cmd, start)) = current {
        out.push((cmd, &d[start..]));
    }
    out
}

fn operand_tokens(operands: &str) -> Vec<&str> {
    operands
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect()
}

fn decode_path(element: &ElementRef<'_>) -> (Vec<Segment>, Vec<DecodeError>, usize) {
    let mut chain = ChainBuilder::new(element);
    let mut unsupported = 0usize;

    // Elements without path data carry no geometry
    let d = match element.node.attributes.get("d") {
        Some(d) => d,
        None => return (chain.segments, chain.errors, 0),
    };

    let mut cursor = Point::new(0.0, 0.0);

    for (cmd, operands) in split_commands(d) {
        let tokens = operand_tokens(operands);
        match cmd {
            'M' | 'L' | 'm' | 'l' => {
                let relative = cmd.is_ascii_lowercase();
                for pair in tokens.chunks(2) {
                    if pair.len() < 2 {
                        chain.error(format!("odd coordinate count in '{}' command", cmd));
                        break;
                    }
                    match (pair[0].parse::<f32>(), pair[1].parse::<f32>()) {
                        (Ok(x), Ok(y)) => {
                            if relative {
                                cursor.x += x;
                                cursor.y += y;
                            } else {
                                cursor = Point::new(x, y);
                            }
                            chain.visit(cursor);
                        }
                        _ => {
                            chain.error(format!(
                                "non-numeric coordinate '{} {}' in '{}' command",
                                pair[0], pair[1], cmd
                            ));
                        }
                    }
                }
            }
            'H' | 'h' => {
                for token in &tokens {
                    match token.parse::<f32>() {
                        Ok(x) => {
                            if cmd == 'h' {
                                cursor.x += x;
                            } else {
                                cursor.x = x;
                            }
                            chain.visit(cursor);
                        }
                        Err(_) => {
                            chain.error(format!("non-numeric coordinate '{}' in '{}' command", token, cmd));
                        }
                    }
                }
            }
            'V' | 'v' => {
                for token in &tokens {
                    match token.parse::<f32>() {
                        Ok(y) => {
                            if cmd == 'v' {
                                cursor.y += y;
                            } else {
                                cursor.y = y;
                            }
                            chain.visit(cursor);
                        }
                        Err(_) => {
                            chain.error(format!("non-numeric coordinate '{}' in '{}' command", token, cmd));
                        }
                    }
                }
            }
            // Curves, arcs, and close-path: operands are not consumed as
            // points and the cursor does not move. Counted, not reported.
            _ => {
                unsupported += 1;
            }
        }
    }

    (chain.segments, chain.errors, unsupported)
}

fn decode_line(element: &ElementRef<'_>) -> (Vec<Segment>, Vec<DecodeError>, usize) {
    let mut chain = ChainBuilder::new(element);

    let mut coords = [0.0f32; 4];
    let mut ok = true;
    for (i, attr) in ["x1", "y1", "x2", "y2"].iter().enumerate() {
        match element.node.attributes.get(*attr) {
            Some(value) => match value.parse::<f32>() {
                Ok(v) => coords[i] = v,
                Err(_) => {
                    chain.error(format!("non-numeric attribute {}=\"{}\"", attr, value));
                    ok = false;
                }
            },
            None => {
                chain.error(format!("missing attribute '{}'", attr));
                ok = false;
            }
        }
    }

    if ok {
        chain.visit(Point::new(coords[0], coords[1]));
        chain.visit(Point::new(coords[2], coords[3]));
    }

    (chain.segments, chain.errors, 0)
}

fn decode_polyline(element: &ElementRef<'_>) -> (Vec<Segment>, Vec<DecodeError>, usize) {
    let mut chain = ChainBuilder::new(element);

    let points = match element.node.attributes.get("points") {
        Some(p) => p,
        None => {
            chain.error("missing 'points' attribute".to_string());
            return (chain.segments, chain.errors, 0);
        }
    };

    let tokens = operand_tokens(points);
    for pair in tokens.chunks(2) {
        if pair.len() < 2 {
            chain.error("odd coordinate count in points list".to_string());
            break;
        }
        match (pair[0].parse::<f32>(), pair[1].parse::<f32>()) {
            (Ok(x), Ok(y)) => chain.visit(Point::new(x, y)),
            _ => {
                chain.error(format!("non-numeric point '{},{}'", pair[0], pair[1]));
            }
        }
    }

    (chain.segments, chain.errors, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_xml::parse_svg_str;

    fn extract(svg: &str) -> Extraction {
        let root = parse_svg_str(svg).expect("parse failed");
        extract_segments(&root)
    }

    #[test]
    fn test_line_element() {
        let ex = extract(r#"<svg><line x1="0" y1="0" x2="3" y2="4"/></svg>"#);
        assert_eq!(ex.segments.len(), 1);
        let seg = &ex.segments[0];
        assert_eq!(seg.kind, SegmentKind::Line);
        assert_eq!(seg.start, Point::new(0.0, 0.0));
        assert_eq!(seg.end, Point::new(3.0, 4.0));
        assert_eq!(seg.bbox.max_x, 3.0);
        assert!(ex.decode_errors.is_empty());
    }

    #[test]
    fn test_polyline_yields_n_minus_one_segments() {
        let ex = extract(r#"<svg><polyline points="0,0 1,0 1,1 2,1"/></svg>"#);
        assert_eq!(ex.segments.len(), 3);
        assert_eq!(ex.segments[1].start, Point::new(1.0, 0.0));
        assert_eq!(ex.segments[1].end, Point::new(1.0, 1.0));
    }

    #[test]
    fn test_path_absolute_and_relative_commands() {
        let ex = extract(r#"<svg><path d="M 1 1 L 4 1 l 0 3 H 10 h -2 V 0 v 1"/></svg>"#);
        // Visited points: (1,1) (4,1) (4,4) (10,4) (8,4) (8,0) (8,1)
        assert_eq!(ex.segments.len(), 6);
        assert_eq!(ex.segments[2].end, Point::new(10.0, 4.0));
        assert_eq!(ex.segments[4].end, Point::new(8.0, 0.0));
        assert_eq!(ex.segments[5].end, Point::new(8.0, 1.0));
    }

    #[test]
    fn test_move_chains_into_previous_stroke() {
        // A second M does not break the chain; the jump becomes a segment
        let ex = extract(r#"<svg><path d="M 0 0 L 1 0 M 5 5 L 6 5"/></svg>"#);
        assert_eq!(ex.segments.len(), 3);
        assert_eq!(ex.segments[1].start, Point::new(1.0, 0.0));
        assert_eq!(ex.segments[1].end, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_implicit_lineto_in_move_operands() {
        let ex = extract(r#"<svg><path d="M 0 0 10 0 10 10"/></svg>"#);
        assert_eq!(ex.segments.len(), 2);
    }

    #[test]
    fn test_curve_operands_are_ignored() {
        let ex = extract(r#"<svg><path d="M 0 0 C 1 1 2 2 3 3 L 0 10 Z"/></svg>"#);
        // Only M and L contribute points; C operands and Z are skipped
        assert_eq!(ex.segments.len(), 1);
        assert_eq!(ex.segments[0].start, Point::new(0.0, 0.0));
        assert_eq!(ex.segments[0].end, Point::new(0.0, 10.0));
        assert_eq!(ex.unsupported_commands, 2);
        assert!(ex.decode_errors.is_empty());
    }

    #[test]
    fn test_owner_identity_and_per_kind_indices() {
        let ex = extract(
            r#"<svg>
                <line x1="0" y1="0" x2="1" y2="0"/>
                <path d="M 0 0 L 1 1"/>
                <line x1="5" y1="5" x2="6" y2="5"/>
            </svg>"#,
        );
        assert_eq!(ex.segments.len(), 3);
        // Kind-grouped: the path precedes both lines despite document order
        assert_eq!(ex.segments[0].descriptor(), "path 0");
        assert_eq!(ex.segments[1].descriptor(), "line 0");
        assert_eq!(ex.segments[2].descriptor(), "line 1");
        // Global owner ids all distinct
        assert_ne!(ex.segments[0].owner_id, ex.segments[1].owner_id);
        assert_ne!(ex.segments[1].owner_id, ex.segments[2].owner_id);
    }

    #[test]
    fn test_kind_groups_keep_document_order_within_kind() {
        let ex = extract(
            r#"<svg>
                <polyline points="0,0 1,0"/>
                <line x1="0" y1="0" x2="1" y2="0"/>
                <polyline points="2,0 3,0"/>
                <path d="M 0 0 L 1 0"/>
            </svg>"#,
        );
        let order: Vec<String> = ex.segments.iter().map(|s| s.descriptor()).collect();
        assert_eq!(order, vec!["path 0", "line 0", "polyline 0", "polyline 1"]);
        // The first polyline in the document keeps index 0
        assert_eq!(ex.segments[2].start, Point::new(0.0, 0.0));
        assert_eq!(ex.segments[3].start, Point::new(2.0, 0.0));
    }

    #[test]
    fn test_nested_groups_are_walked() {
        let ex = extract(r#"<svg><g><g><line x1="0" y1="0" x2="1" y2="0"/></g></g></svg>"#);
        assert_eq!(ex.segments.len(), 1);
    }

    #[test]
    fn test_bad_line_attribute_is_reported_not_dropped_silently() {
        let ex = extract(r#"<svg><line x1="abc" y1="0" x2="1" y2="0"/></svg>"#);
        assert!(ex.segments.is_empty());
        assert_eq!(ex.decode_errors.len(), 1);
        assert!(ex.decode_errors[0].detail.contains("x1"));
    }

    #[test]
    fn test_missing_line_attribute_is_reported() {
        let ex = extract(r#"<svg><line x1="0" y1="0" x2="1"/></svg>"#);
        assert!(ex.segments.is_empty());
        assert_eq!(ex.decode_errors.len(), 1);
        assert!(ex.decode_errors[0].detail.contains("y2"));
    }

    #[test]
    fn test_bad_polyline_point_breaks_chain() {
        // No segment may span the bad middle point
        let ex = extract(r#"<svg><polyline points="0,0 1,0 x,y 3,0 4,0"/></svg>"#);
        assert_eq!(ex.decode_errors.len(), 1);
        assert_eq!(ex.segments.len(), 2);
        assert_eq!(ex.segments[0].end, Point::new(1.0, 0.0));
        assert_eq!(ex.segments[1].start, Point::new(3.0, 0.0));
    }

    #[test]
    fn test_odd_polyline_point_count_is_reported() {
        let ex = extract(r#"<svg><polyline points="0,0 1,0 2"/></svg>"#);
        assert_eq!(ex.segments.len(), 1);
        assert_eq!(ex.decode_errors.len(), 1);
    }

    #[test]
    fn test_path_without_data_attribute_is_skipped() {
        let ex = extract(r#"<svg><path stroke="black"/></svg>"#);
        assert!(ex.segments.is_empty());
        assert!(ex.decode_errors.is_empty());
    }
}
