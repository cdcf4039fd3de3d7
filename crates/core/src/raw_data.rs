//! Shape-based classification of raw property nodes.
//!
//! Viewers use these predicates to decide how to present a leaf regardless of
//! which trace format produced it. A node matches a category when its children
//! are a non-empty subset of that category's names and each of them holds a
//! number. None of these functions fail; no match is `false`.

use crate::model::{PropertyTreeNode, PropertyValue, TreeNode};

const COLOR: &[&str] = &["r", "g", "b", "a"];
const RECT: &[&str] = &["left", "top", "right", "bottom"];
const SIZE: &[&str] = &["w", "h"];
const POSITION: &[&str] = &["x", "y"];
const BUFFER: &[&str] = &["width", "height", "stride", "format"];
const MATRIX: &[&str] = &["dsdx", "dtdx", "dsdy", "dtdy", "tx", "ty"];

fn has_only_numeric_children(node: &PropertyTreeNode, names: &[&str]) -> bool {
    let children = node.all_children();
    !children.is_empty()
        && children.iter().all(|child| {
            names.iter().any(|name| *name == child.name())
                && child.all_children().is_empty()
                && child.value().and_then(PropertyValue::as_f64).is_some()
        })
}

fn has_any_child(node: &PropertyTreeNode, names: &[&str]) -> bool {
    names.iter().any(|name| node.child_by_name(name).is_some())
}

pub fn is_color(node: &PropertyTreeNode) -> bool {
    has_only_numeric_children(node, COLOR)
}

pub fn is_rect(node: &PropertyTreeNode) -> bool {
    has_only_numeric_children(node, RECT)
}

pub fn is_size(node: &PropertyTreeNode) -> bool {
    has_only_numeric_children(node, SIZE)
}

pub fn is_position(node: &PropertyTreeNode) -> bool {
    has_only_numeric_children(node, POSITION)
}

/// Buffer sizes carry `stride` or `format`, which plain sizes never do.
pub fn is_buffer(node: &PropertyTreeNode) -> bool {
    has_only_numeric_children(node, BUFFER) && has_any_child(node, &["stride", "format"])
}

pub fn is_matrix(node: &PropertyTreeNode) -> bool {
    has_only_numeric_children(node, MATRIX) && has_any_child(node, &MATRIX[..4])
}

/// A region is a single `rect` child listing rects. An empty list qualifies.
pub fn is_region(node: &PropertyTreeNode) -> bool {
    match node.all_children() {
        [rects] if rects.name() == "rect" && rects.value().is_none() => {
            rects.all_children().iter().all(is_rect)
        }
        _ => false,
    }
}

/// Whether a color or rect holds its "unset" value.
///
/// Colors are empty when alpha is 0 (missing alpha counts as 0) or when a
/// channel carries the negative unset sentinel. Rects are empty when width or
/// height is not positive, with missing edges read as 0.
pub fn is_empty_obj(node: &PropertyTreeNode) -> bool {
    let get = |name: &str| node.child_f64(name);

    if is_color(node) {
        let alpha = get("a").unwrap_or(0.0);
        return alpha <= 0.0 || ["r", "g", "b"].into_iter().any(|c| get(c).is_some_and(|v| v < 0.0));
    }
    if is_rect(node) {
        let edge = |name: &str| get(name).unwrap_or(0.0);
        return edge("right") - edge("left") <= 0.0 || edge("bottom") - edge("top") <= 0.0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, children: &[(&str, f64)]) -> PropertyTreeNode {
        let id = format!("test node.{name}");
        children.iter().fold(PropertyTreeNode::new(id.clone(), name), |n, (child, value)| {
            n.with_child(PropertyTreeNode::leaf(&id, child, *value))
        })
    }

    fn color(r: Option<f64>, g: Option<f64>, b: Option<f64>, a: Option<f64>) -> PropertyTreeNode {
        let channels: Vec<(&str, f64)> = [("r", r), ("g", g), ("b", b), ("a", a)]
            .into_iter()
            .filter_map(|(name, v)| v.map(|v| (name, v)))
            .collect();
        node("color", &channels)
    }

    fn rect(l: Option<f64>, t: Option<f64>, r: Option<f64>, b: Option<f64>) -> PropertyTreeNode {
        let edges: Vec<(&str, f64)> = [("left", l), ("top", t), ("right", r), ("bottom", b)]
            .into_iter()
            .filter_map(|(name, v)| v.map(|v| (name, v)))
            .collect();
        node("rect", &edges)
    }

    #[test]
    fn identifies_color() {
        assert!(is_color(&color(Some(0.0), Some(0.0), Some(0.0), Some(1.0))));
        assert!(is_color(&color(None, None, None, Some(1.0))));
        assert!(!is_color(&node("color", &[("a", 1.0), ("extra", 2.0)])));
        assert!(!is_color(&node("color", &[])));
    }

    #[test]
    fn identifies_rect() {
        assert!(is_rect(&rect(Some(0.0), Some(0.0), Some(1.0), Some(1.0))));
        assert!(is_rect(&rect(Some(0.0), Some(0.0), None, None)));
        assert!(is_rect(&rect(None, None, Some(1.0), Some(1.0))));
        assert!(!is_rect(&node("pos", &[("x", 0.0), ("y", 0.0)])));
    }

    #[test]
    fn identifies_size_and_buffer() {
        let size = node("size", &[("w", 0.0), ("h", 0.0)]);
        assert!(is_size(&size));
        assert!(!is_buffer(&size));
        assert!(is_size(&node("size", &[("w", 0.0)])));
        assert!(is_size(&node("size", &[("h", 0.0)])));
        assert!(!is_size(&node("size", &[("w", 0.0), ("h", 0.0), ("x", 0.0), ("y", 0.0)])));

        let buffer = node(
            "buffer",
            &[("width", 1.0), ("height", 1.0), ("stride", 1.0), ("format", 1.0)],
        );
        assert!(is_buffer(&buffer));
        assert!(!is_size(&buffer));
        assert!(!is_buffer(&node("buffer", &[("width", 1.0), ("height", 1.0)])));
    }

    #[test]
    fn identifies_position() {
        let pos = node("pos", &[("x", 0.0), ("y", 0.0)]);
        assert!(is_position(&pos));
        assert!(!is_rect(&pos));
        assert!(is_position(&node("pos", &[("x", 0.0)])));
        assert!(is_position(&node("pos", &[("y", 0.0)])));
        assert!(!is_position(&node("pos", &[("w", 0.0), ("h", 0.0), ("x", 0.0), ("y", 0.0)])));
    }

    #[test]
    fn identifies_matrix() {
        assert!(is_matrix(&node("matrix", &[("dsdx", 1.0), ("dtdy", 1.0), ("tx", 4.0)])));
        assert!(!is_matrix(&node("matrix", &[("tx", 4.0), ("ty", 4.0)])));
    }

    #[test]
    fn non_numeric_children_do_not_match() {
        let n = PropertyTreeNode::new("n", "color")
            .with_child(PropertyTreeNode::leaf("n", "a", "opaque"));
        assert!(!is_color(&n));
    }

    #[test]
    fn identifies_region() {
        let mut region = PropertyTreeNode::new("test node", "region")
            .with_child(PropertyTreeNode::new("test node.rect", "rect"));
        assert!(is_region(&region));

        let mut rects = region.remove_child("rect").unwrap();
        for (i, r) in [
            rect(Some(0.0), Some(0.0), Some(1.0), Some(1.0)),
            rect(Some(0.0), Some(0.0), None, None),
            rect(None, None, Some(1.0), Some(1.0)),
        ]
        .into_iter()
        .enumerate()
        {
            let child = r.all_children().iter().cloned().fold(
                PropertyTreeNode::new(rects.child_id(&i.to_string()), i.to_string()),
                PropertyTreeNode::with_child,
            );
            rects.add_or_replace_child(child);
        }
        region.add_or_replace_child(rects.clone());
        assert!(is_region(&region));

        let bad = color(Some(0.0), Some(0.0), Some(0.0), Some(0.0));
        let bad = bad.all_children().iter().cloned().fold(
            PropertyTreeNode::new(rects.child_id("3"), "3"),
            PropertyTreeNode::with_child,
        );
        rects.add_or_replace_child(bad);
        region.add_or_replace_child(rects);
        assert!(!is_region(&region));
    }

    #[test]
    fn non_empty_color_and_rect() {
        assert!(!is_empty_obj(&color(Some(0.0), Some(8.0), Some(0.0), Some(1.0))));
        assert!(!is_empty_obj(&rect(Some(0.0), Some(0.0), Some(1.0), Some(1.0))));
        assert!(!is_empty_obj(&rect(None, None, Some(1.0), Some(1.0))));
    }

    #[test]
    fn empty_color_and_rect() {
        assert!(is_empty_obj(&color(Some(-1.0), Some(-1.0), None, Some(1.0))));
        assert!(is_empty_obj(&color(Some(1.0), Some(1.0), Some(1.0), Some(0.0))));
        assert!(is_empty_obj(&rect(Some(0.0), Some(0.0), None, None)));
        assert!(is_empty_obj(&rect(Some(0.0), Some(0.0), Some(0.0), Some(0.0))));
    }

    #[test]
    fn other_shapes_are_never_empty() {
        assert!(!is_empty_obj(&node("size", &[("w", 0.0), ("h", 0.0)])));
        assert!(!is_empty_obj(&PropertyTreeNode::new("n", "n")));
    }
}
