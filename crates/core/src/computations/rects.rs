use std::cmp::Ordering;
use std::collections::HashMap;

use layerscope_protocol::{Rect, TraceRect, TraceRectBuilder};
use log::{debug, trace};

use super::{
    Computation, ComputationError, boolean, integer, label, number, required_child,
    required_property, valued,
};
use crate::model::{HierarchyTreeNode, PropertyTreeNode, PropertyValue, TreeNode};
use crate::transform::Transform;

/// Attaches display rects to the root and one rect to every layer that is
/// visible or occluded, assigning paint-order depth per layer stack.
///
/// `isComputedVisible` and `occludedBy` must already be attached by a
/// visibility pass.
#[derive(Debug, Default)]
pub struct RectsComputation<'a> {
    root: Option<&'a mut HierarchyTreeNode>,
}

impl RectsComputation<'_> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> Computation<'a> for RectsComputation<'a> {
    fn set_root(&mut self, root: &'a mut HierarchyTreeNode) -> &mut Self {
        self.root = Some(root);
        self
    }

    fn execute_in_place(&mut self) -> Result<(), ComputationError> {
        let root = self.root.as_deref_mut().ok_or(ComputationError::RootNotSet)?;

        let display_rects = match root.eager_property_by_name("displays")? {
            Some(displays) => make_display_rects(displays.all_children())?,
            None => Vec::new(),
        };

        // Next free depth per layer stack. Displays sit below their layers.
        let mut next_depth: HashMap<i64, u32> =
            display_rects.iter().map(|rect| (rect.group_id, 1)).collect();

        let mut layers = root
            .try_filter_dfs(has_layer_rect)?
            .into_iter()
            .map(|node| -> Result<_, ComputationError> { Ok((LayerZKey::of(node)?, node)) })
            .collect::<Result<Vec<_>, _>>()?;
        layers.sort_by(|(a, _), (b, _)| a.cmp_paint_order(b));

        // Walk bottom to top so depth grows in paint order within each stack.
        let mut layer_rects: HashMap<String, TraceRect> = HashMap::with_capacity(layers.len());
        for (_, layer) in layers.iter().rev() {
            let layer_stack = integer(layer.id(), required_property(layer, "layerStack")?)?;
            let depth = next_depth.entry(layer_stack).or_insert(0);
            let rect = make_layer_rect(layer, layer_stack, *depth)?;
            *depth += 1;
            trace!("{} -> depth {} in stack {}", rect.id, rect.depth, rect.group_id);
            layer_rects.insert(layer.id().to_string(), rect);
        }

        debug!(
            "computed {} display rects and {} layer rects",
            display_rects.len(),
            layer_rects.len()
        );

        root.set_rects(display_rects);
        root.for_each_dfs_mut(&mut |node| {
            if !node.is_root() {
                node.set_rects(layer_rects.remove(node.id()).into_iter().collect());
            }
        });
        Ok(())
    }
}

fn make_display_rects(displays: &[PropertyTreeNode]) -> Result<Vec<TraceRect>, ComputationError> {
    let mut name_counts: HashMap<String, u32> = HashMap::new();

    displays
        .iter()
        .enumerate()
        .map(|(index, display)| -> Result<TraceRect, ComputationError> {
            let owner = display.id();
            let layer_stack = integer(owner, required_child(owner, display, "layerStack")?)?;
            let id = label(owner, required_child(owner, display, "id")?)?;
            let mut name = match valued(display.child_by_name("name")) {
                Some(name) => label(owner, name)?,
                None => String::new(),
            };

            let count = name_counts.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                name = format!("{name} (Mirror {count})");
            }

            let size = display.child_by_name("size");
            let dimension = |key: &str| size.and_then(|s| s.child_f64(key)).unwrap_or(0.0);
            let is_virtual = match valued(display.child_by_name("isVirtual")) {
                Some(flag) => boolean(owner, flag)?,
                None => false,
            };

            Ok(TraceRectBuilder::new()
                .x(0.0)
                .y(0.0)
                .width(dimension("w"))
                .height(dimension("h"))
                .id(format!("Display - {id}"))
                .name(name)
                .corner_radius(0.0)
                .transform(Transform::EMPTY.matrix)
                .group_id(layer_stack)
                .is_visible(false)
                .is_display(true)
                .is_virtual(is_virtual)
                .depth(index as u32)
                .build()?)
        })
        .collect()
}

fn make_layer_rect(
    layer: &HierarchyTreeNode,
    layer_stack: i64,
    depth: u32,
) -> Result<TraceRect, ComputationError> {
    let owner = layer.id();
    let is_visible = boolean(owner, required_property(layer, "isComputedVisible")?)?;
    let name = label(owner, required_property(layer, "name")?)?;
    let id = label(owner, required_property(layer, "id")?)?;

    let bounds = required_property(layer, "bounds")?;
    let edge = |key: &str| -> Result<f64, ComputationError> {
        number(owner, required_child(owner, bounds, key)?)
    };
    let rect = Rect::from_ltrb(edge("left")?, edge("top")?, edge("right")?, edge("bottom")?);

    let corner_radius = match valued(layer.eager_property_by_name("cornerRadius")?) {
        Some(radius) => number(owner, radius)?,
        None => 0.0,
    };
    let transform = Transform::from_node(required_property(layer, "transform")?)?;

    Ok(TraceRectBuilder::new()
        .rect(rect)
        .id(format!("{id} {name}"))
        .name(name)
        .corner_radius(corner_radius)
        .transform(transform.matrix)
        .group_id(layer_stack)
        .is_visible(is_visible)
        .is_display(false)
        .is_virtual(false)
        .depth(depth)
        .build()?)
}

/// Layers that are shown, or that are hidden by something else, get a rect.
fn has_layer_rect(node: &HierarchyTreeNode) -> Result<bool, ComputationError> {
    if node.is_root() {
        return Ok(false);
    }

    let is_visible = node
        .eager_property_by_name("isComputedVisible")?
        .and_then(PropertyTreeNode::value)
        .and_then(PropertyValue::as_bool)
        .ok_or_else(|| ComputationError::VisibilityNotComputed {
            node: node.id().to_string(),
        })?;

    if !is_visible {
        let occluded = node
            .eager_property_by_name("occludedBy")?
            .is_some_and(|occluders| !occluders.all_children().is_empty());
        if !occluded {
            return Ok(false);
        }
    }

    Ok(node.eager_property_by_name("bounds")?.is_some())
}

/// Sort key placing layers in paint order, topmost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerZKey {
    z_order_path: Vec<i64>,
    layer_id: Option<i64>,
    node_id: String,
}

impl LayerZKey {
    pub fn new(z_order_path: Vec<i64>, layer_id: Option<i64>, node_id: impl Into<String>) -> Self {
        Self {
            z_order_path,
            layer_id,
            node_id: node_id.into(),
        }
    }

    fn of(node: &HierarchyTreeNode) -> Result<Self, ComputationError> {
        let owner = node.id();
        let z_order_path = required_property(node, "zOrderPath")?
            .all_children()
            .iter()
            .map(|z| integer(owner, z))
            .collect::<Result<Vec<_>, _>>()?;
        let layer_id = node
            .eager_property_by_name("id")?
            .and_then(PropertyTreeNode::value)
            .and_then(PropertyValue::as_i64);
        Ok(Self::new(z_order_path, layer_id, owner))
    }

    /// `Less` when `self` is painted above `other`.
    pub fn cmp_paint_order(&self, other: &Self) -> Ordering {
        compare_z_order_paths(&self.z_order_path, &other.z_order_path).then_with(|| {
            (other.layer_id, &other.node_id).cmp(&(self.layer_id, &self.node_id))
        })
    }
}

/// Compare z-order paths, topmost first.
///
/// The first differing element decides and the larger value wins. When one
/// path extends the other, the next element of the longer path decides: a
/// non-negative z puts it above the shorter path, a negative z below.
pub fn compare_z_order_paths(a: &[i64], b: &[i64]) -> Ordering {
    for (za, zb) in a.iter().zip(b) {
        match zb.cmp(za) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }
    match a.len().cmp(&b.len()) {
        Ordering::Equal => Ordering::Equal,
        Ordering::Greater if a[b.len()] >= 0 => Ordering::Less,
        Ordering::Greater => Ordering::Greater,
        Ordering::Less if b[a.len()] >= 0 => Ordering::Greater,
        Ordering::Less => Ordering::Less,
    }
}
