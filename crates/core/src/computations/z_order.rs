use std::collections::HashMap;

use log::{debug, warn};

use super::{Computation, ComputationError, integer, valued};
use crate::model::{HierarchyTreeNode, PropertySource, PropertyTreeNode, PropertyValue, TreeNode};

/// Derives the `zOrderPath` property of every layer.
///
/// A layer's path is its z-parent's path followed by its own `z`. The z-parent
/// is the layer named by `zOrderRelativeOf` when that layer exists, and the
/// hierarchy parent otherwise. Top-level layers start a new path.
#[derive(Debug, Default)]
pub struct ZOrderPathsComputation<'a> {
    root: Option<&'a mut HierarchyTreeNode>,
}

impl ZOrderPathsComputation<'_> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> Computation<'a> for ZOrderPathsComputation<'a> {
    fn set_root(&mut self, root: &'a mut HierarchyTreeNode) -> &mut Self {
        self.root = Some(root);
        self
    }

    fn execute_in_place(&mut self) -> Result<(), ComputationError> {
        let root = self.root.as_deref_mut().ok_or(ComputationError::RootNotSet)?;

        let mut layers = Vec::new();
        for child in root.all_children() {
            collect_layers(child, None, &mut layers)?;
        }

        let by_layer_id: HashMap<i64, usize> = layers
            .iter()
            .enumerate()
            .filter_map(|(index, layer)| Some((layer.layer_id?, index)))
            .collect();

        let mut resolver = PathResolver {
            layers: &layers,
            by_layer_id: &by_layer_id,
            states: vec![State::Pending; layers.len()],
        };
        let mut paths: HashMap<&str, Vec<i64>> = HashMap::with_capacity(layers.len());
        for (index, layer) in layers.iter().enumerate() {
            paths.insert(layer.node_id.as_str(), resolver.path(index)?);
        }
        debug!("computed z-order paths for {} layers", paths.len());

        root.try_for_each_dfs_mut(&mut |node| {
            let Some(path) = paths.get(node.id()) else {
                return Ok(());
            };
            let property = z_order_path_property(&node.property_id("zOrderPath"), path);
            node.add_eager_property(property)
        })?;
        Ok(())
    }
}

#[derive(Debug)]
struct LayerEntry {
    node_id: String,
    parent: Option<usize>,
    z: i64,
    relative_of: Option<i64>,
    layer_id: Option<i64>,
}

fn collect_layers(
    node: &HierarchyTreeNode,
    parent: Option<usize>,
    layers: &mut Vec<LayerEntry>,
) -> Result<(), ComputationError> {
    let owner = node.id();
    let optional_integer = |name: &str| -> Result<Option<i64>, ComputationError> {
        match valued(node.eager_property_by_name(name)?) {
            Some(property) => Ok(Some(integer(owner, property)?)),
            None => Ok(None),
        }
    };

    let index = layers.len();
    layers.push(LayerEntry {
        node_id: owner.to_string(),
        parent,
        z: optional_integer("z")?.unwrap_or(0),
        relative_of: optional_integer("zOrderRelativeOf")?.filter(|id| *id >= 0),
        layer_id: node
            .eager_property_by_name("id")?
            .and_then(PropertyTreeNode::value)
            .and_then(PropertyValue::as_i64),
    });

    for child in node.all_children() {
        collect_layers(child, Some(index), layers)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum State {
    Pending,
    InProgress,
    Done(Vec<i64>),
}

struct PathResolver<'l> {
    layers: &'l [LayerEntry],
    by_layer_id: &'l HashMap<i64, usize>,
    states: Vec<State>,
}

impl PathResolver<'_> {
    fn path(&mut self, index: usize) -> Result<Vec<i64>, ComputationError> {
        match &self.states[index] {
            State::Done(path) => return Ok(path.clone()),
            State::InProgress => {
                return Err(ComputationError::ZOrderCycle {
                    node: self.layers[index].node_id.clone(),
                });
            }
            State::Pending => {}
        }
        self.states[index] = State::InProgress;

        let mut path = match self.z_parent(index) {
            Some(parent) => self.path(parent)?,
            None => Vec::new(),
        };
        path.push(self.layers[index].z);

        self.states[index] = State::Done(path.clone());
        Ok(path)
    }

    fn z_parent(&self, index: usize) -> Option<usize> {
        let layer = &self.layers[index];
        let Some(relative_of) = layer.relative_of else {
            return layer.parent;
        };
        match self.by_layer_id.get(&relative_of) {
            Some(&relative) if relative != index => Some(relative),
            Some(_) => layer.parent,
            None => {
                warn!(
                    "`{}` is relative to missing layer {relative_of}, using its parent",
                    layer.node_id
                );
                layer.parent
            }
        }
    }
}

fn z_order_path_property(id: &str, path: &[i64]) -> PropertyTreeNode {
    path.iter().enumerate().fold(
        PropertyTreeNode::new(id, "zOrderPath").with_source(PropertySource::Calculated),
        |property, (index, z)| {
            let element = PropertyTreeNode::leaf(id, &index.to_string(), *z)
                .with_source(PropertySource::Calculated);
            property.with_child(element)
        },
    )
}
