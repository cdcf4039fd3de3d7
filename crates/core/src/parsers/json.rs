use std::collections::HashSet;

use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{HierarchyTreeNode, PropertiesProvider, PropertyTreeNode, PropertyValue, TreeError};

#[derive(Debug, Error)]
pub enum JsonFrameError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layer at {path} has no usable `id`")]
    MissingLayerId { path: String },
    #[error("layer id {0} appears more than once")]
    DuplicateLayerId(String),
}

/// How layer properties are handed to the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Every property is materialized while loading.
    #[default]
    Eager,
    /// Properties are built on first access; an eager pass must run before
    /// computations can read them.
    Lazy,
}

/// A frame dump: `{"displays": [...], "layers": [...]}`.
#[derive(Debug, Deserialize)]
struct FrameDump {
    #[serde(default)]
    displays: Vec<Value>,
    #[serde(default)]
    layers: Vec<LayerDump>,
}

#[derive(Debug, Deserialize)]
struct LayerDump {
    #[serde(default)]
    children: Vec<LayerDump>,
    #[serde(flatten)]
    properties: Map<String, Value>,
}

/// Build a property tree from a JSON value.
///
/// Objects become named children, arrays become children `"0"`, `"1"`, ...,
/// and `null` becomes a node without a value.
pub fn property_tree_from_json(id: &str, name: &str, value: &Value) -> PropertyTreeNode {
    let node = PropertyTreeNode::new(id, name);
    match value {
        Value::Null => node,
        Value::Bool(b) => node.with_value(*b),
        Value::Number(n) => match number_value(n) {
            Some(value) => node.with_value(value),
            None => node,
        },
        Value::String(s) => node.with_value(s.as_str()),
        Value::Array(items) => items.iter().enumerate().fold(node, |node, (index, item)| {
            let key = index.to_string();
            let child = property_tree_from_json(&node.child_id(&key), &key, item);
            node.with_child(child)
        }),
        Value::Object(map) => properties_from_map(node, map),
    }
}

fn properties_from_map(node: PropertyTreeNode, map: &Map<String, Value>) -> PropertyTreeNode {
    map.iter().fold(node, |node, (key, item)| {
        let child = property_tree_from_json(&node.child_id(key), key, item);
        node.with_child(child)
    })
}

fn number_value(n: &serde_json::Number) -> Option<PropertyValue> {
    if let Some(i) = n.as_i64() {
        Some(PropertyValue::Int(i))
    } else if let Some(u) = n.as_u64() {
        Some(PropertyValue::BigInt(i128::from(u)))
    } else {
        n.as_f64().map(PropertyValue::Float)
    }
}

/// Load a frame dump into a hierarchy tree.
///
/// The root holds the `displays` property; each layer object carries its
/// properties and an optional `children` array. Layer node ids are
/// `"{id} {name}"`.
pub fn hierarchy_from_json(
    data: &[u8],
    resolution: Resolution,
) -> Result<HierarchyTreeNode, JsonFrameError> {
    let dump: FrameDump = serde_json::from_slice(data)?;

    let displays = property_tree_from_json(
        "root.displays",
        "displays",
        &Value::Array(dump.displays),
    );
    let mut root = HierarchyTreeNode::new_root(
        "root",
        "root",
        PropertiesProvider::eager(PropertyTreeNode::new("root", "root").with_child(displays)),
    );

    let mut seen = HashSet::new();
    for (index, layer) in dump.layers.into_iter().enumerate() {
        let child = build_layer(layer, format!("layers[{index}]"), resolution, &mut seen)?;
        root.add_or_replace_child(child);
    }
    debug!("loaded {} layers ({resolution:?})", seen.len());
    Ok(root)
}

fn build_layer(
    layer: LayerDump,
    path: String,
    resolution: Resolution,
    seen: &mut HashSet<String>,
) -> Result<HierarchyTreeNode, JsonFrameError> {
    let LayerDump {
        children,
        properties,
    } = layer;

    let id = match properties.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(JsonFrameError::MissingLayerId { path }),
    };
    if !seen.insert(id.clone()) {
        return Err(JsonFrameError::DuplicateLayerId(id));
    }
    let name = match properties.get("name") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => {
            warn!("layer {id} at {path} has no name");
            String::new()
        }
    };
    let node_id = format!("{id} {name}");

    let provider = match resolution {
        Resolution::Eager => PropertiesProvider::eager(properties_from_map(
            PropertyTreeNode::new(node_id.clone(), node_id.clone()),
            &properties,
        )),
        Resolution::Lazy => {
            let owner = node_id.clone();
            PropertiesProvider::lazy(
                node_id.clone(),
                move || -> Result<PropertyTreeNode, TreeError> {
                    Ok(properties_from_map(
                        PropertyTreeNode::new(owner.clone(), owner.clone()),
                        &properties,
                    ))
                },
            )
        }
    };

    let mut node = HierarchyTreeNode::new(node_id, name, provider);
    for (index, child) in children.into_iter().enumerate() {
        let child_path = format!("{path}.children[{index}]");
        node.add_or_replace_child(build_layer(child, child_path, resolution, seen)?);
    }
    Ok(node)
}
