pub mod rects;
pub mod z_order;

use layerscope_protocol::TraceRectBuildError;
use thiserror::Error;

use crate::model::{HierarchyTreeNode, PropertyTreeNode, PropertyValue, TreeError, TreeNode};
use crate::transform::TransformError;

pub use rects::RectsComputation;
pub use z_order::ZOrderPathsComputation;

#[derive(Debug, Error)]
pub enum ComputationError {
    #[error("root not set")]
    RootNotSet,
    #[error("visibility has not been computed for `{node}`")]
    VisibilityNotComputed { node: String },
    #[error("`{node}` is missing required property `{property}`")]
    MissingProperty { node: String, property: String },
    #[error("property `{property}` of `{node}` is not a valid {expected}")]
    InvalidValue {
        node: String,
        property: String,
        expected: &'static str,
    },
    #[error("relative z-order parents of `{node}` form a cycle")]
    ZOrderCycle { node: String },
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("invalid transform: {0}")]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Rect(#[from] TraceRectBuildError),
}

/// An in-place pass over one frame's hierarchy tree.
///
/// The root is borrowed mutably for the lifetime of the computation, so one
/// instance can never work on two trees at once.
pub trait Computation<'a> {
    fn set_root(&mut self, root: &'a mut HierarchyTreeNode) -> &mut Self;
    fn execute_in_place(&mut self) -> Result<(), ComputationError>;
}

pub(crate) fn required_property<'n>(
    node: &'n HierarchyTreeNode,
    name: &str,
) -> Result<&'n PropertyTreeNode, ComputationError> {
    node.eager_property_by_name(name)?
        .ok_or_else(|| ComputationError::MissingProperty {
            node: node.id().to_string(),
            property: name.to_string(),
        })
}

pub(crate) fn required_child<'p>(
    owner: &str,
    parent: &'p PropertyTreeNode,
    name: &str,
) -> Result<&'p PropertyTreeNode, ComputationError> {
    parent
        .child_by_name(name)
        .ok_or_else(|| ComputationError::MissingProperty {
            node: owner.to_string(),
            property: format!("{}.{name}", parent.name()),
        })
}

/// An optional property that is present but holds no value reads as absent.
pub(crate) fn valued(property: Option<&PropertyTreeNode>) -> Option<&PropertyTreeNode> {
    property.filter(|p| p.value().is_some())
}

fn typed<'p, T>(
    owner: &str,
    property: &'p PropertyTreeNode,
    expected: &'static str,
    read: impl FnOnce(&'p PropertyValue) -> Option<T>,
) -> Result<T, ComputationError> {
    property
        .value()
        .and_then(read)
        .ok_or_else(|| ComputationError::InvalidValue {
            node: owner.to_string(),
            property: property.name().to_string(),
            expected,
        })
}

pub(crate) fn number(owner: &str, property: &PropertyTreeNode) -> Result<f64, ComputationError> {
    typed(owner, property, "number", PropertyValue::as_f64)
}

pub(crate) fn integer(owner: &str, property: &PropertyTreeNode) -> Result<i64, ComputationError> {
    typed(owner, property, "integer", PropertyValue::as_i64)
}

pub(crate) fn boolean(owner: &str, property: &PropertyTreeNode) -> Result<bool, ComputationError> {
    typed(owner, property, "boolean", PropertyValue::as_bool)
}

/// Text form of a property value; names and ids may be numbers in some traces.
pub(crate) fn label(owner: &str, property: &PropertyTreeNode) -> Result<String, ComputationError> {
    typed(owner, property, "label", |value| Some(value.to_string()))
}
