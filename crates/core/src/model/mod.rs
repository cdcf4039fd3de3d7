pub mod hierarchy;
pub mod property;
pub mod provider;
pub mod value;

use std::convert::Infallible;

use thiserror::Error;

pub use hierarchy::{GEOMETRY_PROPERTIES, HierarchyTreeNode};
pub use property::PropertyTreeNode;
pub use provider::{LazyPropertiesSource, PropertiesProvider};
pub use value::{PropertySource, PropertyValue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("properties of `{node}` have not been eagerly resolved")]
    UnresolvedProperties { node: String },
    #[error("failed to resolve lazy properties of `{node}`: {reason}")]
    LazyResolution { node: String, reason: String },
}

/// Shared shape of property trees and hierarchy trees: an ordered tree of
/// named nodes with ids that are unique within one tree.
pub trait TreeNode: Sized {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn all_children(&self) -> &[Self];

    fn child_by_name(&self, name: &str) -> Option<&Self> {
        self.all_children().iter().find(|c| c.name() == name)
    }

    /// Visit `self` and every descendant in pre-order.
    fn for_each_dfs<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Self),
    {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            f(node);
            stack.extend(node.all_children().iter().rev());
        }
    }

    /// Pre-order nodes (including `self`) matching `predicate`.
    fn filter_dfs<F>(&self, mut predicate: F) -> Vec<&Self>
    where
        F: FnMut(&Self) -> bool,
    {
        match self.try_filter_dfs(|node| Ok::<_, Infallible>(predicate(node))) {
            Ok(nodes) => nodes,
            Err(never) => match never {},
        }
    }

    /// Like [`TreeNode::filter_dfs`], aborting on the first predicate error.
    fn try_filter_dfs<E, F>(&self, mut predicate: F) -> Result<Vec<&Self>, E>
    where
        F: FnMut(&Self) -> Result<bool, E>,
    {
        let mut matched = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if predicate(node)? {
                matched.push(node);
            }
            stack.extend(node.all_children().iter().rev());
        }
        Ok(matched)
    }
}
