use serde::Serialize;

use super::TreeNode;
use super::value::{PropertySource, PropertyValue};

/// A named, optionally valued node in a property tree.
///
/// Child names are unique among siblings; [`PropertyTreeNode::add_or_replace_child`]
/// enforces this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyTreeNode {
    id: String,
    name: String,
    value: Option<PropertyValue>,
    source: PropertySource,
    children: Vec<PropertyTreeNode>,
}

impl PropertyTreeNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: None,
            source: PropertySource::default(),
            children: Vec::new(),
        }
    }

    /// A leaf whose id is derived from `parent_id`.
    pub fn leaf(parent_id: &str, name: &str, value: impl Into<PropertyValue>) -> Self {
        Self::new(format!("{parent_id}.{name}"), name).with_value(value)
    }

    pub fn with_value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_source(mut self, source: PropertySource) -> Self {
        self.source = source;
        self
    }

    pub fn with_child(mut self, child: PropertyTreeNode) -> Self {
        self.add_or_replace_child(child);
        self
    }

    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: impl Into<PropertyValue>) {
        self.value = Some(value.into());
    }

    pub fn source(&self) -> PropertySource {
        self.source
    }

    /// Id for a child named `name`, following the `parent.child` convention.
    pub fn child_id(&self, name: &str) -> String {
        format!("{}.{name}", self.id)
    }

    /// Insert `child`, replacing a same-named child in place.
    pub fn add_or_replace_child(&mut self, child: PropertyTreeNode) {
        match self.children.iter_mut().find(|c| c.name == child.name) {
            Some(existing) => *existing = child,
            None => self.children.push(child),
        }
    }

    pub fn remove_child(&mut self, name: &str) -> Option<PropertyTreeNode> {
        let index = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(index))
    }

    pub fn child_value(&self, name: &str) -> Option<&PropertyValue> {
        self.child_by_name(name).and_then(PropertyTreeNode::value)
    }

    pub fn child_f64(&self, name: &str) -> Option<f64> {
        self.child_value(name).and_then(PropertyValue::as_f64)
    }

    pub fn child_i64(&self, name: &str) -> Option<i64> {
        self.child_value(name).and_then(PropertyValue::as_i64)
    }

    pub fn child_bool(&self, name: &str) -> Option<bool> {
        self.child_value(name).and_then(PropertyValue::as_bool)
    }
}

impl TreeNode for PropertyTreeNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn all_children(&self) -> &[Self] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> PropertyTreeNode {
        PropertyTreeNode::new("1.bounds", "bounds")
            .with_child(PropertyTreeNode::leaf("1.bounds", "left", 0))
            .with_child(PropertyTreeNode::leaf("1.bounds", "top", 0))
            .with_child(PropertyTreeNode::leaf("1.bounds", "right", 10.5))
    }

    #[test]
    fn lookup_by_name() {
        let node = bounds();
        assert_eq!(node.child_f64("right"), Some(10.5));
        assert_eq!(node.child_by_name("right").unwrap().id(), "1.bounds.right");
        assert!(node.child_by_name("bottom").is_none());
    }

    #[test]
    fn replace_keeps_position() {
        let mut node = bounds();
        node.add_or_replace_child(PropertyTreeNode::leaf("1.bounds", "left", 5));
        let names: Vec<_> = node.all_children().iter().map(TreeNode::name).collect();
        assert_eq!(names, ["left", "top", "right"]);
        assert_eq!(node.child_i64("left"), Some(5));

        node.add_or_replace_child(PropertyTreeNode::leaf("1.bounds", "bottom", 1));
        assert_eq!(node.all_children().len(), 4);
        assert_eq!(node.all_children()[3].name(), "bottom");
    }

    #[test]
    fn remove_child() {
        let mut node = bounds();
        let removed = node.remove_child("top").unwrap();
        assert_eq!(removed.name(), "top");
        assert_eq!(node.all_children().len(), 2);
        assert!(node.remove_child("top").is_none());
    }

    #[test]
    fn filter_dfs_is_preorder() {
        let tree = PropertyTreeNode::new("r", "r")
            .with_child(
                PropertyTreeNode::new("r.a", "a")
                    .with_child(PropertyTreeNode::leaf("r.a", "x", 1))
                    .with_child(PropertyTreeNode::leaf("r.a", "y", 2)),
            )
            .with_child(PropertyTreeNode::leaf("r", "b", 3));

        let all: Vec<_> = tree.filter_dfs(|_| true).iter().map(|n| n.id()).collect();
        assert_eq!(all, ["r", "r.a", "r.a.x", "r.a.y", "r.b"]);

        let leaves: Vec<_> = tree
            .filter_dfs(|n| n.value().is_some())
            .iter()
            .map(|n| n.name())
            .collect();
        assert_eq!(leaves, ["x", "y", "b"]);
    }

    #[test]
    fn try_filter_dfs_stops_on_error() {
        let tree = bounds();
        let mut visited = 0;
        let result: Result<Vec<_>, &str> = tree.try_filter_dfs(|n| {
            visited += 1;
            if n.name() == "top" { Err("boom") } else { Ok(true) }
        });
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(visited, 3);
    }
}
