use layerscope_protocol::TraceRect;

use super::property::PropertyTreeNode;
use super::provider::PropertiesProvider;
use super::{TreeError, TreeNode};

/// Eager properties the geometry computations read synchronously.
pub const GEOMETRY_PROPERTIES: &[&str] = &[
    "id",
    "name",
    "bounds",
    "transform",
    "cornerRadius",
    "layerStack",
    "z",
    "zOrderRelativeOf",
    "zOrderPath",
    "isComputedVisible",
    "occludedBy",
    "isVirtual",
    "displays",
];

/// One node of a frame's render tree: a layer, or the synthetic root that
/// holds the frame's displays.
///
/// The tree owns every node. Rects are attached by computation passes through
/// [`HierarchyTreeNode::set_rects`].
#[derive(Debug)]
pub struct HierarchyTreeNode {
    id: String,
    name: String,
    is_root: bool,
    properties: PropertiesProvider,
    children: Vec<HierarchyTreeNode>,
    rects: Vec<TraceRect>,
}

impl HierarchyTreeNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, properties: PropertiesProvider) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_root: false,
            properties,
            children: Vec::new(),
            rects: Vec::new(),
        }
    }

    pub fn new_root(
        id: impl Into<String>,
        name: impl Into<String>,
        properties: PropertiesProvider,
    ) -> Self {
        Self {
            is_root: true,
            ..Self::new(id, name, properties)
        }
    }

    pub fn with_child(mut self, child: HierarchyTreeNode) -> Self {
        self.add_or_replace_child(child);
        self
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Insert `child`, replacing an existing child with the same id in place.
    pub fn add_or_replace_child(&mut self, child: HierarchyTreeNode) {
        match self.children.iter_mut().find(|c| c.id == child.id) {
            Some(existing) => *existing = child,
            None => self.children.push(child),
        }
    }

    /// Id for a property named `name` owned by this node.
    pub fn property_id(&self, name: &str) -> String {
        format!("{}.{name}", self.id)
    }

    pub fn eager_property_by_name(
        &self,
        name: &str,
    ) -> Result<Option<&PropertyTreeNode>, TreeError> {
        self.properties.eager_property_by_name(name)
    }

    pub fn add_eager_property(&mut self, property: PropertyTreeNode) -> Result<(), TreeError> {
        self.properties.add_eager_property(property)
    }

    pub fn all_properties(&self) -> Result<&PropertyTreeNode, TreeError> {
        self.properties.all_properties()
    }

    /// Run the eager pass on this node and every descendant.
    pub fn resolve_eager_dfs(&mut self, names: &[&str]) -> Result<(), TreeError> {
        self.try_for_each_dfs_mut(&mut |node| node.properties.resolve_eager(names))
    }

    pub fn rects(&self) -> &[TraceRect] {
        &self.rects
    }

    /// Replace the rects attached to this node.
    pub fn set_rects(&mut self, rects: Vec<TraceRect>) {
        self.rects = rects;
    }

    pub fn find_dfs(&self, id: &str) -> Option<&HierarchyTreeNode> {
        self.filter_dfs(|node| node.id == id).into_iter().next()
    }

    pub fn for_each_dfs_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut HierarchyTreeNode),
    {
        f(self);
        for child in &mut self.children {
            child.for_each_dfs_mut(f);
        }
    }

    pub fn try_for_each_dfs_mut<E, F>(&mut self, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&mut HierarchyTreeNode) -> Result<(), E>,
    {
        f(self)?;
        for child in &mut self.children {
            child.try_for_each_dfs_mut(f)?;
        }
        Ok(())
    }
}

impl TreeNode for HierarchyTreeNode {
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
    use layerscope_protocol::{TraceRectBuilder, TransformMatrix};

    use super::*;
    use crate::model::PropertyValue;

    fn layer(id: &str) -> HierarchyTreeNode {
        HierarchyTreeNode::new(
            id,
            id,
            PropertiesProvider::eager(PropertyTreeNode::new(id, id)),
        )
    }

    fn rect(depth: u32) -> TraceRect {
        TraceRectBuilder::new()
            .x(0.0)
            .y(0.0)
            .width(1.0)
            .height(1.0)
            .id("r")
            .name("r")
            .corner_radius(0.0)
            .transform(TransformMatrix::IDENTITY)
            .group_id(0)
            .is_visible(true)
            .is_display(false)
            .is_virtual(false)
            .depth(depth)
            .build()
            .unwrap()
    }

    fn tree() -> HierarchyTreeNode {
        HierarchyTreeNode::new_root(
            "root",
            "root",
            PropertiesProvider::eager(PropertyTreeNode::new("root", "root")),
        )
        .with_child(layer("1 A").with_child(layer("2 B")))
        .with_child(layer("3 C"))
    }

    #[test]
    fn root_excluded_by_predicate() {
        let tree = tree();
        let layers: Vec<_> = tree
            .filter_dfs(|n| !n.is_root())
            .iter()
            .map(|n| n.id())
            .collect();
        assert_eq!(layers, ["1 A", "2 B", "3 C"]);
    }

    #[test]
    fn set_rects_overwrites() {
        let mut tree = tree();
        assert!(tree.rects().is_empty());
        tree.set_rects(vec![rect(1)]);
        tree.set_rects(vec![rect(2), rect(3)]);
        assert_eq!(tree.rects().len(), 2);
        assert_eq!(tree.rects()[0].depth, 2);
    }

    #[test]
    fn mutable_traversal_reaches_every_node() {
        let mut tree = tree();
        tree.for_each_dfs_mut(&mut |node| {
            if !node.is_root() {
                node.set_rects(vec![rect(0)]);
            }
        });
        assert_eq!(tree.find_dfs("2 B").unwrap().rects().len(), 1);
        assert!(tree.rects().is_empty());
    }

    #[test]
    fn replace_child_by_id() {
        let mut tree = tree();
        tree.add_or_replace_child(layer("1 A"));
        assert_eq!(tree.all_children().len(), 2);
        assert!(tree.find_dfs("2 B").is_none());
    }

    #[test]
    fn eager_pass_over_whole_tree() {
        let lazy_layer = HierarchyTreeNode::new(
            "4 D",
            "4 D",
            PropertiesProvider::lazy("4 D", || -> Result<PropertyTreeNode, TreeError> {
                Ok(PropertyTreeNode::new("4 D", "4 D")
                    .with_child(PropertyTreeNode::leaf("4 D", "z", 1)))
            }),
        );
        let mut tree = tree().with_child(lazy_layer);
        let lazy = tree.find_dfs("4 D").unwrap();
        assert!(lazy.eager_property_by_name("z").is_err());

        tree.resolve_eager_dfs(GEOMETRY_PROPERTIES).unwrap();
        let z = tree
            .find_dfs("4 D")
            .unwrap()
            .eager_property_by_name("z")
            .unwrap()
            .unwrap();
        assert_eq!(z.value().and_then(PropertyValue::as_i64), Some(1));
    }
}
