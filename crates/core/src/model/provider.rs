use std::cell::OnceCell;
use std::fmt;

use super::property::PropertyTreeNode;
use super::{TreeError, TreeNode};

/// Produces the full property tree of a hierarchy node on demand.
///
/// Full trees are large and most consumers only need a handful of geometry
/// properties, so parsers hand the expensive part over as a lazy source.
pub trait LazyPropertiesSource: Send {
    fn resolve(&self) -> Result<PropertyTreeNode, TreeError>;
}

impl<F> LazyPropertiesSource for F
where
    F: Fn() -> Result<PropertyTreeNode, TreeError> + Send,
{
    fn resolve(&self) -> Result<PropertyTreeNode, TreeError> {
        self()
    }
}

/// Eager and lazy properties of one hierarchy node.
///
/// - [`PropertiesProvider::eager_property_by_name`] only reads the eager
///   subset and fails if the eager pass has not run yet.
/// - [`PropertiesProvider::all_properties`] resolves the lazy source on first
///   access and caches the result, with eager properties taking precedence.
pub struct PropertiesProvider {
    owner: String,
    eager: Option<PropertyTreeNode>,
    lazy: Option<Box<dyn LazyPropertiesSource>>,
    all: OnceCell<PropertyTreeNode>,
}

impl PropertiesProvider {
    /// Fully materialized properties; nothing is deferred.
    pub fn eager(root: PropertyTreeNode) -> Self {
        Self {
            owner: root.id().to_string(),
            eager: Some(root),
            lazy: None,
            all: OnceCell::new(),
        }
    }

    /// Only a lazy source. [`PropertiesProvider::resolve_eager`] must run
    /// before eager properties can be read.
    pub fn lazy(owner: impl Into<String>, source: impl LazyPropertiesSource + 'static) -> Self {
        Self {
            owner: owner.into(),
            eager: None,
            lazy: Some(Box::new(source)),
            all: OnceCell::new(),
        }
    }

    /// An eager subset backed by a lazy source for the remainder.
    pub fn with_lazy(eager: PropertyTreeNode, source: impl LazyPropertiesSource + 'static) -> Self {
        Self {
            lazy: Some(Box::new(source)),
            ..Self::eager(eager)
        }
    }

    pub fn eager_property_by_name(
        &self,
        name: &str,
    ) -> Result<Option<&PropertyTreeNode>, TreeError> {
        let eager = self.eager.as_ref().ok_or_else(|| self.unresolved())?;
        Ok(eager.child_by_name(name))
    }

    /// Attach a property produced by a computation pass.
    pub fn add_eager_property(&mut self, property: PropertyTreeNode) -> Result<(), TreeError> {
        if self.eager.is_none() {
            return Err(self.unresolved());
        }
        if let Some(all) = self.all.get_mut() {
            all.add_or_replace_child(property.clone());
        }
        if let Some(eager) = self.eager.as_mut() {
            eager.add_or_replace_child(property);
        }
        Ok(())
    }

    /// The eager pass: copy the named properties out of the full tree into
    /// the eager subset. Names the full tree lacks are skipped.
    pub fn resolve_eager(&mut self, names: &[&str]) -> Result<(), TreeError> {
        let (root_id, root_name, picked) = {
            let all = self.all_properties()?;
            let picked: Vec<PropertyTreeNode> = names
                .iter()
                .filter_map(|name| all.child_by_name(name))
                .cloned()
                .collect();
            (all.id().to_string(), all.name().to_string(), picked)
        };

        let eager = self
            .eager
            .get_or_insert_with(|| PropertyTreeNode::new(root_id, root_name));
        for property in picked {
            eager.add_or_replace_child(property);
        }
        Ok(())
    }

    /// Every property of the node, resolving the lazy source once.
    pub fn all_properties(&self) -> Result<&PropertyTreeNode, TreeError> {
        if let Some(all) = self.all.get() {
            return Ok(all);
        }

        let resolved = match (&self.lazy, &self.eager) {
            (Some(source), eager) => {
                let mut all = source.resolve()?;
                if let Some(eager) = eager {
                    for property in eager.all_children() {
                        all.add_or_replace_child(property.clone());
                    }
                }
                all
            }
            (None, Some(eager)) => eager.clone(),
            (None, None) => return Err(self.unresolved()),
        };
        Ok(self.all.get_or_init(|| resolved))
    }

    fn unresolved(&self) -> TreeError {
        TreeError::UnresolvedProperties {
            node: self.owner.clone(),
        }
    }
}

impl fmt::Debug for PropertiesProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertiesProvider")
            .field("owner", &self.owner)
            .field("eager", &self.eager)
            .field("has_lazy", &self.lazy.is_some())
            .field("all_resolved", &self.all.get().is_some())
            .finish()
    }
}
