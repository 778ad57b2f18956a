//! An in-memory element tree implementing [`DocumentStore`].
//!
//! This is the simplest store and the one every other store builds on. Saving is
//! a no-op; file-backed persistence lives in `quizflow-document`.

use crate::document::{ANY_TAG, DocumentError, DocumentStore, NodeId};

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent: None,
        }
    }
}

/// Arena-backed ordered tree. Removed elements stay in the arena but are no
/// longer reachable from the root.
#[derive(Debug, Clone)]
pub struct ElementTree {
    nodes: Vec<ElementData>,
    root: NodeId,
}

impl ElementTree {
    /// Creates a tree holding only a root element.
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![ElementData::new(root_tag)],
            root: NodeId(0),
        }
    }

    fn get(&self, node: NodeId) -> Result<&ElementData, DocumentError> {
        self.nodes.get(node.0).ok_or_else(|| DocumentError::InvalidNode {
            node,
            message: "unknown element handle".to_string(),
        })
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DocumentError> {
        self.nodes.get_mut(node.0).ok_or_else(|| DocumentError::InvalidNode {
            node,
            message: "unknown element handle".to_string(),
        })
    }

    /// Appends a new child element and returns it. Convenience for builders.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId, DocumentError> {
        let child = self.create_element(tag, attributes);
        self.append_element(parent, child)?;
        Ok(child)
    }

    /// Appends a new child element holding only text, e.g. `<Path>a.nrrd</Path>`.
    pub fn add_text_child(
        &mut self,
        parent: NodeId,
        tag: &str,
        text: &str,
    ) -> Result<NodeId, DocumentError> {
        let child = self.add_child(parent, tag, &[])?;
        self.set_text(child, text)?;
        Ok(child)
    }

    /// Number of elements reachable from the root, root included.
    pub fn len(&self) -> usize {
        1 + self.descendants(self.root, ANY_TAG).len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == candidate {
                return true;
            }
            current = self.nodes.get(n.0).and_then(|d| d.parent);
        }
        false
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.get(parent)?;
        let data = self.get(child)?;
        if data.parent.is_some() || child == self.root {
            return Err(DocumentError::InvalidNode {
                node: child,
                message: "element is already attached".to_string(),
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DocumentError::InvalidNode {
                node: child,
                message: "element cannot contain itself".to_string(),
            });
        }
        Ok(())
    }

    fn copy_subtree(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<NodeId, DocumentError> {
        let source = self.get(node)?.clone();
        let id = NodeId(self.nodes.len());
        self.nodes.push(ElementData {
            tag: source.tag,
            attributes: source.attributes,
            text: source.text,
            children: Vec::with_capacity(source.children.len()),
            parent,
        });
        for child in source.children {
            let copied = self.copy_subtree(child, Some(id))?;
            self.nodes[id.0].children.push(copied);
        }
        Ok(id)
    }
}

impl DocumentStore for ElementTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|d| d.tag.as_str())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|d| d.parent)
    }

    fn children(&self, parent: NodeId, tag: &str) -> Vec<NodeId> {
        let Some(data) = self.nodes.get(parent.0) else {
            return Vec::new();
        };
        data.children
            .iter()
            .copied()
            .filter(|c| tag == ANY_TAG || self.nodes[c.0].tag == tag)
            .collect()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node.0)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn attributes(&self, node: NodeId) -> Vec<(&str, &str)> {
        self.nodes
            .get(node.0)
            .map(|d| {
                d.attributes
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0)?.text.as_deref()
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DocumentError> {
        self.get_mut(node)?.text = Some(text.to_string());
        Ok(())
    }

    fn update_attributes(
        &mut self,
        node: NodeId,
        attributes: &[(&str, &str)],
    ) -> Result<(), DocumentError> {
        let data = self.get_mut(node)?;
        for (name, value) in attributes {
            match data.attributes.iter_mut().find(|(k, _)| k == name) {
                Some(existing) => existing.1 = value.to_string(),
                None => data.attributes.push((name.to_string(), value.to_string())),
            }
        }
        Ok(())
    }

    fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let mut data = ElementData::new(tag);
        data.attributes = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    fn copy_element(&mut self, node: NodeId) -> Result<NodeId, DocumentError> {
        self.copy_subtree(node, None)
    }

    fn insert_element_before_index(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), DocumentError> {
        self.check_attachable(parent, child)?;
        let siblings = &mut self.nodes[parent.0].children;
        let at = index.min(siblings.len());
        siblings.insert(at, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    fn append_element(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.check_attachable(parent, child)?;
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    fn remove_all_elements(&mut self, ancestor: NodeId, tag: &str) -> Result<usize, DocumentError> {
        self.get(ancestor)?;
        let doomed = self.descendants(ancestor, tag);
        let mut removed = 0;
        for node in doomed {
            // An earlier removal may already have detached this node's ancestor.
            if !self.is_ancestor_or_self(ancestor, node) {
                continue;
            }
            if let Some(parent) = self.nodes[node.0].parent.take() {
                self.nodes[parent.0].children.retain(|c| *c != node);
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn save(&mut self) -> Result<(), DocumentError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ElementTree"
    }
}
