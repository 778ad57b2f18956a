//! XML text <-> [`ElementTree`] conversion and the file-backed [`XmlDocument`] store.
//!
//! Parsing goes through `roxmltree`; only elements, attributes and text survive.
//! Comments and processing instructions are dropped. Writing uses `quick-xml`
//! with two-space indentation.

use crate::backup::backup_file;
use log::{debug, info};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quizflow_traits::{ANY_TAG, DocumentError, DocumentStore, ElementTree, NodeId};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

/// A quiz results document, optionally tied to a file on disk.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    tree: ElementTree,
    path: Option<PathBuf>,
    backup: Option<PathBuf>,
}

impl XmlDocument {
    /// Parses XML text into a document that is not tied to any file.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        Ok(Self::from_tree(parse_tree(text)?))
    }

    pub fn from_tree(tree: ElementTree) -> Self {
        Self {
            tree,
            path: None,
            backup: None,
        }
    }

    /// Loads a results file. With `backup` set, a timestamped copy is taken first.
    pub fn open<P: AsRef<Path>>(path: P, backup: bool) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocumentError::NotFound(path.display().to_string())
            } else {
                DocumentError::Io(format!("{}: {}", path.display(), e))
            }
        })?;
        let tree = parse_tree(&text)?;
        let backup = if backup { Some(backup_file(path)?) } else { None };
        info!("Loaded {} ({} elements)", path.display(), tree.len());
        Ok(Self {
            tree,
            path: Some(path.to_path_buf()),
            backup,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Where the load-time backup was written, if one was taken.
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// Copies the file as it is on disk now. Fails for documents without a path.
    pub fn take_backup(&mut self) -> Result<PathBuf, DocumentError> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| DocumentError::NotFound("document has no file to back up".into()))?;
        let target = backup_file(path)?;
        self.backup = Some(target.clone());
        Ok(target)
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn to_xml_string(&self) -> Result<String, DocumentError> {
        write_tree(&self.tree)
    }

    /// Redirects future saves to `path` and saves immediately.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DocumentError> {
        self.path = Some(path.as_ref().to_path_buf());
        self.save()
    }
}

impl DocumentStore for XmlDocument {
    fn root(&self) -> NodeId {
        self.tree.root()
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.tree.tag(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    fn children(&self, parent: NodeId, tag: &str) -> Vec<NodeId> {
        self.tree.children(parent, tag)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.attribute(node, name)
    }

    fn attributes(&self, node: NodeId) -> Vec<(&str, &str)> {
        self.tree.attributes(node)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.tree.text(node)
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DocumentError> {
        self.tree.set_text(node, text)
    }

    fn update_attributes(
        &mut self,
        node: NodeId,
        attributes: &[(&str, &str)],
    ) -> Result<(), DocumentError> {
        self.tree.update_attributes(node, attributes)
    }

    fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        self.tree.create_element(tag, attributes)
    }

    fn copy_element(&mut self, node: NodeId) -> Result<NodeId, DocumentError> {
        self.tree.copy_element(node)
    }

    fn insert_element_before_index(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), DocumentError> {
        self.tree.insert_element_before_index(parent, child, index)
    }

    fn append_element(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.tree.append_element(parent, child)
    }

    fn remove_all_elements(&mut self, ancestor: NodeId, tag: &str) -> Result<usize, DocumentError> {
        self.tree.remove_all_elements(ancestor, tag)
    }

    fn save(&mut self) -> Result<(), DocumentError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let xml = write_tree(&self.tree)?;
        fs::write(path, xml).map_err(|e| DocumentError::Io(format!("{}: {}", path.display(), e)))?;
        debug!("Saved {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "XmlDocument"
    }
}

fn parse_tree(text: &str) -> Result<ElementTree, DocumentError> {
    let doc = roxmltree::Document::parse(text).map_err(|e| DocumentError::Parse(e.to_string()))?;
    let source_root = doc.root_element();
    let mut tree = ElementTree::new(source_root.tag_name().name());
    let root = tree.root();
    copy_node(&mut tree, root, source_root)?;
    Ok(tree)
}

/// Copies attributes, text and child elements of `source` onto `target`.
fn copy_node(
    tree: &mut ElementTree,
    target: NodeId,
    source: roxmltree::Node<'_, '_>,
) -> Result<(), DocumentError> {
    let attributes: Vec<(&str, &str)> = source
        .attributes()
        .map(|a| (a.name(), a.value()))
        .collect();
    tree.update_attributes(target, &attributes)?;

    let text: String = source
        .children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();
    if !text.is_empty() {
        tree.set_text(target, text)?;
    }

    for child in source.children().filter(|n| n.is_element()) {
        let element = tree.add_child(target, child.tag_name().name(), &[])?;
        copy_node(tree, element, child)?;
    }
    Ok(())
}

fn serialize_error<E: Display>(e: E) -> DocumentError {
    DocumentError::Serialize(e.to_string())
}

fn write_tree(tree: &ElementTree) -> Result<String, DocumentError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(serialize_error)?;
    write_element(&mut writer, tree, tree.root())?;
    String::from_utf8(writer.into_inner()).map_err(serialize_error)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    tree: &ElementTree,
    node: NodeId,
) -> Result<(), DocumentError> {
    let tag = tree.tag(node).ok_or_else(|| DocumentError::InvalidNode {
        node,
        message: "unknown element handle".to_string(),
    })?;
    let mut start = BytesStart::new(tag);
    for (name, value) in tree.attributes(node) {
        start.push_attribute((name, value));
    }

    let children = tree.children(node, ANY_TAG);
    let text = tree.text(node);
    if children.is_empty() && text.is_none() {
        return writer.write_event(Event::Empty(start)).map_err(serialize_error);
    }

    writer.write_event(Event::Start(start)).map_err(serialize_error)?;
    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(serialize_error)?;
    }
    for child in children {
        write_element(writer, tree, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(serialize_error)
}
