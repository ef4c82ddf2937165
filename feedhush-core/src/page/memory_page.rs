// File: src/page/memory_page.rs

use std::collections::BTreeMap;

use parking_lot::RwLock;

use feedhush_common::error::Error;
use feedhush_common::models::{ElementRef, MutationRecord, NodeId, PageNode, Selector};
use feedhush_common::traits::FeedPage;

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A page tree held in memory.
///
/// Node ids are never reused; removed subtrees stay allocated but detached, so
/// stale handles resolve to "not attached" instead of to another element.
pub struct MemoryPage {
    nodes: RwLock<Vec<Element>>,
}

impl MemoryPage {
    /// An empty page whose root is a `body` element.
    pub fn new() -> Self {
        Self::from_snapshot(PageNode::new("body"))
    }

    /// Build a page from a snapshot; the snapshot's top node becomes the root.
    pub fn from_snapshot(root: PageNode) -> Self {
        let mut nodes = Vec::new();
        insert_subtree(&mut nodes, root, None);
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `subtree` under `parent`, returning the childList record
    /// describing the change.
    pub fn append_child(&self, parent: NodeId, subtree: PageNode) -> Result<MutationRecord, Error> {
        let mut nodes = self.nodes.write();
        if !is_attached(&nodes, parent) {
            return Err(Error::Page(format!("cannot append to detached node {parent}")));
        }
        let child = insert_subtree(&mut nodes, subtree, Some(parent));
        nodes[parent.0].children.push(child);
        Ok(MutationRecord::child_added(parent, child))
    }

    /// Detach `node` (and its subtree) from its parent.
    pub fn remove(&self, node: NodeId) -> Result<MutationRecord, Error> {
        let mut nodes = self.nodes.write();
        let parent = nodes
            .get(node.0)
            .and_then(|element| element.parent)
            .ok_or_else(|| Error::Page(format!("node {node} has no parent")))?;
        nodes[parent.0].children.retain(|child| *child != node);
        nodes[node.0].parent = None;
        Ok(MutationRecord::child_removed(parent, node))
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes.read().get(node.0)?.style.get(property).cloned()
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.style(node, "display").as_deref() == Some("none")
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        is_attached(&self.nodes.read(), node)
    }

    /// Attached elements that currently carry `display: none`.
    pub fn hidden_elements(&self) -> Vec<NodeId> {
        let nodes = self.nodes.read();
        let mut out = Vec::new();
        walk(&nodes, NodeId(0), &mut |id, element| {
            if element.style.get("display").map(String::as_str) == Some("none") {
                out.push(id);
            }
        });
        out
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedPage for MemoryPage {
    fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        let nodes = self.nodes.read();
        let mut out = Vec::new();
        walk(&nodes, NodeId(0), &mut |id, element| {
            let view = ElementRef {
                tag: &element.tag,
                attributes: &element.attributes,
            };
            if selector.matches(&view) {
                out.push(id);
            }
        });
        out
    }

    fn text_content(&self, node: NodeId) -> Option<String> {
        let nodes = self.nodes.read();
        if !is_attached(&nodes, node) {
            return None;
        }
        let mut text = String::new();
        walk(&nodes, node, &mut |_, element| {
            if let Some(own) = &element.text {
                text.push_str(own);
            }
        });
        Some(text)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.read().get(node.0)?.attributes.get(name).cloned()
    }

    fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let nodes = self.nodes.read();
        let mut current = Some(node);
        while let Some(id) = current {
            let element = nodes.get(id.0)?;
            if element.tag.eq_ignore_ascii_case(tag) {
                return Some(id);
            }
            current = element.parent;
        }
        None
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) -> Result<(), Error> {
        let mut nodes = self.nodes.write();
        let element = nodes
            .get_mut(node.0)
            .ok_or_else(|| Error::NotFound(format!("node {node}")))?;
        element.style.insert(property.to_string(), value.to_string());
        Ok(())
    }
}

fn insert_subtree(nodes: &mut Vec<Element>, node: PageNode, parent: Option<NodeId>) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(Element {
        tag: node.tag.to_ascii_lowercase(),
        attributes: node.attributes,
        text: node.text,
        style: BTreeMap::new(),
        parent,
        children: Vec::with_capacity(node.children.len()),
    });
    for child in node.children {
        let child_id = insert_subtree(nodes, child, Some(id));
        nodes[id.0].children.push(child_id);
    }
    id
}

fn is_attached(nodes: &[Element], node: NodeId) -> bool {
    let mut current = node;
    loop {
        match nodes.get(current.0) {
            None => return false,
            Some(element) => match element.parent {
                Some(parent) => current = parent,
                None => return current == NodeId(0),
            },
        }
    }
}

/// Pre-order walk, which is document order.
fn walk<F>(nodes: &[Element], start: NodeId, visit: &mut F)
where
    F: FnMut(NodeId, &Element),
{
    let Some(element) = nodes.get(start.0) else {
        return;
    };
    visit(start, element);
    for child in &element.children {
        walk(nodes, *child, visit);
    }
}
