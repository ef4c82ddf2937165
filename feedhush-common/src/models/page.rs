// File: feedhush-common/src/models/page.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to an element of a page. Only meaningful for the page that issued it,
/// and may go stale if the element is detached afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Serializable description of an element subtree, used for page snapshots and
/// for nodes appended while the page is being watched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub tag: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Text that precedes the children in document order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PageNode>,
}

impl PageNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: PageNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// One observed change to the page, shaped after the browser's mutation records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
    #[serde(default)]
    pub added_nodes: Vec<NodeId>,
    #[serde(default)]
    pub removed_nodes: Vec<NodeId>,
}

impl MutationRecord {
    pub fn child_added(target: NodeId, added: NodeId) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added_nodes: vec![added],
            removed_nodes: Vec::new(),
        }
    }

    pub fn child_removed(target: NodeId, removed: NodeId) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added_nodes: Vec::new(),
            removed_nodes: vec![removed],
        }
    }

    /// A childList change that introduced at least one node.
    pub fn adds_nodes(&self) -> bool {
        self.kind == MutationKind::ChildList && !self.added_nodes.is_empty()
    }
}
