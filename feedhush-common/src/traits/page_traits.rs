use crate::error::Error;
use crate::models::{NodeId, Selector};

/// The slice of a live document the feed filter reads and writes.
///
/// Every call observes the page as it is at that moment; a handle returned by
/// one call may refer to a detached element by the next.
pub trait FeedPage: Send + Sync {
    /// All attached elements matching `selector`, in document order.
    fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// Concatenated text of the element and its descendants; `None` once the
    /// element is no longer attached.
    fn text_content(&self, node: NodeId) -> Option<String>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Nearest inclusive ancestor with the given tag name.
    fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId>;

    fn set_style(&self, node: NodeId, property: &str, value: &str) -> Result<(), Error>;
}
