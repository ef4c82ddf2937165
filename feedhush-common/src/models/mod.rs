// File: feedhush-common/src/models/mod.rs
pub mod page;
pub mod selector;

pub use page::{MutationKind, MutationRecord, NodeId, PageNode};
pub use selector::{ElementRef, Selector};
