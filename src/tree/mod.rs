//! Chart-of-accounts tree shown as a flat, lazily expanded table.
//!
//! Modules:
//! - merge: immutable child attachment on the forest
//! - expansion: expanded / in-flight row tracking
//! - source: where roots and children come from
//! - view: the page-level controller tying them together
//! - render: text table output

pub mod expansion;
pub mod merge;
pub mod render;
pub mod source;
pub mod view;

pub use expansion::{ExpansionState, NodeState};
pub use merge::{attach_children, find_node, Forest};
pub use source::{AccountSource, AccountStore};
pub use view::{AccountTree, ExpandAction, FetchTicket, Row};
