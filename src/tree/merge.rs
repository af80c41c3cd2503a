//! Immutable updates on the account forest.
//!
//! The forest (root accounts plus every nested `children` vec) is the only
//! copy of the data. Lookups descend recursively and match on `id`, which is
//! unique across the whole forest.

use std::sync::Arc;

use crate::types::{Account, AccountId};

/// Root accounts in display order.
pub type Forest = Vec<Arc<Account>>;

/// Return a forest where the node `parent_id` has exactly `children`.
///
/// The node and each of its ancestors are shallow-copied; every other subtree
/// is the same `Arc` as in `forest`. If no node matches (for example the
/// forest was rebuilt while the fetch was in flight) the forest comes back
/// unchanged.
pub fn attach_children(forest: &[Arc<Account>], parent_id: &AccountId, children: Forest) -> Forest {
    match attach_in(forest, parent_id, &children) {
        Some(updated) => updated,
        None => {
            log::debug!("attach_children: account {} not in forest, ignoring", parent_id);
            forest.to_vec()
        }
    }
}

fn attach_in(nodes: &[Arc<Account>], parent_id: &AccountId, children: &[Arc<Account>]) -> Option<Forest> {
    for (index, node) in nodes.iter().enumerate() {
        let replacement = if &node.id == parent_id {
            Some(with_children(node, children.to_vec()))
        } else {
            node.children
                .as_deref()
                .and_then(|kids| attach_in(kids, parent_id, children))
                .map(|kids| with_children(node, kids))
        };

        if let Some(copy) = replacement {
            let mut updated = nodes.to_vec();
            updated[index] = Arc::new(copy);
            return Some(updated);
        }
    }
    None
}

fn with_children(node: &Account, children: Forest) -> Account {
    Account {
        id: node.id.clone(),
        code: node.code.clone(),
        name: node.name.clone(),
        notes: node.notes.clone(),
        type_id: node.type_id.clone(),
        account_type: node.account_type.clone(),
        parent_id: node.parent_id.clone(),
        has_children: node.has_children,
        children_count: node.children_count,
        children: Some(children),
        balance: node.balance,
        status: node.status.clone(),
    }
}

/// Depth-first search for a node by id.
pub fn find_node<'a>(forest: &'a [Arc<Account>], id: &AccountId) -> Option<&'a Arc<Account>> {
    for node in forest {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = node.children.as_deref().and_then(|kids| find_node(kids, id)) {
            return Some(found);
        }
    }
    None
}

/// Wrap freshly fetched accounts as forest nodes.
pub fn into_forest(accounts: Vec<Account>) -> Forest {
    accounts.into_iter().map(Arc::new).collect()
}
