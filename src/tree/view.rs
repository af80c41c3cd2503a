//! Account tree view: one page of root accounts, lazily expanded.
//!
//! Expanding a row with unknown children is split in two steps so the caller
//! can keep handling input while the fetch runs:
//! 1. `begin_expand` marks the row loading and hands back a [`FetchTicket`]
//! 2. `complete_expand` merges the result, or rolls the row back on failure
//!
//! `expand` / `toggle` chain both steps for callers that just await.
//!
//! Rebuilding the forest (refresh, search, page change) clears all expansion
//! state and bumps a generation counter; tickets from an older generation are
//! dropped on completion.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::accounts::{AccountForm, RootPage, RootQuery};
use crate::error::{ApiError, ViewError};
use crate::types::{Account, AccountId, ApiResponse};

use super::expansion::{ExpansionState, NodeState};
use super::merge::{attach_children, find_node, into_forest, Forest};
use super::source::{AccountSource, AccountStore};

/// Proof that a children fetch was started for `id` in the current forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: AccountId,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandAction {
    /// Children unknown; fetch them and call `complete_expand`.
    Fetch(FetchTicket),
    /// Children already loaded or the row is a known leaf.
    Expanded,
    /// A fetch for this row is already running.
    Pending,
    NotFound,
}

/// One visible line of the table.
#[derive(Debug, Clone)]
pub struct Row {
    pub account: Arc<Account>,
    pub depth: usize,
    pub state: NodeState,
    pub expandable: bool,
    pub selected: bool,
}

#[derive(Debug, Default)]
pub struct AccountTree {
    forest: Forest,
    expansion: ExpansionState,
    selection: BTreeSet<AccountId>,
    query: RootQuery,
    total: u64,
    generation: u64,
}

impl AccountTree {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: RootQuery {
                page_size: page_size.max(1),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn forest(&self) -> &[Arc<Account>] {
        &self.forest
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn query(&self) -> &RootQuery {
        &self.query
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_expanded(&self, id: &AccountId) -> bool {
        self.expansion.is_expanded(id)
    }

    pub fn find(&self, id: &AccountId) -> Option<&Arc<Account>> {
        find_node(&self.forest, id)
    }

    // -----------------------------------------------------------------------
    // Root listing
    // -----------------------------------------------------------------------

    /// Replace the forest with a fresh root page. Expansion, pending fetches
    /// and selection all refer to the old forest and are dropped.
    pub fn replace_roots(&mut self, page: RootPage) {
        self.forest = into_forest(page.accounts);
        self.total = page.total;
        self.expansion.clear();
        self.selection.clear();
        self.generation += 1;
    }

    /// Re-run the current root query. On failure the stale forest stays.
    pub async fn refresh(&mut self, source: &dyn AccountSource) -> Result<(), ViewError> {
        let query = self.query.clone();
        self.fetch_roots(source, query).await
    }

    /// Load a different root page. The query only changes once the page has
    /// arrived, so a failure leaves forest and query consistent.
    pub async fn load(
        &mut self,
        source: &dyn AccountSource,
        query: RootQuery,
    ) -> Result<(), ViewError> {
        let query = RootQuery {
            page: query.page.max(1),
            page_size: query.page_size.max(1),
            keyword: query.keyword.trim().to_string(),
        };
        self.fetch_roots(source, query).await
    }

    async fn fetch_roots(
        &mut self,
        source: &dyn AccountSource,
        query: RootQuery,
    ) -> Result<(), ViewError> {
        match source.fetch_roots(&query).await {
            Ok(page) => {
                log::debug!(
                    "account tree: {} roots on page {} ({} total)",
                    page.accounts.len(),
                    query.page,
                    page.total
                );
                self.query = query;
                self.replace_roots(page);
                Ok(())
            }
            Err(e) => {
                log::warn!("account tree: root fetch failed: {}", e);
                Err(ViewError::Roots(e))
            }
        }
    }

    /// New search keyword; goes back to the first page.
    pub async fn set_search(
        &mut self,
        source: &dyn AccountSource,
        keyword: &str,
    ) -> Result<(), ViewError> {
        let query = RootQuery {
            page: 1,
            keyword: keyword.to_string(),
            ..self.query.clone()
        };
        self.load(source, query).await
    }

    pub async fn set_page(
        &mut self,
        source: &dyn AccountSource,
        page: u32,
        page_size: u32,
    ) -> Result<(), ViewError> {
        let query = RootQuery {
            page,
            page_size,
            ..self.query.clone()
        };
        self.load(source, query).await
    }

    // -----------------------------------------------------------------------
    // Expansion
    // -----------------------------------------------------------------------

    pub fn begin_expand(&mut self, id: &AccountId) -> ExpandAction {
        if self.expansion.is_loading(id) {
            return ExpandAction::Pending;
        }
        let Some(node) = find_node(&self.forest, id) else {
            log::debug!("account tree: expand of unknown account {}", id);
            return ExpandAction::NotFound;
        };

        if node.children.is_some() || node.is_known_leaf() {
            self.expansion.expand(id);
            return ExpandAction::Expanded;
        }

        self.expansion.begin_loading(id);
        ExpandAction::Fetch(FetchTicket {
            id: id.clone(),
            generation: self.generation,
        })
    }

    /// Settle a children fetch started by `begin_expand`.
    pub fn complete_expand(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Account>, ApiError>,
    ) -> Result<(), ViewError> {
        if ticket.generation != self.generation {
            log::debug!(
                "account tree: dropping children of {} from a rebuilt forest",
                ticket.id
            );
            return Ok(());
        }

        match result {
            Ok(children) => {
                log::debug!(
                    "account tree: {} children loaded for {}",
                    children.len(),
                    ticket.id
                );
                self.forest = attach_children(&self.forest, &ticket.id, into_forest(children));
                self.expansion.finish_loading(&ticket.id, true);
                Ok(())
            }
            Err(source) => {
                log::warn!(
                    "account tree: children fetch for {} failed: {}",
                    ticket.id,
                    source
                );
                self.expansion.finish_loading(&ticket.id, false);
                Err(ViewError::Children {
                    id: ticket.id,
                    source,
                })
            }
        }
    }

    pub async fn expand(
        &mut self,
        source: &dyn AccountSource,
        id: &AccountId,
    ) -> Result<(), ViewError> {
        match self.begin_expand(id) {
            ExpandAction::Fetch(ticket) => {
                let result = source.fetch_children(&ticket.id).await;
                self.complete_expand(ticket, result)
            }
            ExpandAction::Expanded | ExpandAction::Pending | ExpandAction::NotFound => Ok(()),
        }
    }

    /// Cached children stay in the forest.
    pub fn collapse(&mut self, id: &AccountId) {
        self.expansion.collapse(id);
    }

    /// Row click on the expand affordance. No-op while loading.
    pub async fn toggle(
        &mut self,
        source: &dyn AccountSource,
        id: &AccountId,
    ) -> Result<(), ViewError> {
        match self.expansion.state(id) {
            NodeState::Loading => Ok(()),
            NodeState::Expanded => {
                self.collapse(id);
                Ok(())
            }
            NodeState::Collapsed => self.expand(source, id).await,
        }
    }

    // -----------------------------------------------------------------------
    // Selection and row activation
    // -----------------------------------------------------------------------

    pub fn set_selected(&mut self, id: &AccountId, selected: bool) {
        if selected {
            if find_node(&self.forest, id).is_some() {
                self.selection.insert(id.clone());
            }
        } else {
            self.selection.remove(id);
        }
    }

    pub fn selected(&self) -> Vec<AccountId> {
        self.selection.iter().cloned().collect()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Edit form pre-populated from a row.
    pub fn edit_form(&self, id: &AccountId) -> Option<AccountForm> {
        find_node(&self.forest, id).map(|node| AccountForm::from_account(node))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create or update an account, then rebuild the forest. A rejected save
    /// leaves the tree untouched so the form can be corrected.
    pub async fn save<S: AccountStore>(
        &mut self,
        store: &S,
        form: &AccountForm,
        id: Option<&AccountId>,
    ) -> Result<ApiResponse, ViewError> {
        let response = store
            .save_account(form, id)
            .await
            .map_err(ViewError::Mutation)?;
        self.refresh(store).await?;
        Ok(response)
    }

    /// Delete `ids` and rebuild the forest, also when some deletes failed.
    /// The first delete failure wins over a refresh failure.
    pub async fn delete<S: AccountStore>(
        &mut self,
        store: &S,
        ids: &[AccountId],
    ) -> Result<usize, ViewError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let deleted = store.delete_accounts(ids).await;
        let refreshed = self.refresh(store).await;
        let deleted = deleted.map_err(ViewError::Mutation)?;
        refreshed?;
        log::info!("account tree: deleted {} account(s)", deleted);
        Ok(deleted)
    }

    pub async fn delete_selected<S: AccountStore>(&mut self, store: &S) -> Result<usize, ViewError> {
        let ids = self.selected();
        self.delete(store, &ids).await
    }

    // -----------------------------------------------------------------------
    // Presentation
    // -----------------------------------------------------------------------

    /// Visible rows, depth-first pre-order. Children of expanded rows follow
    /// their parent directly.
    pub fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        self.push_rows(&self.forest, 0, &mut rows);
        rows
    }

    fn push_rows(&self, nodes: &[Arc<Account>], depth: usize, rows: &mut Vec<Row>) {
        for node in nodes {
            let state = self.expansion.state(&node.id);
            rows.push(Row {
                account: Arc::clone(node),
                depth,
                state,
                expandable: node.is_expandable(),
                selected: self.selection.contains(&node.id),
            });
            if state == NodeState::Expanded {
                if let Some(children) = &node.children {
                    self.push_rows(children, depth + 1, rows);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    fn account(id: i64, has_children: Option<bool>) -> Account {
        Account {
            id: AccountId::Int(id),
            code: format!("1-{:03}", id),
            name: format!("Akun {}", id),
            has_children,
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct FakeSource {
        roots: Mutex<Vec<Account>>,
        children: HashMap<AccountId, Vec<Account>>,
        failing: Vec<AccountId>,
        fail_roots: bool,
        child_calls: Mutex<Vec<AccountId>>,
        reject_saves: bool,
        undeletable: Vec<AccountId>,
    }

    impl FakeSource {
        fn calls(&self) -> Vec<AccountId> {
            self.child_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AccountSource for FakeSource {
        async fn fetch_roots(&self, query: &RootQuery) -> Result<RootPage, ApiError> {
            if self.fail_roots {
                return Err(ApiError::Status {
                    status: 503,
                    message: "maintenance".into(),
                });
            }
            let roots = self.roots.lock().unwrap().clone();
            let filtered: Vec<Account> = roots
                .into_iter()
                .filter(|a| query.keyword.is_empty() || a.name.contains(&query.keyword))
                .collect();
            Ok(RootPage {
                total: filtered.len() as u64,
                accounts: filtered,
            })
        }

        async fn fetch_children(&self, parent_id: &AccountId) -> Result<Vec<Account>, ApiError> {
            self.child_calls.lock().unwrap().push(parent_id.clone());
            if self.failing.contains(parent_id) {
                return Err(ApiError::Status {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(self.children.get(parent_id).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl AccountStore for FakeSource {
        async fn save_account(
            &self,
            form: &AccountForm,
            id: Option<&AccountId>,
        ) -> Result<ApiResponse, ApiError> {
            if self.reject_saves {
                return Err(ApiError::Rejected("Kode akun sudah dipakai".into()));
            }
            let mut roots = self.roots.lock().unwrap();
            match id {
                Some(id) => {
                    if let Some(existing) = roots.iter_mut().find(|a| &a.id == id) {
                        existing.name = form.name.clone();
                    }
                }
                None => {
                    let next = roots.len() as i64 + 100;
                    roots.push(Account {
                        name: form.name.clone(),
                        code: form.code.clone(),
                        ..account(next, Some(false))
                    });
                }
            }
            Ok(ApiResponse {
                data: serde_json::Value::Null,
                success: true,
                toast: "Saved".into(),
            })
        }

        async fn delete_accounts(&self, ids: &[AccountId]) -> Result<usize, ApiError> {
            let mut roots = self.roots.lock().unwrap();
            let mut deleted = 0;
            for id in ids.iter().filter(|id| !self.undeletable.contains(id)) {
                let before = roots.len();
                roots.retain(|a| &a.id != id);
                deleted += before - roots.len();
            }
            if ids.iter().any(|id| self.undeletable.contains(id)) {
                return Err(ApiError::Status {
                    status: 409,
                    message: "account has transactions".into(),
                });
            }
            Ok(deleted)
        }
    }

    fn id(n: i64) -> AccountId {
        AccountId::Int(n)
    }

    async fn loaded(source: &FakeSource) -> AccountTree {
        let mut tree = AccountTree::new(10);
        tree.refresh(source).await.unwrap();
        tree
    }

    #[tokio::test]
    async fn test_expand_fetches_and_attaches() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true))]),
            children: HashMap::from([(id(1), vec![account(2, Some(false))])]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;

        tree.expand(&source, &id(1)).await.unwrap();

        assert!(tree.is_expanded(&id(1)));
        assert_eq!(source.calls(), vec![id(1)]);
        let one = tree.find(&id(1)).unwrap();
        let kids = one.children.as_ref().unwrap();
        assert_eq!(kids.len(), 1);
        assert_eq!(kids[0].id, id(2));

        let rows = tree.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].depth, 1);
        assert!(!rows[1].expandable);
    }

    #[tokio::test]
    async fn test_leaf_expands_without_fetch() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(3, Some(false))]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;

        assert_eq!(tree.begin_expand(&id(3)), ExpandAction::Expanded);
        assert!(tree.is_expanded(&id(3)));
        assert!(source.calls().is_empty());
        assert_eq!(tree.find(&id(3)).unwrap().children, None);
    }

    #[tokio::test]
    async fn test_failed_fetch_rolls_back() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true))]),
            failing: vec![id(1)],
            ..Default::default()
        };
        let mut tree = loaded(&source).await;

        let err = tree.expand(&source, &id(1)).await.unwrap_err();
        assert!(matches!(err, ViewError::Children { ref id, .. } if *id == AccountId::Int(1)));
        assert!(!tree.is_expanded(&id(1)));
        assert_eq!(tree.expansion().state(&id(1)), NodeState::Collapsed);
        assert_eq!(tree.find(&id(1)).unwrap().children, None);

        // retry is allowed and issues a new fetch
        let _ = tree.expand(&source, &id(1)).await;
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_clears_expansion_and_children() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(5, Some(true)), account(6, None)]),
            children: HashMap::from([(id(5), vec![account(50, Some(false))])]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        tree.expand(&source, &id(5)).await.unwrap();
        assert!(tree.find(&id(5)).unwrap().children.is_some());

        tree.refresh(&source).await.unwrap();

        assert!(!tree.is_expanded(&id(5)));
        assert_eq!(tree.find(&id(5)).unwrap().children, None);
        assert_eq!(tree.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_second_expand_while_loading_is_noop() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true))]),
            children: HashMap::from([(id(1), vec![account(2, None)])]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;

        let ExpandAction::Fetch(ticket) = tree.begin_expand(&id(1)) else {
            panic!("expected a fetch");
        };
        assert_eq!(tree.begin_expand(&id(1)), ExpandAction::Pending);
        // toggling a loading row does nothing either
        tree.toggle(&source, &id(1)).await.unwrap();
        assert!(source.calls().is_empty());
        assert_eq!(tree.rows()[0].state, NodeState::Loading);

        let result = source.fetch_children(&ticket.id).await;
        tree.complete_expand(ticket, result).unwrap();
        assert_eq!(source.calls(), vec![id(1)]);
        assert_eq!(tree.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_collapse_during_fetch_merges_but_stays_hidden() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true))]),
            children: HashMap::from([(id(1), vec![account(2, None)])]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;

        let ExpandAction::Fetch(ticket) = tree.begin_expand(&id(1)) else {
            panic!("expected a fetch");
        };
        tree.collapse(&id(1));
        let result = source.fetch_children(&ticket.id).await;
        tree.complete_expand(ticket, result).unwrap();

        assert!(!tree.is_expanded(&id(1)));
        assert!(tree.find(&id(1)).unwrap().children.is_some());
        assert_eq!(tree.rows().len(), 1);

        // re-expanding uses the cache
        assert_eq!(tree.begin_expand(&id(1)), ExpandAction::Expanded);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_ticket_after_refresh_is_dropped() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(5, Some(true))]),
            children: HashMap::from([(id(5), vec![account(51, None)])]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;

        let ExpandAction::Fetch(ticket) = tree.begin_expand(&id(5)) else {
            panic!("expected a fetch");
        };
        tree.refresh(&source).await.unwrap();
        let result = source.fetch_children(&ticket.id).await;
        tree.complete_expand(ticket, result).unwrap();

        assert!(!tree.is_expanded(&id(5)));
        assert_eq!(tree.find(&id(5)).unwrap().children, None);
    }

    #[tokio::test]
    async fn test_unrelated_fetches_resolve_in_any_order() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true)), account(2, Some(true))]),
            children: HashMap::from([
                (id(1), vec![account(10, Some(false))]),
                (id(2), vec![account(20, Some(false)), account(21, Some(false))]),
            ]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;

        let ExpandAction::Fetch(first) = tree.begin_expand(&id(1)) else {
            panic!("expected a fetch");
        };
        let ExpandAction::Fetch(second) = tree.begin_expand(&id(2)) else {
            panic!("expected a fetch");
        };
        let second_result = source.fetch_children(&second.id).await;
        tree.complete_expand(second, second_result).unwrap();
        let first_result = source.fetch_children(&first.id).await;
        tree.complete_expand(first, first_result).unwrap();

        let ids: Vec<AccountId> = tree.rows().iter().map(|r| r.account.id.clone()).collect();
        assert_eq!(ids, vec![id(1), id(10), id(2), id(20), id(21)]);
    }

    #[tokio::test]
    async fn test_empty_children_confirm_leaf() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(7, None)]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        assert!(tree.rows()[0].expandable);

        tree.expand(&source, &id(7)).await.unwrap();

        assert_eq!(tree.find(&id(7)).unwrap().children, Some(Vec::new()));
        assert!(!tree.rows()[0].expandable);
        // collapse and re-expand without another fetch
        tree.toggle(&source, &id(7)).await.unwrap();
        tree.toggle(&source, &id(7)).await.unwrap();
        assert!(tree.is_expanded(&id(7)));
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_nested_expansion_rows_in_preorder() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true)), account(9, Some(false))]),
            children: HashMap::from([
                (id(1), vec![account(2, Some(true)), account(4, Some(false))]),
                (id(2), vec![account(3, Some(false))]),
            ]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        tree.expand(&source, &id(1)).await.unwrap();
        tree.expand(&source, &id(2)).await.unwrap();

        let shape: Vec<(AccountId, usize)> = tree
            .rows()
            .iter()
            .map(|r| (r.account.id.clone(), r.depth))
            .collect();
        assert_eq!(
            shape,
            vec![(id(1), 0), (id(2), 1), (id(3), 2), (id(4), 1), (id(9), 0)]
        );

        // collapsing the root hides the whole subtree but keeps 2 expanded
        tree.collapse(&id(1));
        assert_eq!(tree.rows().len(), 2);
        assert!(tree.is_expanded(&id(2)));
    }

    #[tokio::test]
    async fn test_root_failure_keeps_stale_forest() {
        let mut source = FakeSource {
            roots: Mutex::new(vec![account(1, None)]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        source.fail_roots = true;

        let err = tree.set_search(&source, "kas").await.unwrap_err();
        assert!(matches!(err, ViewError::Roots(_)));
        assert_eq!(tree.forest().len(), 1);
        assert_eq!(tree.query().keyword, "kas");
    }

    #[tokio::test]
    async fn test_search_resets_page_and_selection() {
        let source = FakeSource {
            roots: Mutex::new(vec![
                Account {
                    name: "Kas".into(),
                    ..account(1, None)
                },
                Account {
                    name: "Bank".into(),
                    ..account(2, None)
                },
            ]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        tree.set_selected(&id(2), true);
        tree.set_selected(&id(99), true);
        assert_eq!(tree.selected(), vec![id(2)]);

        tree.set_page(&source, 3, 10).await.unwrap();
        tree.set_search(&source, " Kas ").await.unwrap();

        assert_eq!(tree.query().page, 1);
        assert_eq!(tree.total(), 1);
        assert!(tree.selected().is_empty());
    }

    #[tokio::test]
    async fn test_edit_form_from_nested_row() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true))]),
            children: HashMap::from([(
                id(1),
                vec![Account {
                    parent_id: Some(id(1)),
                    type_id: Some(id(4)),
                    notes: Some("petty cash".into()),
                    ..account(2, Some(false))
                }],
            )]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        tree.expand(&source, &id(1)).await.unwrap();

        let form = tree.edit_form(&id(2)).unwrap();
        assert_eq!(form.parent_id, Some(id(1)));
        assert_eq!(form.code, "1-002");
        assert!(tree.edit_form(&id(77)).is_none());
    }

    #[tokio::test]
    async fn test_delete_selected_rebuilds_forest() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true)), account(2, None), account(3, None)]),
            children: HashMap::from([(id(1), vec![account(4, Some(false))])]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        tree.expand(&source, &id(1)).await.unwrap();
        tree.set_selected(&id(2), true);
        tree.set_selected(&id(3), true);

        let deleted = tree.delete_selected(&source).await.unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(tree.forest().len(), 1);
        assert_eq!(tree.total(), 1);
        assert!(tree.selected().is_empty());
        assert!(!tree.is_expanded(&id(1)));
        // the rebuilt root has not had its children fetched again
        assert_eq!(tree.find(&id(1)).unwrap().children, None);
    }

    #[tokio::test]
    async fn test_failed_delete_still_rebuilds() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, None), account(2, None)]),
            undeletable: vec![id(2)],
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        tree.set_selected(&id(1), true);
        tree.set_selected(&id(2), true);

        let err = tree.delete_selected(&source).await.unwrap_err();

        assert!(matches!(err, ViewError::Mutation(ApiError::Status { status: 409, .. })));
        let ids: Vec<AccountId> = tree.forest().iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids, vec![id(2)]);
        assert!(tree.selected().is_empty());
    }

    #[tokio::test]
    async fn test_delete_with_empty_selection_is_noop() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, None)]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        tree.set_selected(&id(1), true);
        tree.clear_selection();
        assert_eq!(tree.delete_selected(&source).await.unwrap(), 0);
        assert_eq!(tree.forest().len(), 1);
    }

    #[tokio::test]
    async fn test_save_rebuilds_and_clears_expansion() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true))]),
            children: HashMap::from([(id(1), vec![account(2, Some(false))])]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        tree.expand(&source, &id(1)).await.unwrap();
        tree.set_selected(&id(2), true);

        let form = AccountForm {
            name: "Kas Besar".into(),
            code: "1-200".into(),
            type_id: Some(id(1)),
            ..Default::default()
        };
        let response = tree.save(&source, &form, None).await.unwrap();

        assert_eq!(response.toast, "Saved");
        assert_eq!(tree.forest().len(), 2);
        assert!(!tree.is_expanded(&id(1)));
        assert!(tree.selected().is_empty());
        assert_eq!(tree.expansion().state(&id(1)), NodeState::Collapsed);
    }

    #[tokio::test]
    async fn test_rejected_save_keeps_tree() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true))]),
            children: HashMap::from([(id(1), vec![account(2, Some(false))])]),
            reject_saves: true,
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        tree.expand(&source, &id(1)).await.unwrap();

        let form = tree.edit_form(&id(2)).unwrap();
        let err = tree.save(&source, &form, Some(&id(2))).await.unwrap_err();

        assert!(matches!(err, ViewError::Mutation(ApiError::Rejected(_))));
        assert!(tree.is_expanded(&id(1)));
        assert!(tree.find(&id(2)).is_some());
    }

    #[tokio::test]
    async fn test_failed_page_change_keeps_query() {
        let mut source = FakeSource {
            roots: Mutex::new((1..=3).map(|n| account(n, None)).collect()),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;
        source.fail_roots = true;

        assert!(tree.set_page(&source, 3, 10).await.is_err());

        assert_eq!(tree.query().page, 1);
        assert_eq!(
            crate::tree::render::pagination_summary(tree.query(), tree.forest().len(), tree.total()),
            "1-3 of 3 items"
        );
    }

    #[tokio::test]
    async fn test_expand_outside_page_is_reported() {
        let source = FakeSource {
            roots: Mutex::new(vec![account(1, Some(true))]),
            ..Default::default()
        };
        let mut tree = loaded(&source).await;

        assert_eq!(tree.begin_expand(&id(42)), ExpandAction::NotFound);
        // ids keep their wire form, so a text key never matches a numeric one
        assert_eq!(tree.begin_expand(&AccountId::from("1")), ExpandAction::NotFound);
        assert!(source.calls().is_empty());
        assert!(tree.rows().iter().all(|r| r.state == NodeState::Collapsed));
    }
}
