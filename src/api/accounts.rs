//! Chart-of-accounts endpoints.

use serde::Serialize;

use super::ApiClient;
use crate::error::ApiError;
use crate::ledger::{TransactionPage, TransactionQuery};
use crate::types::{Account, AccountId, AccountType, ApiDataTable, ApiList, ApiResponse};

/// One page of root accounts and the filtered total.
#[derive(Debug, Clone)]
pub struct RootPage {
    pub accounts: Vec<Account>,
    pub total: u64,
}

/// Filter for the top-level listing. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootQuery {
    pub page: u32,
    pub page_size: u32,
    pub keyword: String,
}

impl Default for RootQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            keyword: String::new(),
        }
    }
}

impl RootQuery {
    pub fn start(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.page_size)
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("draw", "1".to_string()),
            ("start", self.start().to_string()),
            ("length", self.page_size.to_string()),
            ("q", self.keyword.trim().to_string()),
            ("parent_only", "true".to_string()),
        ]
    }
}

fn children_params(parent_id: &AccountId) -> Vec<(&'static str, String)> {
    vec![
        ("parent_id", parent_id.to_string()),
        ("q", String::new()),
        ("limit", "all".to_string()),
    ]
}

/// Create/edit form for an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountForm {
    pub name: String,
    pub code: String,
    pub type_id: Option<AccountId>,
    /// Always serialized; `null` makes the account a root.
    pub parent_id: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AccountForm {
    /// Pre-populate the form from a table row.
    pub fn from_account(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            code: account.code.clone(),
            type_id: account
                .type_id
                .clone()
                .or_else(|| account.account_type.as_ref().map(|t| t.id.clone())),
            parent_id: account.parent_id.clone(),
            notes: account.notes.clone(),
        }
    }

    /// Report the first missing required field.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("name is required".into()));
        }
        if self.code.trim().is_empty() {
            return Err(ApiError::Validation("code is required".into()));
        }
        if self.type_id.is_none() {
            return Err(ApiError::Validation("type_id is required".into()));
        }
        Ok(())
    }

    /// Trimmed copy with blank optional fields dropped.
    fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            code: self.code.trim().to_string(),
            type_id: self.type_id.clone(),
            parent_id: self.parent_id.clone().filter(|id| match id {
                AccountId::Str(s) => !s.trim().is_empty(),
                AccountId::Int(_) => true,
            }),
            notes: self
                .notes
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        }
    }
}

/// Accounts endpoints over a shared [`ApiClient`].
#[derive(Clone)]
pub struct AccountsApi {
    client: ApiClient,
}

impl AccountsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Top-level accounts for one page, optionally filtered by keyword.
    pub async fn list_roots(&self, query: &RootQuery) -> Result<RootPage, ApiError> {
        let table: ApiDataTable<Account> = self.client.get("accounts/data", &query.params()).await?;
        Ok(root_page(table))
    }

    /// Immediate children of one account. A leaf yields an empty vec.
    pub async fn list_children(&self, parent_id: &AccountId) -> Result<Vec<Account>, ApiError> {
        let table: ApiDataTable<Account> = self
            .client
            .get("accounts/data", &children_params(parent_id))
            .await?;
        Ok(table.data)
    }

    /// Single account, possibly with nested children. `None` when the
    /// backend answers with an empty list.
    pub async fn get_account(&self, id: &AccountId) -> Result<Option<Account>, ApiError> {
        let list: ApiList<Account> = self.client.get(&format!("accounts/{}", id), &[]).await?;
        Ok(list.data.into_iter().next())
    }

    pub async fn account_types(&self) -> Result<Vec<AccountType>, ApiError> {
        let list: ApiList<AccountType> = self.client.get("accounts/types/data", &[]).await?;
        Ok(list.data)
    }

    /// Parent-account lookup for the edit form.
    pub async fn search_parents(&self, query: &str) -> Result<Vec<Account>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let table: ApiDataTable<Account> = self
            .client
            .get("accounts/search", &[("q", query.to_string())])
            .await?;
        Ok(table.data)
    }

    /// Create (`id == None`) or update an account.
    pub async fn save_account(
        &self,
        form: &AccountForm,
        id: Option<&AccountId>,
    ) -> Result<ApiResponse, ApiError> {
        form.validate()?;
        let payload = form.normalized();

        let result: ApiResponse = match id {
            Some(id) => {
                self.client
                    .send_json(reqwest::Method::PUT, &format!("accounts/{}", id), &payload)
                    .await?
            }
            None => {
                self.client
                    .send_json(reqwest::Method::POST, "accounts", &payload)
                    .await?
            }
        };

        accept_save(result)
    }

    /// Delete every id concurrently. Reports the first failure after all
    /// requests have settled.
    pub async fn delete_accounts(&self, ids: &[AccountId]) -> Result<usize, ApiError> {
        let mut set = tokio::task::JoinSet::new();
        for id in ids {
            let client = self.client.clone();
            let path = format!("accounts/{}", id);
            set.spawn(async move {
                client
                    .delete(&path, &[("request_source", "api".to_string())])
                    .await
            });
        }

        settle_deletes(set).await
    }

    pub async fn transactions(&self, query: &TransactionQuery) -> Result<TransactionPage, ApiError> {
        self.client.get("accounts/transactions", &query.params()).await
    }
}

/// Without `recordsFiltered` the page itself is the whole result.
fn root_page(table: ApiDataTable<Account>) -> RootPage {
    let total = table.records_filtered.unwrap_or(table.data.len() as u64);
    RootPage {
        accounts: table.data,
        total,
    }
}

/// A 2xx mutation response can still carry `success: false`.
fn accept_save(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.success {
        return Ok(response);
    }
    let message = if response.toast.is_empty() {
        "An unknown error occurred".to_string()
    } else {
        response.toast
    };
    Err(ApiError::Rejected(message))
}

/// Wait for every delete, then report the count or the first failure.
async fn settle_deletes(
    mut set: tokio::task::JoinSet<Result<(), ApiError>>,
) -> Result<usize, ApiError> {
    let mut deleted = 0usize;
    let mut first_error = None;
    while let Some(joined) = set.join_next().await {
        match joined.map_err(ApiError::from).and_then(|r| r) {
            Ok(()) => deleted += 1,
            Err(e) => {
                log::warn!("delete_accounts: {}", e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(deleted),
    }
}
