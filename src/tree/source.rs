//! Where the tree gets its accounts from.

use async_trait::async_trait;

use crate::api::accounts::{AccountForm, AccountsApi, RootPage, RootQuery};
use crate::error::ApiError;
use crate::types::{Account, AccountId, ApiResponse};

/// Read-only account listing used by the tree view.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// One page of top-level accounts. An empty keyword means unfiltered.
    async fn fetch_roots(&self, query: &RootQuery) -> Result<RootPage, ApiError>;

    /// Immediate children of `parent_id`; empty for a leaf, never an error.
    async fn fetch_children(&self, parent_id: &AccountId) -> Result<Vec<Account>, ApiError>;
}

/// Mutations the tree rebuilds itself after.
#[async_trait]
pub trait AccountStore: AccountSource {
    /// Create (`id == None`) or update one account.
    async fn save_account(
        &self,
        form: &AccountForm,
        id: Option<&AccountId>,
    ) -> Result<ApiResponse, ApiError>;

    /// Delete every id; the count of accounts actually removed.
    async fn delete_accounts(&self, ids: &[AccountId]) -> Result<usize, ApiError>;
}

#[async_trait]
impl AccountSource for AccountsApi {
    async fn fetch_roots(&self, query: &RootQuery) -> Result<RootPage, ApiError> {
        self.list_roots(query).await
    }

    async fn fetch_children(&self, parent_id: &AccountId) -> Result<Vec<Account>, ApiError> {
        self.list_children(parent_id).await
    }
}

#[async_trait]
impl AccountStore for AccountsApi {
    async fn save_account(
        &self,
        form: &AccountForm,
        id: Option<&AccountId>,
    ) -> Result<ApiResponse, ApiError> {
        AccountsApi::save_account(self, form, id).await
    }

    async fn delete_accounts(&self, ids: &[AccountId]) -> Result<usize, ApiError> {
        AccountsApi::delete_accounts(self, ids).await
    }
}
