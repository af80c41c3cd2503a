pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod score;
pub mod session;
pub mod tree;
pub mod types;

pub use api::accounts::{AccountForm, AccountsApi, RootPage, RootQuery};
pub use api::ApiClient;
pub use config::{load_config, Config};
pub use error::{ApiError, ConfigError, Notice, ViewError};
pub use session::SessionContext;
pub use tree::{AccountSource, AccountStore, AccountTree};
pub use types::{Account, AccountId};
