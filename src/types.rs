use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

/// Account identifier. The backend sends integers for most spaces but some
/// deployments use string keys, so both are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountId {
    Int(i64),
    Str(String),
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountId::Int(n) => write!(f, "{}", n),
            AccountId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AccountId {
    fn from(n: i64) -> Self {
        AccountId::Int(n)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId::Str(s.to_string())
    }
}

impl std::str::FromStr for AccountId {
    type Err = std::convert::Infallible;

    /// Numeric text becomes `Int`, anything else stays a string key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => AccountId::Int(n),
            Err(_) => AccountId::Str(trimmed.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountType {
    pub id: AccountId,
    pub name: String,
}

/// A chart-of-accounts node as sent by the backend.
///
/// `children` distinguishes "not fetched yet" (`None`) from "fetched, no
/// children" (`Some(vec![])`). Children are `Arc`-shared so a tree update
/// can hand back untouched subtrees without copying them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<AccountId>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<AccountId>,
    #[serde(
        default,
        deserialize_with = "lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_children: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub children_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Arc<Account>>>,
    #[serde(
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Default for AccountId {
    fn default() -> Self {
        AccountId::Int(0)
    }
}

impl Account {
    /// Whether the row should offer an expand affordance.
    ///
    /// `has_children` wins when present. `children_count` is only consulted
    /// when the flag is absent. With neither hint the row stays expandable and
    /// the fetch decides.
    pub fn is_expandable(&self) -> bool {
        if let Some(children) = &self.children {
            return !children.is_empty();
        }
        match (self.has_children, self.children_count) {
            (Some(flag), _) => flag,
            (None, Some(count)) => count > 0,
            (None, None) => true,
        }
    }

    /// True when the server says this is a leaf, so expanding needs no fetch.
    pub fn is_known_leaf(&self) -> bool {
        match &self.children {
            Some(children) => children.is_empty(),
            None => self.has_children == Some(false),
        }
    }

    pub fn type_name(&self) -> &str {
        self.account_type
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }
}

/// DataTables-style listing envelope (`accounts/data`, `accounts/search`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataTable<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub records_filtered: Option<u64>,
}

/// `{ data: [...] }` envelope used by single-resource and lookup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Mutation response: `{ data, success, toast }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub toast: String,
}

// ---------------------------------------------------------------------------
// Lenient wire decoding. The backend mixes 0/1 with bools, and numbers with
// numeric strings.
// ---------------------------------------------------------------------------

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::Number(n)) => n.as_i64().map(|n| n != 0),
        Some(serde_json::Value::String(s)) => match s.as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

pub(crate) fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_amount))
}

/// Parse an amount that may be a JSON number or numeric string.
pub fn parse_amount(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
