//! Account type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Cloudflare account stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Surrogate key assigned by the local store; never reused
    pub local_id: i64,
    /// Cloudflare account id (the identifier preserved across export/import)
    pub account_id: String,
    /// Display name
    pub name: String,
    /// API token
    pub api_token: String,
    /// Zone opened by default for this account
    pub default_zone_id: Option<String>,
    /// R2 access key id
    pub r2_access_key_id: Option<String>,
    /// R2 secret access key
    pub r2_secret_access_key: Option<String>,
    /// At most one account is the default
    pub is_default: bool,
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::utils::datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Account row before the store assigns a `local_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub account_id: String,
    pub name: String,
    pub api_token: String,
    pub default_zone_id: Option<String>,
    pub r2_access_key_id: Option<String>,
    pub r2_secret_access_key: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewAccount {
    /// Attach the store-assigned key.
    #[must_use]
    pub fn into_account(self, local_id: i64) -> Account {
        Account {
            local_id,
            account_id: self.account_id,
            name: self.name,
            api_token: self.api_token,
            default_zone_id: self.default_zone_id,
            r2_access_key_id: self.r2_access_key_id,
            r2_secret_access_key: self.r2_secret_access_key,
            is_default: self.is_default,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Request to create an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub name: String,
    pub account_id: String,
    pub api_token: String,
    #[serde(default)]
    pub default_zone_id: Option<String>,
    #[serde(default)]
    pub r2_access_key_id: Option<String>,
    #[serde(default)]
    pub r2_secret_access_key: Option<String>,
    /// Make the new account the default one
    #[serde(default)]
    pub is_default: bool,
}

/// Request to update an account; `None` fields are left untouched.
///
/// For the nullable fields an explicit JSON `null` deserializes to `Some(None)`
/// and clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub local_id: i64,
    pub name: Option<String>,
    pub api_token: Option<String>,
    /// `Some(None)` clears the default zone
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::utils::patch_field::deserialize"
    )]
    pub default_zone_id: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::utils::patch_field::deserialize"
    )]
    pub r2_access_key_id: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::utils::patch_field::deserialize"
    )]
    pub r2_secret_access_key: Option<Option<String>>,
}
