//! Wire types for the accounts resource.
//!
//! # Design
//! The JSON:API envelope is modelled as explicit nested structs, so the
//! `{data: {type, id, organisation_id, attributes}}` shape is checked by the
//! compiler rather than assembled from maps. These types mirror the mock
//! server's schema but are defined independently; integration tests catch
//! drift between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resource type of every account record.
pub const ACCOUNT_TYPE: &str = "accounts";

/// An account as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub organisation_id: String,
    /// Optimistic-concurrency token; starts at 0 and is bumped server-side.
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attributes: AccountAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountAttributes {
    pub account_classification: String,
    pub account_number: String,
    /// Passed through untouched; its shape is owned by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_bank_account_names: Option<serde_json::Value>,
    pub bank_id: String,
    pub bank_id_code: String,
    pub base_currency: String,
    pub bic: String,
    pub country: String,
    pub customer_id: String,
    pub iban: String,
    pub joint_account: bool,
    pub switched: String,
    pub secondary_identification: String,
    pub account_matching_opt_out: bool,
    pub alternative_names: bool,
}

impl AccountAttributes {
    /// The writable subset, as it would be sent on create.
    pub fn to_create_attributes(&self) -> AccountCreateRequestAttributes {
        AccountCreateRequestAttributes {
            account_classification: self.account_classification.clone(),
            account_number: self.account_number.clone(),
            bank_id: self.bank_id.clone(),
            bank_id_code: self.bank_id_code.clone(),
            base_currency: self.base_currency.clone(),
            bic: self.bic.clone(),
            country: self.country.clone(),
            customer_id: self.customer_id.clone(),
            iban: self.iban.clone(),
            joint_account: self.joint_account,
            switched: self.switched.clone(),
            secondary_identification: self.secondary_identification.clone(),
            account_matching_opt_out: self.account_matching_opt_out,
            alternative_names: self.alternative_names,
        }
    }
}

/// Attributes supplied by the caller on create.
///
/// Nothing here is validated locally. Empty strings are left off the wire
/// and the server decides which fields are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountCreateRequestAttributes {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub account_classification: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub account_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bank_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bank_id_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub base_currency: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bic: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub customer_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iban: String,
    pub joint_account: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub switched: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secondary_identification: String,
    pub account_matching_opt_out: bool,
    pub alternative_names: bool,
}

/// `data` member of the create envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreateRequestData {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub organisation_id: String,
    pub attributes: AccountCreateRequestAttributes,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreateRequest {
    pub data: AccountCreateRequestData,
}

impl AccountCreateRequest {
    pub fn new(id: &str, organisation_id: &str, attributes: AccountCreateRequestAttributes) -> Self {
        Self {
            data: AccountCreateRequestData {
                kind: ACCOUNT_TYPE.to_string(),
                id: id.to_string(),
                organisation_id: organisation_id.to_string(),
                attributes,
            },
        }
    }
}

/// Links returned with a single account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// Links returned with a page of accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountListLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// Success body: `{data, links}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T, L> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<L>,
}
