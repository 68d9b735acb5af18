use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const ACCOUNTS_PATH: &str = "/v1/organisation/accounts";
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_id_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    pub joint_account: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switched: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_identification: Option<String>,
    pub account_matching_opt_out: bool,
    pub alternative_names: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub organisation_id: Uuid,
    pub version: u64,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
    pub attributes: AccountAttributes,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccount {
    pub data: CreateAccountData,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountData {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub organisation_id: String,
    #[serde(default)]
    pub attributes: AccountAttributes,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Links {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(rename = "self")]
    pub self_link: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    pub links: Links,
}

/// Accounts in insertion order; listing pages over this order.
pub type Db = Arc<RwLock<Vec<Account>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route(ACCOUNTS_PATH, get(list_accounts).post(create_account))
        .route(
            &format!("{ACCOUNTS_PATH}/{{id}}"),
            get(fetch_account).delete(delete_account),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    let message = message.into();
    debug!(%status, %message, "rejecting request");
    (
        status,
        Json(ErrorBody {
            error_message: message,
        }),
    )
        .into_response()
}

/// Accepts only the hyphenated 36-character form.
fn parse_uuid(value: &str) -> Option<Uuid> {
    if value.len() != 36 {
        return None;
    }
    Uuid::try_parse(value).ok()
}

fn resource_link(id: &Uuid) -> String {
    format!("{ACCOUNTS_PATH}/{id}")
}

async fn create_account(
    State(db): State<Db>,
    input: Result<Json<CreateAccount>, JsonRejection>,
) -> Response {
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let data = input.data;

    let mut failures = validate_attributes(&data.attributes);
    if data.kind != "accounts" {
        failures.insert(0, "type in body should be one of [accounts]".to_string());
    }
    let organisation_id = parse_uuid(&data.organisation_id);
    if organisation_id.is_none() {
        failures.insert(
            0,
            format!("organisation_id in body must be of type uuid: {:?}", data.organisation_id),
        );
    }
    let id = parse_uuid(&data.id);
    if id.is_none() {
        failures.insert(0, format!("id in body must be of type uuid: {:?}", data.id));
    }
    let (Some(id), Some(organisation_id), true) = (id, organisation_id, failures.is_empty())
    else {
        return error(
            StatusCode::BAD_REQUEST,
            format!("validation failure list:\n{}", failures.join("\n")),
        );
    };

    let mut accounts = db.write().await;
    if accounts.iter().any(|account| account.id == id) {
        return error(
            StatusCode::CONFLICT,
            "Account cannot be created as it violates a duplicate constraint",
        );
    }
    let now = Utc::now();
    let account = Account {
        id,
        kind: data.kind,
        organisation_id,
        version: 0,
        created_on: now,
        modified_on: now,
        attributes: data.attributes,
    };
    accounts.push(account.clone());

    let links = Links {
        self_link: resource_link(&id),
        ..Links::default()
    };
    (
        StatusCode::CREATED,
        Json(Envelope {
            data: account,
            links,
        }),
    )
        .into_response()
}

async fn fetch_account(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_uuid(&id) else {
        return error(StatusCode::BAD_REQUEST, "id is not a valid uuid");
    };
    let accounts = db.read().await;
    match accounts.iter().find(|account| account.id == id) {
        Some(account) => Json(Envelope {
            data: account.clone(),
            links: Links {
                self_link: resource_link(&id),
                ..Links::default()
            },
        })
        .into_response(),
        None => error(StatusCode::NOT_FOUND, format!("record {id} does not exist")),
    }
}

async fn list_accounts(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let size = match params.get("page[size]").map(|v| v.parse::<usize>()) {
        None | Some(Ok(0)) => DEFAULT_PAGE_SIZE,
        Some(Ok(size)) => size.min(MAX_PAGE_SIZE),
        Some(Err(_)) => return error(StatusCode::BAD_REQUEST, "page[size] must be a number"),
    };

    let accounts = db.read().await;
    let last = accounts.len().saturating_sub(1) / size;
    let number = match params.get("page[number]").map(String::as_str) {
        None | Some("first") => 0,
        Some("last") => last,
        Some(raw) => match raw.parse::<usize>() {
            Ok(number) => number,
            Err(_) => {
                return error(
                    StatusCode::BAD_REQUEST,
                    "page[number] must be a number, 'first' or 'last'",
                )
            }
        },
    };

    let page: Vec<Account> = accounts
        .iter()
        .skip(number.saturating_mul(size))
        .take(size)
        .cloned()
        .collect();

    let link = |n: usize| format!("{ACCOUNTS_PATH}?page%5Bnumber%5D={n}&page%5Bsize%5D={size}");
    let links = Links {
        first: Some(link(0)),
        last: Some(link(last)),
        next: (number < last).then(|| link(number + 1)),
        prev: (number > 0).then(|| link(number - 1)),
        self_link: link(number),
    };
    Json(Envelope { data: page, links }).into_response()
}

async fn delete_account(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(version) = params.get("version").and_then(|v| v.parse::<u64>().ok()) else {
        return error(StatusCode::BAD_REQUEST, "invalid version number");
    };
    let Some(id) = parse_uuid(&id) else {
        return error(StatusCode::BAD_REQUEST, "id is not a valid uuid");
    };

    let mut accounts = db.write().await;
    let Some(index) = accounts.iter().position(|account| account.id == id) else {
        debug!(%id, "delete of missing account");
        return StatusCode::NOT_FOUND.into_response();
    };
    if accounts[index].version != version {
        return error(StatusCode::CONFLICT, "invalid version");
    }
    accounts.remove(index);
    StatusCode::NO_CONTENT.into_response()
}

/// Format constraint on one create attribute, reported with its pattern.
struct FieldRule {
    field: &'static str,
    pattern: &'static str,
    regex: OnceLock<Regex>,
}

impl FieldRule {
    const fn new(field: &'static str, pattern: &'static str) -> Self {
        Self {
            field,
            pattern,
            regex: OnceLock::new(),
        }
    }

    fn is_match(&self, value: &str) -> bool {
        self.regex
            .get_or_init(|| {
                Regex::new(self.pattern).unwrap_or_else(|error| {
                    panic!("{} regex failed to compile: {error}", self.field)
                })
            })
            .is_match(value)
    }

    fn check(&self, value: Option<&str>, failures: &mut Vec<String>) {
        if let Some(value) = value {
            if !self.is_match(value) {
                failures.push(format!(
                    "{} in body should match '{}'",
                    self.field, self.pattern
                ));
            }
        }
    }
}

static COUNTRY: FieldRule = FieldRule::new("country", "^[A-Z]{2}$");
static BASE_CURRENCY: FieldRule = FieldRule::new("base_currency", "^[A-Z]{3}$");
static BIC: FieldRule = FieldRule::new("bic", "^([A-Z]{6}[A-Z0-9]{2}|[A-Z]{6}[A-Z0-9]{5})$");
static IBAN: FieldRule = FieldRule::new("iban", "^[A-Z]{2}[0-9]{2}[A-Z0-9]{0,30}$");
static BANK_ID: FieldRule = FieldRule::new("bank_id", "^[A-Z0-9]{0,11}$");
static BANK_ID_CODE: FieldRule = FieldRule::new("bank_id_code", "^[A-Z]{0,16}$");

/// Business rules the real service enforces on create.
pub fn validate_attributes(attributes: &AccountAttributes) -> Vec<String> {
    let mut failures = Vec::new();

    match attributes.country.as_deref() {
        None | Some("") => failures.push("country in body is required".to_string()),
        country => COUNTRY.check(country, &mut failures),
    }
    BASE_CURRENCY.check(attributes.base_currency.as_deref(), &mut failures);
    BIC.check(attributes.bic.as_deref(), &mut failures);
    IBAN.check(attributes.iban.as_deref(), &mut failures);
    BANK_ID.check(attributes.bank_id.as_deref(), &mut failures);
    BANK_ID_CODE.check(attributes.bank_id_code.as_deref(), &mut failures);
    if let Some(classification) = attributes.account_classification.as_deref() {
        if !matches!(classification, "Personal" | "Business") {
            failures.push(
                "account_classification in body should be one of [Personal Business]".to_string(),
            );
        }
    }
    failures
}
