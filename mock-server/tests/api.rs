use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Account, Envelope, ErrorBody};
use serde_json::json;
use tower::ServiceExt;

const ID: &str = "d91afcdb-62d2-4185-b23d-71c98eaab815";
const ORG: &str = "d91afcdb-62d2-4185-b23d-71c98eaab812";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn create_body(id: &str, org: &str) -> String {
    json!({
        "data": {
            "type": "accounts",
            "id": id,
            "organisation_id": org,
            "attributes": {
                "country": "GB",
                "base_currency": "GBP",
                "bank_id": "400300",
                "bank_id_code": "GBDSC",
                "bic": "NWBKGB22",
                "iban": "GB28NWBK40030212764204",
                "account_classification": "Personal"
            }
        }
    })
    .to_string()
}

// --- list ---

#[tokio::test]
async fn list_accounts_empty() {
    let resp = app()
        .oneshot(empty_request("GET", "/v1/organisation/accounts"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Envelope<Vec<Account>> = body_json(resp).await;
    assert!(page.data.is_empty());
    assert!(page.links.next.is_none());
    assert!(page.links.prev.is_none());
}

#[tokio::test]
async fn list_rejects_non_numeric_page() {
    let resp = app()
        .oneshot(empty_request(
            "GET",
            "/v1/organisation/accounts?page%5Bnumber%5D=abc",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- create ---

#[tokio::test]
async fn create_account_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/v1/organisation/accounts",
            &create_body(ID, ORG),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Envelope<Account> = body_json(resp).await;
    assert_eq!(created.data.id.to_string(), ID);
    assert_eq!(created.data.organisation_id.to_string(), ORG);
    assert_eq!(created.data.kind, "accounts");
    assert_eq!(created.data.version, 0);
    assert_eq!(created.links.self_link, format!("/v1/organisation/accounts/{ID}"));
}

#[tokio::test]
async fn create_account_empty_attributes_returns_400() {
    let body = json!({
        "data": {"type": "accounts", "id": ID, "organisation_id": ORG, "attributes": {}}
    });
    let resp = app()
        .oneshot(json_request("POST", "/v1/organisation/accounts", &body.to_string()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert!(err.error_message.contains("country"), "{}", err.error_message);
}

#[tokio::test]
async fn create_account_invalid_id_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/v1/organisation/accounts",
            &create_body("x", ORG),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert!(err.error_message.contains("id in body"), "{}", err.error_message);
}

#[tokio::test]
async fn create_account_reports_every_failure_and_stores_nothing() {
    let body = json!({
        "data": {
            "type": "accounts",
            "id": "x",
            "organisation_id": ORG,
            "attributes": { "country": "gb", "bank_id": "abc123" }
        }
    })
    .to_string();
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/organisation/accounts", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    let lines: Vec<&str> = err.error_message.lines().collect();
    assert_eq!(
        lines,
        vec![
            "validation failure list:",
            "id in body must be of type uuid: \"x\"",
            "country in body should match '^[A-Z]{2}$'",
            "bank_id in body should match '^[A-Z0-9]{0,11}$'",
        ]
    );

    // Valid ids with a bad attribute take the same path.
    let body = create_body(ID, ORG).replace("\"GBP\"", "\"gbp\"");
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/organisation/accounts", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert!(err.error_message.contains("base_currency"), "{}", err.error_message);

    let resp = app
        .oneshot(empty_request("GET", "/v1/organisation/accounts"))
        .await
        .unwrap();
    let page: Envelope<Vec<Account>> = body_json(resp).await;
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn create_account_malformed_json_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/v1/organisation/accounts", r#"{"data":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let _: ErrorBody = body_json(resp).await;
}

// --- fetch ---

#[tokio::test]
async fn fetch_account_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", &format!("/v1/organisation/accounts/{ID}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error_message, format!("record {ID} does not exist"));
}

#[tokio::test]
async fn fetch_account_bad_uuid_returns_400() {
    let resp = app()
        .oneshot(empty_request(
            "GET",
            "/v1/organisation/accounts/d91afcdb-xxxx-4185-b23d-71c98eaab815",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_account_not_found_has_empty_body() {
    let resp = app()
        .oneshot(empty_request(
            "DELETE",
            &format!("/v1/organisation/accounts/{ID}?version=0"),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn delete_account_without_version_returns_400() {
    let resp = app()
        .oneshot(empty_request("DELETE", &format!("/v1/organisation/accounts/{ID}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full lifecycle ---

#[tokio::test]
async fn account_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/organisation/accounts",
            &create_body(ID, ORG),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // duplicate create: 409
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/organisation/accounts",
            &create_body(ID, ORG),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // list: one account
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/v1/organisation/accounts"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Envelope<Vec<Account>> = body_json(resp).await;
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id.to_string(), ID);

    // page past the end: empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            "/v1/organisation/accounts?page%5Bnumber%5D=1&page%5Bsize%5D=1",
        ))
        .await
        .unwrap();
    let page: Envelope<Vec<Account>> = body_json(resp).await;
    assert!(page.data.is_empty());

    // fetch
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/v1/organisation/accounts/{ID}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Envelope<Account> = body_json(resp).await;
    assert_eq!(fetched.data.attributes.country.as_deref(), Some("GB"));

    // delete with stale version: 409
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "DELETE",
            &format!("/v1/organisation/accounts/{ID}?version=7"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "DELETE",
            &format!("/v1/organisation/accounts/{ID}?version=0"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // fetch after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/v1/organisation/accounts/{ID}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pages_partition_the_collection() {
    use tower::Service;

    let mut app = app().into_service();
    let ids: Vec<String> = (0..5)
        .map(|i| format!("d91afcdb-62d2-4185-b23d-71c98eaab81{i}"))
        .collect();
    for id in &ids {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                "/v1/organisation/accounts",
                &create_body(id, ORG),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let mut seen = Vec::new();
    for number in 0..3 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(empty_request(
                "GET",
                &format!("/v1/organisation/accounts?page%5Bnumber%5D={number}&page%5Bsize%5D=2"),
            ))
            .await
            .unwrap();
        let page: Envelope<Vec<Account>> = body_json(resp).await;
        seen.extend(page.data.into_iter().map(|a| a.id.to_string()));
    }
    assert_eq!(seen, ids);

    // "last" resolves to the final page.
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            "/v1/organisation/accounts?page%5Bnumber%5D=last&page%5Bsize%5D=2",
        ))
        .await
        .unwrap();
    let page: Envelope<Vec<Account>> = body_json(resp).await;
    assert_eq!(page.data.len(), 1);
    assert!(page.links.next.is_none());
    assert!(page.links.prev.is_some());
}
