mod common;

use std::convert::Infallible;
use std::sync::Arc;

use anyhow::Result;
use bursar::http::{self, ACCOUNT_DELETED, TRANSFER_COMPLETED};
use common::test_service;
use serde_json::{Value, json};
use tempfile::TempDir;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{Filter, Reply};

/// Helper to build the full HTTP API over a temporary database
async fn test_api()
-> Result<(impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + 'static, TempDir)> {
    let (service, temp) = test_service().await?;
    Ok((http::api(Arc::new(service)), temp))
}

async fn send<F>(
    api: &F,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> warp::http::Response<Bytes>
where
    F: Filter + 'static,
    F::Extract: Reply + Send,
{
    let request = warp::test::request().method(method).path(path);
    let request = match body {
        Some(body) => request.json(&body),
        None => request,
    };
    request.reply(api).await
}

fn json_body(response: &warp::http::Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

async fn create<F>(api: &F, name: &str, balance: f64) -> i64
where
    F: Filter + 'static,
    F::Extract: Reply + Send,
{
    let res = send(
        api,
        "POST",
        "/api/accounts",
        Some(json!({"accountHolderName": name, "balance": balance})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    json_body(&res)["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_and_get_account() -> Result<()> {
    let (api, _temp) = test_api().await?;

    let res = send(
        &api,
        "POST",
        "/api/accounts",
        Some(json!({"accountHolderName": "Alice", "accountType": "savings", "balance": 100})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = json_body(&res);
    assert_eq!(created["accountHolderName"], "Alice");
    assert_eq!(created["accountType"], "savings");
    assert_eq!(created["balance"], 100.0);

    let id = created["id"].as_i64().unwrap();
    let res = send(&api, "GET", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res), created);

    Ok(())
}

#[tokio::test]
async fn test_list_accounts() -> Result<()> {
    let (api, _temp) = test_api().await?;

    let res = send(&api, "GET", "/api/accounts", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res), json!([]));

    create(&api, "Alice", 10.0).await;
    create(&api, "Bob", 20.0).await;

    let res = send(&api, "GET", "/api/accounts", None).await;
    let accounts = json_body(&res);
    let names: Vec<&str> = accounts
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["accountHolderName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);

    Ok(())
}

#[tokio::test]
async fn test_deposit_and_withdraw() -> Result<()> {
    let (api, _temp) = test_api().await?;
    let id = create(&api, "Alice", 100.0).await;

    let res = send(
        &api,
        "POST",
        &format!("/api/accounts/{}/deposit", id),
        Some(json!({"amount": 50.25})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res)["balance"], 150.25);

    let res = send(
        &api,
        "POST",
        &format!("/api/accounts/{}/withdraw", id),
        Some(json!({"amount": 0.25})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res)["balance"], 150.0);

    Ok(())
}

#[tokio::test]
async fn test_withdraw_insufficient_funds() -> Result<()> {
    let (api, _temp) = test_api().await?;
    let id = create(&api, "Alice", 150.0).await;

    let res = send(
        &api,
        "POST",
        &format!("/api/accounts/{}/withdraw", id),
        Some(json!({"amount": 200})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = json_body(&res);
    assert_eq!(error["errorCode"], "INSUFFICIENT_FUNDS");
    assert!(error["message"].as_str().unwrap().contains("Insufficient funds"));
    assert!(error["timestamp"].is_string());

    let res = send(&api, "GET", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(json_body(&res)["balance"], 150.0);

    Ok(())
}

#[tokio::test]
async fn test_transfer_and_history() -> Result<()> {
    let (api, _temp) = test_api().await?;
    let alice = create(&api, "Alice", 150.0).await;
    let bob = create(&api, "Bob", 0.0).await;

    let res = send(
        &api,
        "POST",
        "/api/accounts/transfer",
        Some(json!({"fromAccountId": alice, "toAccountId": bob, "amount": 100})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body().as_ref(), TRANSFER_COMPLETED.as_bytes());

    let res = send(&api, "GET", &format!("/api/accounts/{}", alice), None).await;
    assert_eq!(json_body(&res)["balance"], 50.0);
    let res = send(&api, "GET", &format!("/api/accounts/{}", bob), None).await;
    assert_eq!(json_body(&res)["balance"], 100.0);

    let res = send(&api, "GET", &format!("/api/accounts/{}/transactions", alice), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let history = json_body(&res);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["transactionType"], "TRANSFER");
    assert_eq!(history[0]["accountId"], alice);
    assert_eq!(history[0]["counterpartyId"], bob);
    assert_eq!(history[0]["amount"], 100.0);

    Ok(())
}

#[tokio::test]
async fn test_transfer_with_missing_account() -> Result<()> {
    let (api, _temp) = test_api().await?;
    let alice = create(&api, "Alice", 150.0).await;

    let res = send(
        &api,
        "POST",
        "/api/accounts/transfer",
        Some(json!({"fromAccountId": alice, "toAccountId": 999, "amount": 10})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(&res)["errorCode"], "ACCOUNT_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_delete_account() -> Result<()> {
    let (api, _temp) = test_api().await?;
    let id = create(&api, "Alice", 0.0).await;

    let res = send(&api, "DELETE", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body().as_ref(), ACCOUNT_DELETED.as_bytes());

    let res = send(&api, "GET", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let error = json_body(&res);
    assert_eq!(error["errorCode"], "ACCOUNT_NOT_FOUND");
    assert_eq!(error["details"], "Not Found");

    let res = send(&api, "DELETE", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_invalid_amounts_are_bad_requests() -> Result<()> {
    let (api, _temp) = test_api().await?;
    let id = create(&api, "Alice", 10.0).await;
    let path = format!("/api/accounts/{}/deposit", id);

    for amount in [json!(0), json!(-5), json!(1.005)] {
        let res = send(&api, "POST", &path, Some(json!({"amount": amount}))).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "amount {}", amount);
        assert_eq!(json_body(&res)["errorCode"], "INVALID_REQUEST");
    }

    // Not a number at all
    let res = send(&api, "POST", &path, Some(json!({"amount": "ten"}))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = send(&api, "GET", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(json_body(&res)["balance"], 10.0);

    Ok(())
}

#[tokio::test]
async fn test_malformed_body() -> Result<()> {
    let (api, _temp) = test_api().await?;

    let res = warp::test::request()
        .method("POST")
        .path("/api/accounts")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&res)["errorCode"], "INVALID_REQUEST");

    Ok(())
}

#[tokio::test]
async fn test_unknown_routes_and_methods() -> Result<()> {
    let (api, _temp) = test_api().await?;

    let res = send(&api, "GET", "/api/unknown", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(&res)["errorCode"], "NOT_FOUND");

    let res = send(&api, "GET", "/api/accounts/not-a-number", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = send(&api, "PUT", "/api/accounts", None).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json_body(&res)["errorCode"], "METHOD_NOT_ALLOWED");

    Ok(())
}

#[tokio::test]
async fn test_transfer_errors_map_to_status_codes() -> Result<()> {
    let (api, _temp) = test_api().await?;
    let alice = create(&api, "Alice", 50.0).await;
    let bob = create(&api, "Bob", 0.0).await;

    let res = send(
        &api,
        "POST",
        "/api/accounts/transfer",
        Some(json!({"fromAccountId": alice, "toAccountId": bob, "amount": 50.01})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(&res)["errorCode"], "INSUFFICIENT_FUNDS");

    let res = send(
        &api,
        "POST",
        "/api/accounts/transfer",
        Some(json!({"fromAccountId": alice, "toAccountId": alice, "amount": 1})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&res)["errorCode"], "INVALID_REQUEST");

    let res = send(&api, "GET", &format!("/api/accounts/{}", alice), None).await;
    assert_eq!(json_body(&res)["balance"], 50.0);
    let res = send(&api, "GET", &format!("/api/accounts/{}", bob), None).await;
    assert_eq!(json_body(&res)["balance"], 0.0);

    Ok(())
}

#[tokio::test]
async fn test_missing_account_routes_are_not_found() -> Result<()> {
    let (api, _temp) = test_api().await?;

    for action in ["deposit", "withdraw"] {
        let res = send(
            &api,
            "POST",
            &format!("/api/accounts/999/{}", action),
            Some(json!({"amount": 10})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", action);
        assert_eq!(json_body(&res)["errorCode"], "ACCOUNT_NOT_FOUND");
    }

    let res = send(&api, "GET", "/api/accounts/999/transactions", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(&res)["errorCode"], "ACCOUNT_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_post_without_body_requires_length() -> Result<()> {
    let (api, _temp) = test_api().await?;
    let id = create(&api, "Alice", 10.0).await;

    for path in [
        format!("/api/accounts/{}/deposit", id),
        "/api/accounts/transfer".to_string(),
        "/api/accounts".to_string(),
    ] {
        let res = send(&api, "POST", &path, None).await;
        assert_eq!(res.status(), StatusCode::LENGTH_REQUIRED, "{}", path);
        assert_eq!(json_body(&res)["errorCode"], "INVALID_REQUEST");
    }

    let res = send(&api, "GET", &format!("/api/accounts/{}", id), None).await;
    assert_eq!(json_body(&res)["balance"], 10.0);

    Ok(())
}

#[tokio::test]
async fn test_account_type_is_case_insensitive() -> Result<()> {
    let (api, _temp) = test_api().await?;

    let res = send(
        &api,
        "POST",
        "/api/accounts",
        Some(json!({"accountHolderName": "Bob", "accountType": "SAVINGS"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(json_body(&res)["accountType"], "savings");

    let res = send(
        &api,
        "POST",
        "/api/accounts",
        Some(json!({"accountHolderName": "Bob", "accountType": "current"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&res)["errorCode"], "INVALID_REQUEST");

    Ok(())
}

#[tokio::test]
async fn test_large_amounts_are_not_rounded() -> Result<()> {
    let (api, _temp) = test_api().await?;

    let res = warp::test::request()
        .method("POST")
        .path("/api/accounts")
        .header("content-type", "application/json")
        .body(r#"{"accountHolderName": "Whale", "balance": 90071992547409.93}"#)
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let text = String::from_utf8(res.body().to_vec())?;
    assert!(text.contains(r#""balance":90071992547409.93"#), "{}", text);
    let id = json_body(&res)["id"].as_i64().unwrap();

    let res = warp::test::request()
        .method("POST")
        .path(&format!("/api/accounts/{}/deposit", id))
        .header("content-type", "application/json")
        .body(r#"{"amount": 10000000000000000.0}"#)
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let text = String::from_utf8(res.body().to_vec())?;
    assert!(text.contains(r#""balance":10090071992547409.93"#), "{}", text);

    Ok(())
}
